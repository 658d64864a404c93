//! Plan request fields and validation

use eyre::Result;
use serde::Serialize;
use tracing::debug;

/// User-supplied curriculum metadata for one generation attempt
///
/// The week and lesson counts are kept as text the way they were entered;
/// `validate` checks they parse as positive integers.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub unit_title: String,
    pub level: String,
    pub trainer_name: String,
    pub num_weeks: String,
    pub lessons_per_week: String,
    pub curriculum: String,
}

impl PlanRequest {
    /// Check that every field is non-empty and the counts are positive integers
    pub fn validate(&self) -> Result<()> {
        debug!(unit_title = %self.unit_title, "PlanRequest::validate: called");
        let required = [
            ("unit title", &self.unit_title),
            ("level", &self.level),
            ("trainer name", &self.trainer_name),
            ("number of weeks", &self.num_weeks),
            ("lessons per week", &self.lessons_per_week),
            ("curriculum", &self.curriculum),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(eyre::eyre!("The {} is required", name));
            }
        }

        for (name, value) in [
            ("number of weeks", &self.num_weeks),
            ("lessons per week", &self.lessons_per_week),
        ] {
            match value.trim().parse::<u32>() {
                Ok(n) if n >= 1 => {}
                _ => return Err(eyre::eyre!("The {} must be a positive whole number", name)),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> PlanRequest {
        PlanRequest {
            unit_title: "Electrical Safety".to_string(),
            level: "Level 6".to_string(),
            trainer_name: "Alex Bett".to_string(),
            num_weeks: "12".to_string(),
            lessons_per_week: "3".to_string(),
            curriculum: "Safety basics".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_empty_field_rejected() {
        let mut request = valid_request();
        request.trainer_name = "   ".to_string();

        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("trainer name"));
    }

    #[test]
    fn test_non_numeric_weeks_rejected() {
        let mut request = valid_request();
        request.num_weeks = "twelve".to_string();

        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("number of weeks"));
    }

    #[test]
    fn test_zero_lessons_rejected() {
        let mut request = valid_request();
        request.lessons_per_week = "0".to_string();

        assert!(request.validate().is_err());
    }
}
