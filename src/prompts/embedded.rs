//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Fixed system instruction (learning plan + session plan format rules)
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// User prompt template interpolating the plan request fields
pub const USER: &str = include_str!("../../prompts/user.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "user" => Some(USER),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_system() {
        let system = get_embedded("system").unwrap();
        assert!(system.contains("Learning Plan"));
        assert!(system.contains("Session Plan"));
        assert!(system.contains("---SESSION-PLANS---"));
        assert!(system.contains("120 minutes"));
    }

    #[test]
    fn test_get_embedded_user() {
        let user = get_embedded("user").unwrap();
        assert!(user.contains("{{{unit_title}}}"));
        assert!(user.contains("{{{curriculum}}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
