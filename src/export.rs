//! Export document builder
//!
//! Synthesizes standalone Word-compatible HTML documents from the generated
//! fragments and writes them to disk with a `.docx` extension, relying on
//! the word processor's HTML-import capability. Building a document is a
//! pure function of the fragment and the request metadata.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::plan::PlanRequest;

/// Embedded style sheet for the learning plan document
const LEARNING_PLAN_STYLES: &str = "\
  body { font-family: 'Times New Roman', serif; font-size: 12pt; }
  h1, h2, p { font-family: 'Arial', sans-serif; }
  table { border-collapse: collapse; width: 100%; }
  th, td { border: 1px solid black; padding: 8px; text-align: left; vertical-align: top; }
  th { background-color: #f2f2f2; font-weight: bold; }";

/// Embedded style sheet for the session plans document
const SESSION_PLANS_STYLES: &str = "\
  body { font-family: 'Times New Roman', serif; font-size: 11pt; }
  h1, h2, h3, h4, strong { font-family: 'Arial', sans-serif; }
  table { border-collapse: collapse; width: 100%; margin-bottom: 15px; }
  th, td { border: 1px solid black; padding: 5px; text-align: left; vertical-align: top; }
  th { background-color: #f2f2f2; font-weight: bold; }
  .session-plan-container {
    page-break-after: always;
    border: 1px solid black;
    padding: 15px;
    margin-bottom: 20px;
  }
  .session-plan-main-title { text-align: center; font-size: 16pt; font-weight: bold; margin-bottom: 15px; }
  .session-presentation-title { text-align: center; font-size: 12pt; font-weight: bold; background-color: #f2f2f2; padding: 5px; border: 1px solid black; border-bottom: none; }
  .session-section { border: 1px solid black; padding: 10px; margin-bottom: 10px; }
  .session-section h4 { font-size: 11pt; font-weight: bold; margin-bottom: 5px; }
  .assignment-box { border: 1px solid black; padding: 10px; margin-top: 10px; background-color: #f9f9f9; }
  .reflection-space, .signature-space { min-height: 50px; border: 1px dashed #ccc; margin-top: 5px; }
  .session-plan-footer td { border: 1px solid black; padding: 5px; }
  .session-plan-meta td { border: 1px solid black; padding: 5px; }
  .session-delivery-table th { text-align: left; background-color: #f2f2f2; }";

/// Which of the two generated documents to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDocument {
    LearningPlan,
    SessionPlans,
}

impl PlanDocument {
    /// Heading shown at the top of the document body
    pub fn heading(&self) -> &'static str {
        match self {
            PlanDocument::LearningPlan => "Learning Plan",
            PlanDocument::SessionPlans => "Session Plans",
        }
    }

    /// Fixed filename suffix
    pub fn file_suffix(&self) -> &'static str {
        match self {
            PlanDocument::LearningPlan => "_Learning_Plan.docx",
            PlanDocument::SessionPlans => "_Session_Plans.docx",
        }
    }

    fn title(&self, unit_title: &str) -> String {
        match self {
            PlanDocument::LearningPlan => unit_title.to_string(),
            PlanDocument::SessionPlans => format!("{} - Session Plans", unit_title),
        }
    }

    fn styles(&self) -> &'static str {
        match self {
            PlanDocument::LearningPlan => LEARNING_PLAN_STYLES,
            PlanDocument::SessionPlans => SESSION_PLANS_STYLES,
        }
    }
}

/// Derive the export filename from the unit title
///
/// Spaces become underscores; characters outside `[A-Za-z0-9._-]` are
/// dropped so the title cannot escape the export directory.
pub fn document_file_name(unit_title: &str, doc: PlanDocument) -> String {
    let base: String = unit_title
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    format!("{}{}", base, doc.file_suffix())
}

/// Build a standalone Word-compatible HTML document around a fragment
///
/// Returns `None` when the fragment is empty - exporting nothing is a no-op
/// by contract. Output is deterministic: identical inputs produce
/// byte-identical documents.
pub fn build_document(doc: PlanDocument, fragment: &str, request: &PlanRequest) -> Option<String> {
    if fragment.trim().is_empty() {
        debug!(?doc, "build_document: empty fragment, nothing to export");
        return None;
    }

    debug!(?doc, fragment_len = fragment.len(), "build_document: called");
    Some(format!(
        "<!DOCTYPE html>\n\
         <html xmlns:o='urn:schemas-microsoft-com:office:office' xmlns:w='urn:schemas-microsoft-com:office:word' xmlns='http://www.w3.org/TR/REC-html40'>\n\
         <head>\n\
         <meta charset='utf-8'>\n\
         <title>{title}</title>\n\
         <style>\n{styles}\n</style>\n\
         </head>\n\
         <body>\n\
         <h1>{heading}</h1>\n\
         <h2>Unit: {unit}</h2>\n\
         <p><strong>Level:</strong> {level}</p>\n\
         <p><strong>Trainer:</strong> {trainer}</p>\n\
         <br/>\n\
         {fragment}\n\
         </body>\n\
         </html>\n",
        title = doc.title(&request.unit_title),
        styles = doc.styles(),
        heading = doc.heading(),
        unit = request.unit_title,
        level = request.level,
        trainer = request.trainer_name,
        fragment = fragment,
    ))
}

/// Write an export document into `out_dir`
///
/// Returns `Ok(None)` without touching the filesystem when the fragment is
/// empty.
pub fn write_document(
    out_dir: &Path,
    doc: PlanDocument,
    fragment: &str,
    request: &PlanRequest,
) -> Result<Option<PathBuf>> {
    let Some(content) = build_document(doc, fragment, request) else {
        return Ok(None);
    };

    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create export directory {}", out_dir.display()))?;

    let path = out_dir.join(document_file_name(&request.unit_title, doc));
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Exported {} to {}", doc.heading(), path.display());
    Ok(Some(path))
}
