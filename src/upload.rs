//! Intake and validation of uploaded email files
//!
//! `multipart/form-data` is a MIME structure, so the form is decoded with
//! the same MIME parser as the emails themselves.

use mailparse::DispositionType;
use tracing::debug;

use crate::config::IntakeConfig;
use crate::error::{ExtractError, Result};

/// Form field carrying the email file
pub const EMAIL_FIELD: &str = "email_path";

const NO_FILE: &str = "No file uploaded";

/// A validated upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedEmail {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Rules applied to the uploaded file
#[derive(Debug, Clone, Copy)]
pub struct UploadRules {
    pub require_eml_extension: bool,
}

impl Default for UploadRules {
    fn default() -> Self {
        Self {
            require_eml_extension: true,
        }
    }
}

impl From<&IntakeConfig> for UploadRules {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            require_eml_extension: config.require_eml_extension,
        }
    }
}

impl UploadRules {
    /// Reject a filename without the `.eml` extension when the rule is on
    pub fn check_filename(self, filename: &str) -> Result<()> {
        if self.require_eml_extension && !has_eml_extension(filename) {
            return Err(ExtractError::InvalidUpload(format!(
                "The {EMAIL_FIELD} field must be a file of type: eml"
            )));
        }
        Ok(())
    }
}

/// Pull the email file out of a `multipart/form-data` request body
pub fn read_upload(
    content_type: Option<&str>,
    body: &[u8],
    rules: UploadRules,
) -> Result<UploadedEmail> {
    let content_type = content_type
        .map(str::trim)
        .filter(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .ok_or_else(|| ExtractError::InvalidUpload(NO_FILE.into()))?;

    let mut wrapped = format!("Content-Type: {content_type}\r\n\r\n").into_bytes();
    wrapped.extend_from_slice(body);

    let form = mailparse::parse_mail(&wrapped)
        .map_err(|e| ExtractError::InvalidUpload(format!("Malformed form data: {e}")))?;

    if !form.ctype.params.contains_key("boundary") {
        return Err(ExtractError::InvalidUpload(
            "Malformed form data: missing boundary".into(),
        ));
    }

    let field = form
        .subparts
        .iter()
        .find(|part| {
            let disposition = part.get_content_disposition();
            disposition.disposition == DispositionType::FormData
                && disposition.params.get("name").map(String::as_str) == Some(EMAIL_FIELD)
        })
        .ok_or_else(|| ExtractError::InvalidUpload(NO_FILE.into()))?;

    let filename = field
        .get_content_disposition()
        .params
        .get("filename")
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ExtractError::InvalidUpload(NO_FILE.into()))?;

    let mut bytes = field
        .get_body_raw()
        .map_err(|e| ExtractError::InvalidUpload(format!("Malformed form data: {e}")))?;
    // The line break before a boundary belongs to the delimiter
    if bytes.ends_with(b"\r\n") {
        bytes.truncate(bytes.len() - 2);
    } else if bytes.ends_with(b"\n") {
        bytes.truncate(bytes.len() - 1);
    }
    if bytes.is_empty() {
        return Err(ExtractError::InvalidUpload(NO_FILE.into()));
    }

    rules.check_filename(&filename)?;

    debug!(filename = %filename, bytes = bytes.len(), "Accepted upload");
    Ok(UploadedEmail { filename, bytes })
}

fn has_eml_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
}
