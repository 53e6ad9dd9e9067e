//! MIME parser adapter

use crate::error::{ExtractError, Result};
use crate::types::{Attachment, EmailMessage};
use mailparse::{DispositionType, ParsedMail};
use std::path::Path;
use tracing::debug;

/// Parse raw email bytes into attachments and an HTML body
pub fn parse_email(raw: &[u8]) -> Result<EmailMessage> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let mut message = EmailMessage::default();
    let mut html: Option<String> = None;
    collect_parts(&parsed, &mut message.attachments, &mut html)?;
    message.html_body = html.unwrap_or_default();

    debug!(
        attachments = message.attachments.len(),
        html_len = message.html_body.len(),
        "Parsed email"
    );

    Ok(message)
}

/// Read and parse an email file from disk
pub fn parse_email_file(path: impl AsRef<Path>) -> Result<EmailMessage> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    parse_email(&raw)
}

fn collect_parts(
    part: &ParsedMail,
    attachments: &mut Vec<Attachment>,
    html: &mut Option<String>,
) -> Result<()> {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_parts(sub, attachments, html)?;
        }
        return Ok(());
    }

    let content_type = part.ctype.mimetype.to_lowercase();

    // Unnamed inline text is message body; every other leaf is an attachment
    if is_body_text(part, &content_type) {
        if content_type == "text/html" && html.is_none() {
            let body = part
                .get_body()
                .map_err(|e| ExtractError::Parse(e.to_string()))?;
            *html = Some(body);
        }
        return Ok(());
    }

    let content = part
        .get_body_raw()
        .map_err(|e| ExtractError::Parse(e.to_string()))?;
    attachments.push(Attachment {
        content_type,
        filename: part_filename(part),
        content,
    });

    Ok(())
}

fn is_body_text(part: &ParsedMail, content_type: &str) -> bool {
    matches!(content_type, "text/plain" | "text/html")
        && part.get_content_disposition().disposition != DispositionType::Attachment
        && part_filename(part).is_none()
}

fn part_filename(part: &ParsedMail) -> Option<String> {
    part.get_content_disposition()
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
