//! Attachment scanner

use crate::types::Attachment;
use tracing::debug;

/// Find the first attachment typed `application/json`.
///
/// Returns its position among all attachments together with the attachment.
#[must_use]
pub fn find_json_attachment(attachments: &[Attachment]) -> Option<(usize, &Attachment)> {
    let found = attachments
        .iter()
        .enumerate()
        .find(|(_, attachment)| attachment.is_json());

    if let Some((index, attachment)) = found {
        debug!(
            index,
            filename = attachment.filename.as_deref().unwrap_or(""),
            "Found JSON attachment"
        );
    }

    found
}
