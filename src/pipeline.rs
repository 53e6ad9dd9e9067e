//! Extraction pipeline: attachments first, then linked resources

use std::path::Path;

use tracing::{debug, info, warn};

use crate::attachments::find_json_attachment;
use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::fetcher::LinkFetcher;
use crate::links::LinkMatcher;
use crate::parser::{parse_email, parse_email_file};
use crate::types::{EmailMessage, Extraction, JsonSource};

/// Locates the JSON payload of an email.
///
/// Holds no per-request state and can serve any number of requests.
#[derive(Debug, Clone)]
pub struct Extractor {
    matcher: LinkMatcher,
    fetcher: LinkFetcher,
}

impl Extractor {
    #[must_use]
    pub const fn new(matcher: LinkMatcher, fetcher: LinkFetcher) -> Self {
        Self { matcher, fetcher }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.links.matcher(),
            LinkFetcher::new(&config.fetch)?,
        ))
    }

    #[must_use]
    pub const fn matcher(&self) -> &LinkMatcher {
        &self.matcher
    }

    /// Run the pipeline over a parsed email.
    ///
    /// The first JSON attachment wins; otherwise the first matching body
    /// link is fetched. Anything else ends in [`ExtractError::NotFound`].
    pub fn extract(&self, message: &EmailMessage) -> Result<Extraction> {
        if let Some((index, attachment)) = find_json_attachment(&message.attachments) {
            let source = JsonSource::Attachment {
                index,
                filename: attachment.filename.clone(),
            };
            return decode(&attachment.content, source);
        }

        debug!("No JSON attachment, scanning body links");

        let Some(link) = self.matcher.find_link(&message.html_body) else {
            return Err(ExtractError::NotFound);
        };

        let target = self.matcher.normalize(link.as_str());
        if target != link.as_str() {
            debug!(from = %link, to = %target, "Rewrote link to direct download");
        }

        let Some(body) = self.fetcher.fetch(&target).into_content() else {
            return Err(ExtractError::NotFound);
        };

        let source = JsonSource::Link {
            url: link.0,
            fetched_from: target,
        };
        decode(body.as_bytes(), source)
    }

    /// Parse raw email bytes and run the pipeline
    pub fn extract_bytes(&self, raw: &[u8]) -> Result<Extraction> {
        self.extract(&parse_email(raw)?)
    }

    /// Read an email file and run the pipeline
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Extraction> {
        self.extract(&parse_email_file(path)?)
    }
}

fn decode(content: &[u8], source: JsonSource) -> Result<Extraction> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);

    match serde_json::from_slice(content) {
        Ok(payload) => {
            info!(%source, "Extracted JSON payload");
            Ok(Extraction { payload, source })
        }
        Err(e) => {
            warn!(%source, error = %e, "Candidate content is not valid JSON");
            Err(ExtractError::NotFound)
        }
    }
}
