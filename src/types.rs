//! Core types for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parsed view of an uploaded email
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// Attachments in original MIME order
    pub attachments: Vec<Attachment>,

    /// Rendered HTML body, empty when the message has none
    pub html_body: String,
}

/// A MIME attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Lower-cased MIME type without parameters (e.g. `application/json`)
    pub content_type: String,

    /// Filename from Content-Disposition or the Content-Type `name` parameter
    pub filename: Option<String>,

    /// Content after transfer decoding
    pub content: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type == "application/json"
    }
}

/// URL taken from the `href` of an anchor element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LinkCandidate(pub String);

impl LinkCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which hyperlinks in the body are treated as JSON resources
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LinkPattern {
    /// URL path ends with `.json`
    JsonSuffix,

    /// Cloud-storage "file view" link: `https://<host>/file/d/<ID>/view`
    DriveView,

    /// Either of the above
    #[default]
    Either,
}

impl LinkPattern {
    #[must_use]
    pub const fn accepts_json_suffix(self) -> bool {
        matches!(self, Self::JsonSuffix | Self::Either)
    }

    #[must_use]
    pub const fn accepts_drive_view(self) -> bool {
        matches!(self, Self::DriveView | Self::Either)
    }
}

impl fmt::Display for LinkPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::JsonSuffix => "json-suffix",
            Self::DriveView => "drive-view",
            Self::Either => "either",
        };
        f.write_str(name)
    }
}

impl FromStr for LinkPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json-suffix" | "json" => Ok(Self::JsonSuffix),
            "drive-view" | "drive" => Ok(Self::DriveView),
            "either" | "any" => Ok(Self::Either),
            other => Err(format!(
                "unknown link pattern '{other}' (expected json-suffix, drive-view or either)"
            )),
        }
    }
}

/// Outcome of fetching a linked resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Body of a 200 response
    Content(String),

    /// Non-200 status or transport failure
    Absent,
}

impl FetchResult {
    #[must_use]
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Content(body) => Some(body),
            Self::Absent => None,
        }
    }
}

/// Where the returned payload came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonSource {
    /// A MIME attachment, by position among all attachments
    Attachment {
        index: usize,
        filename: Option<String>,
    },

    /// A hyperlink in the HTML body
    Link {
        /// The href as written in the email
        url: String,
        /// The URL actually requested, after normalization
        fetched_from: String,
    },
}

impl fmt::Display for JsonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attachment {
                index,
                filename: Some(name),
            } => write!(f, "attachment #{index} ({name})"),
            Self::Attachment { index, .. } => write!(f, "attachment #{index}"),
            Self::Link { fetched_from, .. } => write!(f, "link {fetched_from}"),
        }
    }
}

/// A successfully extracted JSON payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub payload: serde_json::Value,
    pub source: JsonSource,
}
