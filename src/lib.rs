// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email JSON Extractor
//!
//! Locates a JSON payload carried by an email, either as an attachment or
//! behind a hyperlink in the HTML body.
//!
//! # Pipeline
//!
//! 1. The first attachment typed `application/json` wins.
//! 2. Otherwise the first body link matching the configured
//!    [`LinkPattern`] is normalized and fetched over HTTP.
//! 3. Otherwise the result is [`ExtractError::NotFound`].
//!
//! # Example
//!
//! ```rust
//! use eml_json_extract::{Config, Extractor};
//!
//! let raw = b"Content-Type: multipart/mixed; boundary=b\r\n\r\n\
//!             --b\r\n\
//!             Content-Type: application/json\r\n\
//!             Content-Disposition: attachment; filename=\"data.json\"\r\n\r\n\
//!             {\"id\": 7}\r\n\
//!             --b--\r\n";
//!
//! let extractor = Extractor::from_config(&Config::default()).unwrap();
//! let extraction = extractor.extract_bytes(raw).unwrap();
//! assert_eq!(extraction.payload["id"], 7);
//! ```

mod attachments;
pub mod config;
mod error;
mod fetcher;
mod links;
mod parser;
mod pipeline;
pub mod server;
mod types;
mod upload;

pub use attachments::find_json_attachment;
pub use config::Config;
pub use error::{ExtractError, FetchError, Result};
pub use fetcher::LinkFetcher;
pub use links::{DriveLink, LinkMatcher, anchor_hrefs, has_json_suffix};
pub use parser::{parse_email, parse_email_file};
pub use pipeline::Extractor;
pub use server::{ApiResponse, EmailService};
pub use types::*;
pub use upload::{EMAIL_FIELD, UploadRules, UploadedEmail, read_upload};
