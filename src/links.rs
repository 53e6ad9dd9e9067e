//! Hyperlink extraction from HTML bodies

use crate::types::{LinkCandidate, LinkPattern};
use regex::Regex;
use tracing::debug;
use url::Url;

static DRIVE_VIEW_PATH_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^/file/d/([A-Za-z0-9_-]+)/view/?$").unwrap());

/// Hosts serving cloud-storage "file view" links by default
pub const DEFAULT_DRIVE_HOSTS: &[&str] = &["drive.google.com"];

/// A cloud-storage "file view" link split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveLink {
    pub scheme: String,
    /// Host, with the port when one was given
    pub authority: String,
    pub file_id: String,
}

impl DriveLink {
    /// The direct-download form: `<scheme>://<host>/uc?id=<ID>&export=download`
    #[must_use]
    pub fn download_url(&self) -> String {
        format!(
            "{}://{}/uc?id={}&export=download",
            self.scheme, self.authority, self.file_id
        )
    }
}

/// Decides which hrefs point at JSON resources
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    pattern: LinkPattern,
    drive_hosts: Vec<String>,
}

impl Default for LinkMatcher {
    fn default() -> Self {
        Self::new(LinkPattern::default())
    }
}

impl LinkMatcher {
    #[must_use]
    pub fn new(pattern: LinkPattern) -> Self {
        Self {
            pattern,
            drive_hosts: DEFAULT_DRIVE_HOSTS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replace the hosts accepted for "file view" links
    #[must_use]
    pub fn with_drive_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drive_hosts = hosts
            .into_iter()
            .map(|h| h.into().trim().to_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub const fn pattern(&self) -> LinkPattern {
        self.pattern
    }

    /// Check a URL against the configured pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        (self.pattern.accepts_json_suffix() && has_json_suffix(url))
            || (self.pattern.accepts_drive_view() && self.drive_link(url).is_some())
    }

    /// Split a "file view" link on one of the configured hosts
    #[must_use]
    pub fn drive_link(&self, url: &str) -> Option<DriveLink> {
        let parsed = Url::parse(url.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        let host = parsed.host_str()?.to_lowercase();
        if !self.drive_hosts.iter().any(|h| *h == host) {
            return None;
        }

        let file_id = DRIVE_VIEW_PATH_REGEX
            .captures(parsed.path())?
            .get(1)?
            .as_str()
            .to_string();

        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };

        Some(DriveLink {
            scheme: parsed.scheme().to_string(),
            authority,
            file_id,
        })
    }

    /// Rewrite a "file view" link into its direct-download form.
    ///
    /// Any other URL is returned unchanged.
    #[must_use]
    pub fn normalize(&self, url: &str) -> String {
        self.drive_link(url)
            .map_or_else(|| url.to_string(), |link| link.download_url())
    }

    /// First anchor href in the HTML that matches the pattern
    #[must_use]
    pub fn find_link(&self, html: &str) -> Option<LinkCandidate> {
        let found = anchor_hrefs(html)
            .into_iter()
            .find(|candidate| self.matches(candidate.as_str()));

        match &found {
            Some(link) => debug!(url = %link, pattern = %self.pattern, "Found JSON link"),
            None => debug!(pattern = %self.pattern, "No matching link in body"),
        }

        found
    }
}

/// Whether the URL path ends with `.json`, ignoring query and fragment
#[must_use]
#[allow(clippy::case_sensitive_file_extension_comparisons)]
pub fn has_json_suffix(url: &str) -> bool {
    let url = url.trim();
    Url::parse(url).map_or_else(|_| url.ends_with(".json"), |u| u.path().ends_with(".json"))
}

/// Collect the href of every anchor element in document order.
///
/// Never fails: a tag cut off by the end of input is dropped, as are
/// anchors inside comments, scripts and styles.
#[must_use]
pub fn anchor_hrefs(html: &str) -> Vec<LinkCandidate> {
    let bytes = html.as_bytes();
    let lower = html.to_ascii_lowercase();
    let mut hrefs = Vec::new();
    let mut i = 0;

    while let Some(offset) = html[i..].find('<') {
        let start = i + offset;

        if lower[start..].starts_with("<!--") {
            match lower[start + 4..].find("-->") {
                Some(end) => {
                    i = start + 4 + end + 3;
                    continue;
                }
                None => break,
            }
        }

        // A `<` not followed by a tag name is text
        if !bytes
            .get(start + 1)
            .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'/' || *b == b'!')
        {
            i = start + 1;
            continue;
        }

        let Some(tag) = read_tag(html, start) else {
            break;
        };
        i = tag.end + 1;

        if tag.closing {
            continue;
        }

        if tag.name == "a"
            && let Some(href) = tag.attribute("href").and_then(clean_href)
        {
            hrefs.push(LinkCandidate::new(href));
        }

        if tag.name == "script" || tag.name == "style" {
            let closing = format!("</{}", tag.name);
            match lower[i..].find(&closing) {
                Some(close) => i += close,
                None => break,
            }
        }
    }

    hrefs
}

/// A start or end tag split into its name and attributes
struct Tag<'a> {
    name: String,
    closing: bool,
    attributes: Vec<(String, &'a str)>,
    /// Position of the closing `>`
    end: usize,
}

impl Tag<'_> {
    /// Value of the first attribute with this (lower-case) name
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }
}

/// Tokenize the tag opening at `start`.
///
/// Quotes only delimit a value when they open it, so an apostrophe inside
/// an unquoted value is plain text. `None` when input ends inside the tag.
fn read_tag(html: &str, start: usize) -> Option<Tag<'_>> {
    let bytes = html.as_bytes();
    let mut pos = start + 1;

    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }

    let name_start = pos;
    while pos < bytes.len() && !is_name_end(bytes[pos]) {
        pos += 1;
    }
    let name = html[name_start..pos].to_ascii_lowercase();

    let mut attributes = Vec::new();
    loop {
        while bytes
            .get(pos)
            .is_some_and(|b| b.is_ascii_whitespace() || *b == b'/')
        {
            pos += 1;
        }
        if *bytes.get(pos)? == b'>' {
            return Some(Tag {
                name,
                closing,
                attributes,
                end: pos,
            });
        }

        let key_start = pos;
        pos += 1;
        while pos < bytes.len() && !is_name_end(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        let key = html[key_start..pos].to_ascii_lowercase();

        skip_whitespace(bytes, &mut pos);
        let value = if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            skip_whitespace(bytes, &mut pos);
            let value_start = pos;
            match *bytes.get(pos)? {
                quote @ (b'"' | b'\'') => {
                    let len = html[value_start + 1..].find(char::from(quote))?;
                    pos += len + 2;
                    &html[value_start + 1..value_start + 1 + len]
                }
                _ => {
                    while bytes
                        .get(pos)
                        .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>')
                    {
                        pos += 1;
                    }
                    &html[value_start..pos]
                }
            }
        } else {
            ""
        };

        attributes.push((key, value));
    }
}

const fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

fn skip_whitespace(bytes: &[u8], pos: &mut usize) {
    while bytes.get(*pos).is_some_and(u8::is_ascii_whitespace) {
        *pos += 1;
    }
}

fn clean_href(raw: &str) -> Option<String> {
    let href = decode_entities(raw.trim());
    if href.is_empty() { None } else { Some(href) }
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
