//! Page-to-text collaborator: downloads an article and pulls out the headline
//! and paragraph text the classifier reads.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub body: String,
    pub markup: String,
}

pub struct PageFetcher {
    client: reqwest::Client,
    parser: MarkupParser,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            parser: MarkupParser::new(),
        })
    }

    pub async fn fetch_and_extract(&self, url: &str) -> Result<ExtractedPage, FetchError> {
        let page = self.fetch(url).await;
        if let Err(e) = &page {
            warn!("Error extracting text from {}: {}", url, e);
        }
        page
    }

    async fn fetch(&self, url: &str) -> Result<ExtractedPage, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;
        let markup = self.parser.decode(&bytes, content_type.as_deref());
        debug!("Fetched {} ({} bytes)", url, markup.len());
        Ok(self.parser.extract(markup))
    }
}

/// How far into the document a `<meta charset>` declaration is looked for.
const CHARSET_SNIFF_BYTES: usize = 4096;

/// Regex-based extraction of `<h1>`/`<title>` and `<p>` text.
#[derive(Debug, Clone)]
pub struct MarkupParser {
    h1: Regex,
    title: Regex,
    paragraph: Regex,
    tag: Regex,
    ignored_blocks: Regex,
    header_charset: Regex,
    meta_charset: Regex,
}

impl MarkupParser {
    pub fn new() -> Self {
        Self {
            h1: Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").expect("static h1 pattern"),
            title: Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("static title pattern"),
            paragraph: Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").expect("static paragraph pattern"),
            tag: Regex::new(r"(?s)<[^>]*>").expect("static tag pattern"),
            ignored_blocks: Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
                .expect("static block pattern"),
            header_charset: Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_.:\-]+)"#)
                .expect("static charset pattern"),
            meta_charset: Regex::new(r#"(?i)<meta\b[^>]*?charset\s*=\s*["']?\s*([A-Za-z0-9_.:\-]+)"#)
                .expect("static meta charset pattern"),
        }
    }

    /// Decodes a response body. The `Content-Type` charset wins, then a
    /// `<meta>` declaration near the top of the document, then UTF-8.
    pub fn decode(&self, bytes: &[u8], content_type: Option<&str>) -> String {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)]);
        let label = content_type
            .and_then(|ct| self.header_charset.captures(ct))
            .or_else(|| self.meta_charset.captures(&head))
            .map(|c| c[1].to_string());

        let encoding = label
            .as_deref()
            .and_then(|l| Encoding::for_label(l.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            debug!("Replaced malformed {} sequences in page body", encoding.name());
        }
        text.into_owned()
    }

    pub fn extract(&self, markup: String) -> ExtractedPage {
        let (title, body) = {
            let cleaned = self.ignored_blocks.replace_all(&markup, " ");

            let title = self
                .first_text(&self.h1, &cleaned)
                .or_else(|| self.first_text(&self.title, &cleaned))
                .unwrap_or_default();

            let body = self
                .paragraph
                .captures_iter(&cleaned)
                .map(|c| self.inner_text(&c[1]))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            (title, body)
        };

        ExtractedPage {
            title,
            body,
            markup,
        }
    }

    fn first_text(&self, pattern: &Regex, markup: &str) -> Option<String> {
        pattern.captures(markup).map(|c| self.inner_text(&c[1]))
    }

    /// Strips tags, decodes common entities and collapses whitespace.
    fn inner_text(&self, fragment: &str) -> String {
        let without_tags = self.tag.replace_all(fragment, " ");
        decode_entities(&without_tags)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
