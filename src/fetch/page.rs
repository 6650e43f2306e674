//! Public page transport: plain GET plus visible-text reduction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{FetchError, Fetcher, RawObservation, USER_AGENT};

/// Fetches the public status page and reduces it to its visible text.
pub struct PageFetcher {
    client: Client,
    url: String,
}

impl PageFetcher {
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self) -> Result<Option<RawObservation>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }
        let html = response.text().await?;
        let text = visible_text(&html);
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(RawObservation::Text(text)))
    }
}

/// Strips markup down to the text a reader would see: script and style
/// elements dropped whole, remaining tags replaced by spaces, the handful
/// of entities the page actually uses decoded.
fn visible_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut rest = html;

    loop {
        let Some(open) = rest.find('<') else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..open]);
        out.push(' ');
        rest = &rest[open..];

        if let Some(close_marker) = raw_text_close_marker(&rest[1..]) {
            match find_ci(rest, close_marker) {
                Some(idx) => rest = &rest[idx + close_marker.len()..],
                None => break,
            }
        }
        match rest.find('>') {
            Some(gt) => rest = &rest[gt + 1..],
            None => break,
        }
    }

    decode_entities(&out)
}

// script/style content is never visible; skip to the matching close tag.
fn raw_text_close_marker(tag_body: &str) -> Option<&'static str> {
    let lowered: String = tag_body.chars().take(6).flat_map(char::to_lowercase).collect();
    if lowered.starts_with("script") {
        Some("</script")
    } else if lowered.starts_with("style") {
        Some("</style")
    } else {
        None
    }
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_lowercase().find(&needle.to_lowercase())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&ccedil;", "ç")
        .replace("&atilde;", "ã")
        .replace("&eacute;", "é")
        .replace("&ecirc;", "ê")
        .replace("&oacute;", "ó")
}
