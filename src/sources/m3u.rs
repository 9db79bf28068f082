//! Extended-M3U playlist parser
//!
//! Parses playlist text into an ordered list of [`ParsedChannel`] records and
//! extracts the guide URL announced on the `#EXTM3U` header line. The parser
//! is tolerant by contract: malformed or incomplete entries are skipped
//! silently and parsing itself never fails.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedChannel;

/// `key="value"` attribute pairs; keys may contain internal hyphens
/// (`tvg-id`, `group-title`).
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).expect("valid attribute regex"));

/// Identity used when an entry carries no id attribute and no display name
const FALLBACK_TVG_ID: &str = "unknown";

/// Extract the guide URL from the playlist header line.
///
/// Only the first non-blank line is considered. `url-tvg` is the primary
/// attribute; `x-tvg-url` is the legacy synonym and loses when both are
/// present.
pub fn extract_epg_url(m3u_text: &str) -> Option<String> {
    for line in m3u_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("#EXTM3U") {
            let attrs = parse_attributes(line);
            return clean(attrs.get("url-tvg").map(String::as_str))
                .or_else(|| clean(attrs.get("x-tvg-url").map(String::as_str)));
        }
        break;
    }
    None
}

/// Parse playlist text into channel records, in source-text order.
///
/// Duplicate identities are returned as-is; de-duplication is the store's
/// concern at upsert time.
pub fn parse_playlist(m3u_text: &str) -> Vec<ParsedChannel> {
    let mut channels = Vec::new();
    let mut pending = PendingEntry::default();

    for raw in m3u_text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("#EXTINF") {
            pending.begin(line);
            continue;
        }

        if let Some(payload) = line.strip_prefix("#EXTGRP:") {
            pending.set_group_directive(payload);
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        // First non-comment, non-blank line after a descriptor is the stream
        // URL and finalizes the entry. A URL with no pending descriptor is
        // skipped.
        if let Some(channel) = pending.finalize(line) {
            channels.push(channel);
        }
        pending = PendingEntry::default();
    }

    channels
}

/// Parse state carried between lines, scoped to one `parse_playlist` call
#[derive(Default)]
struct PendingEntry {
    extinf: Option<String>,
    attrs: HashMap<String, String>,
    display_name: Option<String>,
    group: Option<String>,
    group_from_attr: bool,
}

impl PendingEntry {
    /// Open a new pending entry from an `#EXTINF` descriptor line
    fn begin(&mut self, line: &str) {
        let attrs = parse_attributes(line);
        // Free-text display name is whatever follows the last comma.
        let display_name = line
            .rfind(',')
            .map(|pos| line[pos + 1..].trim().to_string())
            .filter(|name| !name.is_empty());

        let group = clean(attrs.get("group-title").map(String::as_str));
        let group_from_attr = group.is_some();
        // A standalone #EXTGRP seen before this descriptor still applies
        // unless the descriptor carries its own group attribute.
        let group = group.or_else(|| self.group.take());

        *self = PendingEntry {
            extinf: Some(line.to_string()),
            attrs,
            display_name,
            group,
            group_from_attr,
        };
    }

    /// Apply a standalone `#EXTGRP:` directive; empty payloads are ignored
    /// and the attribute form always wins over the directive form.
    fn set_group_directive(&mut self, payload: &str) {
        let payload = payload.trim();
        if !payload.is_empty() && !self.group_from_attr {
            self.group = Some(payload.to_string());
        }
    }

    /// Close the entry with its stream URL, resolving identity and name
    fn finalize(&mut self, stream_url: &str) -> Option<ParsedChannel> {
        let raw_extinf = self.extinf.take()?;

        let tvg_id = [
            self.attrs.get("tvg-id"),
            self.attrs.get("tvgid"),
            self.attrs.get("tvg_id"),
            self.attrs.get("tvg-name"),
            self.display_name.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or(FALLBACK_TVG_ID)
        .to_string();

        let name = self
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&tvg_id)
            .to_string();

        Some(ParsedChannel {
            name,
            tvg_name: clean(self.attrs.get("tvg-name").map(String::as_str)),
            logo: clean(self.attrs.get("tvg-logo").map(String::as_str)),
            group_title: clean(self.group.as_deref()),
            stream_url: stream_url.to_string(),
            raw_extinf,
            tvg_id,
        })
    }
}

fn parse_attributes(line: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(line)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
        .collect()
}

/// Trim and treat empty-after-trim as absent
fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
