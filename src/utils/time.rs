//! XMLTV timestamp normalization
//!
//! XMLTV timestamps come as `YYYYMMDDHHMMSS` optionally followed by a signed
//! `HHMM` UTC offset, with or without a separating space. Everything here
//! normalizes to UTC; the canonical rendered form is RFC 3339 with a literal
//! `Z` suffix. That exact formatting is relied on by string comparisons
//! downstream, so [`format_utc`] must stay bit-exact.

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

/// Parse an XMLTV timestamp into UTC.
///
/// The first 14 characters are the naive local timestamp. If a signed `HHMM`
/// offset follows, it is subtracted from the naive value to reach UTC; with
/// no offset the naive value is taken as already UTC. Returns `None` for
/// anything that does not fit the grammar.
pub fn parse_xmltv_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    // Squeeze out the optional separator space so the offset, when present,
    // always begins at character 14.
    let squeezed = raw.trim().replacen(' ', "", 1);
    if !squeezed.is_ascii() || squeezed.len() < 14 {
        return None;
    }

    let (main, rest) = squeezed.split_at(14);
    let naive = NaiveDateTime::parse_from_str(main, "%Y%m%d%H%M%S").ok()?;
    let mut utc = naive.and_utc();

    if rest.len() >= 5 {
        let sign = match rest.as_bytes()[0] {
            b'+' => 1i64,
            b'-' => -1i64,
            // No leading sign means whatever trails is not an offset; the
            // naive timestamp is taken as UTC.
            _ => return Some(utc),
        };
        let hours: i64 = rest[1..3].parse().ok()?;
        let minutes: i64 = rest[3..5].parse().ok()?;
        utc -= Duration::minutes(sign * (hours * 60 + minutes));
    }

    Some(utc)
}

/// Render a UTC instant in the canonical `Z`-suffixed form,
/// e.g. `2024-01-01T10:00:00Z` (never `+00:00`).
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("20240101120000 +0200", "2024-01-01T10:00:00Z")]
    #[case("20240101120000+0200", "2024-01-01T10:00:00Z")]
    #[case("20240101120000", "2024-01-01T12:00:00Z")]
    #[case("20240101120000 -0530", "2024-01-01T17:30:00Z")]
    #[case("20240101000000 +0000", "2024-01-01T00:00:00Z")]
    #[case("  20240101120000 +0200  ", "2024-01-01T10:00:00Z")]
    fn normalizes_to_utc(#[case] input: &str, #[case] expected: &str) {
        let parsed = parse_xmltv_timestamp(input).unwrap();
        assert_eq!(format_utc(parsed), expected);
    }

    #[rstest]
    #[case("")]
    #[case("2024")]
    #[case("not a timestamp")]
    #[case("20241301120000")] // month 13
    #[case("20240101120000 +xx00")]
    fn rejects_malformed(#[case] input: &str) {
        assert!(parse_xmltv_timestamp(input).is_none());
    }

    #[test]
    fn short_trailer_without_sign_is_ignored() {
        // Trailing characters that are not a full signed offset leave the
        // naive timestamp interpreted as UTC.
        let parsed = parse_xmltv_timestamp("20240101120000 02").unwrap();
        assert_eq!(format_utc(parsed), "2024-01-01T12:00:00Z");
    }

    #[test]
    fn format_uses_literal_z_suffix() {
        let dt = parse_xmltv_timestamp("20240601083000 +0100").unwrap();
        let rendered = format_utc(dt);
        assert!(rendered.ends_with('Z'));
        assert!(!rendered.contains("+00:00"));
        assert_eq!(rendered, "2024-06-01T07:30:00Z");
    }
}
