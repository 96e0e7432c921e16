// ── ISP / ASN extraction ──
//
// IP-lookup providers report ownership as one free-text field such as
// "AS7713 PT Telekomunikasi Indonesia", sometimes with a separate number
// field. This module turns the two into an ISP name and an ASN.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::NetworkInfo;

static AS_NUMBER: OnceLock<Regex> = OnceLock::new();
static LEADING_AS_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Extract `isp_name` and `asn` from the provider's two text fields.
///
/// - `asn` is the trimmed `asn_field` when non-empty, otherwise the digits
///   of the first `AS<digits>` run in `as_field`, otherwise empty.
/// - `isp_name` is `as_field` with a leading `AS<digits>` token and its
///   trailing whitespace removed, then trimmed.
///
/// Total and idempotent; `is_proxy` is left `false`.
pub fn parse(asn_field: &str, as_field: &str) -> NetworkInfo {
    let as_field = as_field.trim();

    let asn = match asn_field.trim() {
        "" => AS_NUMBER
            .get_or_init(|| Regex::new(r"AS(\d+)").expect("static regex"))
            .captures(as_field)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
            .unwrap_or_default(),
        supplied => supplied.to_owned(),
    };

    let isp_name = LEADING_AS_TOKEN
        .get_or_init(|| Regex::new(r"^AS\d+\s*").expect("static regex"))
        .replace(as_field, "")
        .trim()
        .to_owned();

    NetworkInfo {
        isp_name,
        asn,
        is_proxy: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asn_pulled_from_as_field() {
        let info = parse("", "AS7713 PT Example");
        assert_eq!(info.asn, "7713");
        assert_eq!(info.isp_name, "PT Example");
    }

    #[test]
    fn supplied_asn_wins_and_name_is_untouched() {
        let info = parse("99", "anything");
        assert_eq!(info.asn, "99");
        assert_eq!(info.isp_name, "anything");
    }

    #[test]
    fn supplied_asn_still_strips_prefix_from_name() {
        let info = parse(" 7713 ", "AS7713   PT Example ");
        assert_eq!(info.asn, "7713");
        assert_eq!(info.isp_name, "PT Example");
    }

    #[test]
    fn empty_inputs_are_not_an_error() {
        assert_eq!(parse("", ""), NetworkInfo::default());
        assert_eq!(parse("   ", "  "), NetworkInfo::default());
    }

    #[test]
    fn token_only_yields_empty_name() {
        let info = parse("", "AS15169");
        assert_eq!(info.asn, "15169");
        assert_eq!(info.isp_name, "");
    }

    #[test]
    fn mid_string_token_sets_asn_but_keeps_name() {
        let info = parse("", "Google LLC AS15169");
        assert_eq!(info.asn, "15169");
        assert_eq!(info.isp_name, "Google LLC AS15169");
    }

    #[test]
    fn name_without_token() {
        let info = parse("", "Cloudflare, Inc.");
        assert_eq!(info.asn, "");
        assert_eq!(info.isp_name, "Cloudflare, Inc.");
    }

    #[test]
    fn parse_is_idempotent() {
        let once = parse("", "AS7713 PT Example");
        let twice = parse(&once.asn, &once.isp_name);
        assert_eq!(once, twice);
    }
}
