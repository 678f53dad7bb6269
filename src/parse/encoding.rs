//! Text-level helpers shared by the decoders.
//!
//! Subscription content is produced by many different tools, so everything
//! here is lenient: base64 with or without padding in either alphabet,
//! percent-encoded labels, bracketed IPv6 hosts.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use percent_encoding::percent_decode_str;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Decodes base64 in the standard or URL-safe alphabet.
///
/// Whitespace anywhere in the input is ignored and trailing `=` padding is
/// optional. Returns `None` for empty input or anything that is not base64.
pub fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let trimmed = cleaned.trim_end_matches('=');
    if trimmed.is_empty() {
        return None;
    }
    STANDARD_LENIENT
        .decode(trimmed)
        .or_else(|_| URL_SAFE_LENIENT.decode(trimmed))
        .ok()
}

/// Decodes base64 into UTF-8 text.
pub fn decode_base64_text(input: &str) -> Option<String> {
    decode_base64(input).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Percent-decodes a URI component, replacing invalid UTF-8.
pub fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Returns the part after `<scheme>://`, matching the scheme case-insensitively.
pub fn strip_scheme<'a>(link: &'a str, scheme: &str) -> Option<&'a str> {
    let link = link.trim();
    let (found, body) = link.split_once("://")?;
    found.eq_ignore_ascii_case(scheme).then_some(body)
}

/// Splits `body#fragment`, percent-decoding the fragment.
pub fn split_fragment(body: &str) -> (&str, Option<String>) {
    match body.split_once('#') {
        Some((rest, fragment)) => {
            let name = percent_decode(fragment);
            let name = name.trim();
            (rest, (!name.is_empty()).then(|| name.to_string()))
        }
        None => (body, None),
    }
}

/// Parses `host:port` or `[v6]:port`. Port 0 is rejected.
pub fn split_host_port(input: &str) -> Option<(String, u16)> {
    let input = input.trim().trim_end_matches('/');

    let (host, port) = if let Some(rest) = input.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        (host, after.strip_prefix(':')?)
    } else {
        let (host, port) = input.rsplit_once(':')?;
        if host.contains(':') {
            return None;
        }
        (host, port)
    };

    let port: u16 = port.trim().parse().ok()?;
    if host.is_empty() || port == 0 {
        return None;
    }
    Some((host.to_string(), port))
}
