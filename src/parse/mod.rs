//! Subscription content parsing.
//!
//! A subscription body arrives in one of three shapes, tried in order:
//! 1. Structured YAML/JSON with a `proxies` list (Clash configuration)
//! 2. A base64 blob that decodes to newline-separated links
//! 3. Plain text with links embedded anywhere
//!
//! Each stage only claims the content when it yields at least one node, so
//! a YAML document with an empty `proxies` list still gets a link scan.
//! Parsing is total: any input produces a (possibly empty) list.

mod authority;
mod encoding;
mod links;
mod shadowsocks;
mod structured;
mod vmess;

// Re-export public API
pub use authority::{decode_trojan, decode_vless};
pub use encoding::{decode_base64, decode_base64_text};
pub use links::{decode_link, scan_links, split_links};
pub use shadowsocks::decode_shadowsocks;
pub use structured::{node_from_mapping, parse_structured};
pub use vmess::decode_vmess;

use crate::node::ProxyNode;

/// Parses a subscription body into nodes.
pub fn parse_content(bytes: &[u8]) -> Vec<ProxyNode> {
    let text = String::from_utf8_lossy(bytes);
    parse_text(&text)
}

/// Parses subscription text into nodes.
pub fn parse_text(text: &str) -> Vec<ProxyNode> {
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Vec::new();
    }
    parse_structured(text)
        .or_else(|| parse_base64_blob(text))
        .unwrap_or_else(|| scan_links(text))
}

/// Decodes the whole text as base64 and scans the result for links.
///
/// Returns `None` unless the decoded text contains at least one valid link.
pub fn parse_base64_blob(text: &str) -> Option<Vec<ProxyNode>> {
    let decoded = decode_base64_text(text)?;
    let nodes = scan_links(&decoded);
    (!nodes.is_empty()).then_some(nodes)
}
