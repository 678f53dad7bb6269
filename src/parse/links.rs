//! Link scanning over free-form text.
//!
//! Producers concatenate links with newlines, spaces, or nothing at all, so
//! segments are delimited by the next scheme occurrence as well as by line.
//! Spaces inside a segment belong to it: display names often contain them.

use std::sync::LazyLock;

use regex::Regex;

use super::authority::{decode_trojan, decode_vless};
use super::shadowsocks::decode_shadowsocks;
use super::vmess::decode_vmess;
use crate::node::{Protocol, ProxyNode};

static LINK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:vmess|vless|trojan|ss)://").expect("link scheme regex is valid")
});

/// Splits text into candidate link segments.
///
/// A segment runs from one scheme occurrence to the next (or the end of the
/// text) and is cut at the first line break.
pub fn split_links(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = LINK_START.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let segment = &text[start..end];
            let segment = segment
                .split(['\r', '\n'])
                .next()
                .unwrap_or(segment)
                .trim();
            (!segment.is_empty()).then_some(segment)
        })
        .collect()
}

/// Decodes a single link by its scheme. Unknown schemes yield `None`.
pub fn decode_link(link: &str) -> Option<ProxyNode> {
    let link = link.trim();
    let (scheme, _) = link.split_once("://")?;
    match Protocol::from_type_name(scheme)? {
        Protocol::Shadowsocks => decode_shadowsocks(link),
        Protocol::Vmess => decode_vmess(link),
        Protocol::Vless => decode_vless(link),
        Protocol::Trojan => decode_trojan(link),
    }
}

/// Extracts every decodable link from `text`, in order of appearance.
pub fn scan_links(text: &str) -> Vec<ProxyNode> {
    split_links(text).into_iter().filter_map(decode_link).collect()
}
