//! `ss://` links.
//!
//! Three shapes occur in the wild:
//! - SIP002: `ss://base64(cipher:password)@host:port[/?plugin=...]#name`
//! - clear userinfo: `ss://cipher:password@host:port#name`
//! - legacy: `ss://base64(cipher:password@host:port)#name`
//!
//! The userinfo is tried as base64 first and as clear text second. A clear
//! userinfo that happens to be valid base64 of something containing `:` is
//! decoded as base64; there is no way to tell the two apart.

use super::encoding::{
    decode_base64_text, percent_decode, split_fragment, split_host_port, strip_scheme,
};
use crate::node::{ProtocolConfig, ProxyNode};

/// Decodes one `ss://` link; `None` if it is malformed.
pub fn decode_shadowsocks(link: &str) -> Option<ProxyNode> {
    let body = strip_scheme(link, "ss")?;
    let (body, name) = split_fragment(body);

    let (userinfo, host_port) = match body.rsplit_once('@') {
        Some((user, host_port)) => (
            decode_userinfo(user)?,
            strip_plugin(host_port).to_string(),
        ),
        None => {
            let decoded = decode_base64_text(strip_plugin(body))?;
            let (user, host_port) = decoded.rsplit_once('@')?;
            (user.to_string(), host_port.to_string())
        }
    };

    let (cipher, password) = userinfo.split_once(':')?;
    let (server, port) = split_host_port(&host_port)?;
    if cipher.trim().is_empty() || password.is_empty() {
        return None;
    }

    Some(ProxyNode::new(
        name.as_deref().unwrap_or_default(),
        &server,
        port,
        ProtocolConfig::Shadowsocks {
            cipher: cipher.trim().to_string(),
            password: password.to_string(),
        },
    ))
}

/// Drops SIP002 plugin options, which are not part of the canonical record.
/// Only the host part may carry them; a clear-text password keeps its `?`.
fn strip_plugin(host_port: &str) -> &str {
    host_port
        .split('?')
        .next()
        .unwrap_or(host_port)
        .trim_end_matches('/')
}

fn decode_userinfo(user: &str) -> Option<String> {
    let user = percent_decode(user);
    if let Some(decoded) = decode_base64_text(&user).filter(|d| d.contains(':')) {
        return Some(decoded);
    }
    user.contains(':').then_some(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Protocol;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use base64::Engine as _;

    fn credentials(node: &ProxyNode) -> (&str, &str) {
        match &node.config {
            ProtocolConfig::Shadowsocks { cipher, password } => (cipher, password),
            other => panic!("expected shadowsocks, got {other:?}"),
        }
    }

    #[test]
    fn test_sip002_base64_userinfo() {
        let link = format!(
            "ss://{}@1.2.3.4:8388#Node1",
            STANDARD.encode("aes-256-gcm:pw")
        );
        let node = decode_shadowsocks(&link).unwrap();
        assert_eq!(node.protocol(), Protocol::Shadowsocks);
        assert_eq!(node.server, "1.2.3.4");
        assert_eq!(node.port, 8388);
        assert_eq!(node.name, "Node1");
        assert_eq!(credentials(&node), ("aes-256-gcm", "pw"));
    }

    #[test]
    fn test_sip002_url_safe_without_padding_and_plugin() {
        let link = format!(
            "ss://{}@example.com:443/?plugin=v2ray-plugin%3Bmode%3Dwebsocket#%E8%8A%82%E7%82%B9",
            URL_SAFE_NO_PAD.encode("chacha20-ietf-poly1305:p@ss")
        );
        let node = decode_shadowsocks(&link).unwrap();
        assert_eq!(node.server, "example.com");
        assert_eq!(node.port, 443);
        assert_eq!(node.name, "节点");
        assert_eq!(credentials(&node), ("chacha20-ietf-poly1305", "p@ss"));
    }

    #[test]
    fn test_clear_text_userinfo() {
        let node = decode_shadowsocks("ss://aes-128-gcm:secret@10.0.0.1:8080#Clear").unwrap();
        assert_eq!(credentials(&node), ("aes-128-gcm", "secret"));
        assert_eq!(node.name, "Clear");
    }

    #[test]
    fn test_clear_text_password_keeps_question_mark() {
        let node = decode_shadowsocks("ss://aes-128-gcm:pa?ss@h.example:1#Q").unwrap();
        assert_eq!(credentials(&node), ("aes-128-gcm", "pa?ss"));
        assert_eq!(node.server, "h.example");
        assert_eq!(node.port, 1);

        let with_plugin =
            decode_shadowsocks("ss://aes-128-gcm:pa?ss@h.example:2/?plugin=obfs-local#Q").unwrap();
        assert_eq!(credentials(&with_plugin), ("aes-128-gcm", "pa?ss"));
        assert_eq!(with_plugin.port, 2);
    }

    #[test]
    fn test_legacy_fully_encoded_body() {
        let link = format!(
            "ss://{}#Legacy",
            STANDARD.encode("rc4-md5:pass@[2001:db8::1]:8388")
        );
        let node = decode_shadowsocks(&link).unwrap();
        assert_eq!(node.server, "2001:db8::1");
        assert_eq!(node.port, 8388);
        assert_eq!(credentials(&node), ("rc4-md5", "pass"));
    }

    #[test]
    fn test_name_defaults_to_server() {
        let link = format!("ss://{}@5.6.7.8:1234", STANDARD.encode("aes-256-gcm:pw"));
        assert_eq!(decode_shadowsocks(&link).unwrap().name, "5.6.7.8");
    }

    #[test]
    fn test_malformed_links() {
        assert!(decode_shadowsocks("ss://").is_none());
        assert!(decode_shadowsocks("ss://garbage").is_none());
        assert!(decode_shadowsocks("ss://nocolon@1.2.3.4:8388").is_none());
        assert!(decode_shadowsocks("ss://aes-256-gcm:pw@1.2.3.4").is_none());
        assert!(decode_shadowsocks("ss://aes-256-gcm:@1.2.3.4:8388").is_none());
        assert!(decode_shadowsocks("vmess://abc").is_none());
    }
}
