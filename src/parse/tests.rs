// Parse module tests.

use super::*;
use crate::node::{fingerprint, Network, Protocol, ProtocolConfig, ProxyNode, Transport};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use proptest::prelude::*;

fn vmess_b64(json: &str) -> String {
    STANDARD.encode(json).trim_end_matches('=').to_string()
}

#[test]
fn test_structured_proxies_with_string_link() {
    let body = format!(
        r#"{{"proxies": ["ss://{}@1.2.3.4:8388#Node1"]}}"#,
        STANDARD.encode("aes-256-gcm:pw")
    );
    let nodes = parse_content(body.as_bytes());
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].protocol(), Protocol::Shadowsocks);
    assert_eq!(nodes[0].server, "1.2.3.4");
    assert_eq!(nodes[0].port, 8388);
    assert_eq!(nodes[0].name, "Node1");
}

#[test]
fn test_back_to_back_links_without_separator() {
    let text = format!(
        "vmess://{}trojan://user@5.6.7.8:443?security=tls#T1",
        vmess_b64(r#"{"add":"9.9.9.9","port":"443","id":"u-1","ps":"V"}"#)
    );
    let nodes = parse_content(text.as_bytes());
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].protocol(), Protocol::Vmess);
    assert_eq!(nodes[0].server, "9.9.9.9");
    assert_eq!(nodes[1].protocol(), Protocol::Trojan);
    assert_eq!(nodes[1].name, "T1");
    assert!(nodes[1].tls);
}

#[test]
fn test_base64_blob_of_links() {
    let links = format!(
        "ss://{}@1.2.3.4:8388#A\ntrojan://pw@h.example:443#B\n",
        STANDARD.encode("aes-256-gcm:pw")
    );
    let blob = STANDARD.encode(links);
    let nodes = parse_content(blob.as_bytes());
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].name, "A");
    assert_eq!(nodes[1].name, "B");
}

#[test]
fn test_base64_blob_with_line_wrapping() {
    let blob = STANDARD.encode("trojan://pw@h.example:443#Wrapped\n");
    let wrapped = format!("{}\r\n{}", &blob[..10], &blob[10..]);
    let nodes = parse_content(wrapped.as_bytes());
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "Wrapped");
}

#[test]
fn test_plain_text_scan_skips_bad_links() {
    let text = "# my nodes\nss://broken\ntrojan://pw@h.example:443#Good\nvmess://%%%\n";
    let nodes = parse_content(text.as_bytes());
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "Good");
}

#[test]
fn test_structured_wins_over_link_scan() {
    // the comment contains a link; the structured branch must not mix it in
    let doc = "# backup: trojan://pw@other.example:443#Comment\nproxies:\n  - {name: S, type: trojan, server: h, port: 443, password: pw}\n";
    let nodes = parse_content(doc.as_bytes());
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "S");
}

#[test]
fn test_empty_proxies_falls_through_to_scan() {
    let doc = "proxies: []\nextra: trojan://pw@h.example:443#Late\n";
    let nodes = parse_content(doc.as_bytes());
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "Late");
}

#[test]
fn test_bom_and_whitespace_are_ignored() {
    let text = "\u{feff}  \ntrojan://pw@h.example:443#B\n";
    assert_eq!(parse_content(text.as_bytes()).len(), 1);
}

#[test]
fn test_degenerate_inputs_yield_nothing() {
    assert!(parse_content(b"").is_empty());
    assert!(parse_content(b"   \n\t").is_empty());
    assert!(parse_content(b"<html><body>404</body></html>").is_empty());
    assert!(parse_content(&[0xff, 0xfe, 0x00, 0x80]).is_empty());
    assert!(parse_content(b"proxies:\n  - {name: a, type: ss, server").is_empty());
    assert!(parse_content(b"aGVsbG8gd29ybGQ=").is_empty());
}

fn shadowsocks_node() -> ProxyNode {
    ProxyNode::new(
        "ss node",
        "1.2.3.4",
        8388,
        ProtocolConfig::Shadowsocks {
            cipher: "aes-256-gcm".into(),
            password: "pw:with:colons".into(),
        },
    )
}

fn vmess_node() -> ProxyNode {
    ProxyNode::new(
        "vmess node",
        "vm.example.com",
        443,
        ProtocolConfig::Vmess {
            uuid: "b831381d-6324-4d53-ad4f-8cda48b30811".into(),
            alter_id: 0,
            cipher: "auto".into(),
        },
    )
    .with_transport(Transport::new(
        Network::Ws,
        Some("/ray".into()),
        Some("cdn.example".into()),
    ))
    .with_tls(true, None)
}

fn vless_node() -> ProxyNode {
    ProxyNode::new(
        "vless node",
        "vl.example.com",
        8443,
        ProtocolConfig::Vless {
            uuid: "c0ffee00-0000-4000-8000-000000000001".into(),
            flow: None,
        },
    )
    .with_tls(true, Some("sni.example".into()))
}

fn trojan_node() -> ProxyNode {
    ProxyNode::new(
        "trojan node",
        "tj.example.com",
        443,
        ProtocolConfig::Trojan {
            password: "secret".into(),
        },
    )
    .with_tls(true, None)
}

/// Renders a node in the link form its protocol is usually shared in.
fn to_link(node: &ProxyNode) -> String {
    let name = node.name.replace(' ', "%20");
    match &node.config {
        ProtocolConfig::Shadowsocks { cipher, password } => format!(
            "ss://{}@{}:{}#{}",
            STANDARD.encode(format!("{cipher}:{password}")),
            node.server,
            node.port,
            name
        ),
        ProtocolConfig::Vmess {
            uuid,
            alter_id,
            cipher,
        } => {
            let json = serde_json::json!({
                "v": "2",
                "ps": node.name,
                "add": node.server,
                "port": node.port.to_string(),
                "id": uuid,
                "aid": alter_id.to_string(),
                "scy": cipher,
                "net": node.transport.network.as_str(),
                "path": node.transport.path.clone().unwrap_or_default(),
                "host": node.transport.host.clone().unwrap_or_default(),
                "tls": if node.tls { "tls" } else { "" },
            });
            format!("vmess://{}", vmess_b64(&json.to_string()))
        }
        ProtocolConfig::Vless { uuid, .. } => format!(
            "vless://{uuid}@{}:{}?type=tcp&security=tls&sni={}#{name}",
            node.server,
            node.port,
            node.sni.clone().unwrap_or_default()
        ),
        ProtocolConfig::Trojan { password } => format!(
            "trojan://{password}@{}:{}?security=tls#{name}",
            node.server, node.port
        ),
    }
}

#[test]
fn test_link_round_trip_preserves_identity() {
    for original in [shadowsocks_node(), vmess_node(), vless_node(), trojan_node()] {
        let link = to_link(&original);
        let decoded = decode_link(&link).unwrap_or_else(|| panic!("failed to decode {link}"));
        assert_eq!(fingerprint(&decoded), fingerprint(&original), "{link}");
        assert!(fingerprint(&decoded).is_some());
        assert_eq!(decoded.name, original.name);
        assert_eq!(decoded.tls, original.tls);
    }
}

#[test]
fn test_vmess_round_trip_keeps_transport() {
    let original = vmess_node();
    let decoded = decode_link(&to_link(&original)).unwrap();
    assert_eq!(decoded.transport, original.transport);
}

#[test]
fn test_clash_mapping_round_trip() {
    let nodes = [shadowsocks_node(), vmess_node(), vless_node(), trojan_node()];
    let proxies: Vec<serde_yaml::Value> = nodes.iter().map(|n| n.to_clash_value()).collect();
    let mut doc = serde_yaml::Mapping::new();
    doc.insert("proxies".into(), serde_yaml::Value::Sequence(proxies));
    let text = serde_yaml::to_string(&doc).unwrap();

    let parsed = parse_content(text.as_bytes());
    assert_eq!(parsed.len(), nodes.len());
    for (parsed, original) in parsed.iter().zip(nodes.iter()) {
        assert_eq!(parsed, original);
    }
}

proptest! {
    #[test]
    fn prop_parse_content_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_content(&bytes);
    }

    #[test]
    fn prop_parse_text_is_total(text in "\\PC{0,256}") {
        let _ = parse_text(&text);
    }

    #[test]
    fn prop_link_prefixed_noise_never_panics(
        scheme in prop::sample::select(vec!["ss://", "vmess://", "vless://", "trojan://"]),
        body in "[ -~]{0,80}",
    ) {
        let _ = decode_link(&format!("{scheme}{body}"));
        let _ = parse_text(&format!("{scheme}{body}{scheme}{body}"));
    }
}
