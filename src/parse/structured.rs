//! Structured documents: YAML or JSON with a top-level `proxies` list.
//!
//! JSON is a subset of YAML, so one parser covers both. Entries are either
//! Clash-style mappings or strings holding a link (or an inline mapping).

use serde_yaml::{Mapping, Value};

use super::links::decode_link;
use crate::node::{Network, Protocol, ProtocolConfig, ProxyNode, Transport};

/// Parses a structured document.
///
/// Returns `None` when the text is not a document with a `proxies` list or
/// when no entry of that list decodes, so the caller can fall through to the
/// next format.
pub fn parse_structured(text: &str) -> Option<Vec<ProxyNode>> {
    let doc: Value = serde_yaml::from_str(text).ok()?;
    let proxies = doc.get("proxies")?.as_sequence()?;

    let nodes: Vec<ProxyNode> = proxies.iter().filter_map(entry_to_node).collect();
    (!nodes.is_empty()).then_some(nodes)
}

fn entry_to_node(entry: &Value) -> Option<ProxyNode> {
    match entry {
        Value::Mapping(map) => node_from_mapping(map),
        Value::String(s) => {
            // `- "{name: a, type: ss, ...}"` shows up in hand-edited files
            if let Ok(Value::Mapping(map)) = serde_yaml::from_str::<Value>(s) {
                if let Some(node) = node_from_mapping(&map) {
                    return Some(node);
                }
            }
            decode_link(s)
        }
        _ => None,
    }
}

fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(Value::String(key.to_string()))
}

/// Reads a scalar as text; numbers and booleans are rendered.
fn get_str(map: &Mapping, key: &str) -> Option<String> {
    let text = match get(map, key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn get_first(map: &Mapping, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| get_str(map, key))
}

fn get_u64(map: &Mapping, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| match get(map, key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn get_bool(map: &Mapping, key: &str) -> Option<bool> {
    match get(map, key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "tls"
        )),
        _ => None,
    }
}

fn nested<'a>(map: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    get(map, key)?.as_mapping()
}

/// Builds a node from a Clash-style proxy mapping.
///
/// Missing credentials become empty strings; the fingerprint stage drops
/// such nodes.
pub fn node_from_mapping(map: &Mapping) -> Option<ProxyNode> {
    let protocol = Protocol::from_type_name(&get_str(map, "type")?)?;
    let server = get_str(map, "server")?;
    let port = u16::try_from(get_u64(map, &["port"])?).ok()?;
    let name = get_str(map, "name").unwrap_or_default();

    let config = match protocol {
        Protocol::Shadowsocks => ProtocolConfig::Shadowsocks {
            cipher: get_first(map, &["cipher", "method"]).unwrap_or_default(),
            password: get_str(map, "password").unwrap_or_default(),
        },
        Protocol::Vmess => ProtocolConfig::Vmess {
            uuid: get_first(map, &["uuid", "id"]).unwrap_or_default(),
            alter_id: get_u64(map, &["alterId", "alter-id", "aid"])
                .and_then(|aid| u32::try_from(aid).ok())
                .unwrap_or(0),
            cipher: get_str(map, "cipher").unwrap_or_else(|| "auto".to_string()),
        },
        Protocol::Vless => ProtocolConfig::Vless {
            uuid: get_first(map, &["uuid", "id"]).unwrap_or_default(),
            flow: get_str(map, "flow"),
        },
        Protocol::Trojan => ProtocolConfig::Trojan {
            password: get_str(map, "password").unwrap_or_default(),
        },
    };

    let network = Network::from_name(&get_str(map, "network").unwrap_or_default());
    let transport = if network == Network::Ws {
        let opts = nested(map, "ws-opts");
        let path = opts
            .and_then(|o| get_str(o, "path"))
            .or_else(|| get_str(map, "ws-path"));
        let host = opts
            .and_then(|o| nested(o, "headers"))
            .and_then(|h| get_str(h, "Host"))
            .or_else(|| nested(map, "ws-headers").and_then(|h| get_str(h, "Host")));
        Transport::new(network, path, host)
    } else {
        Transport::new(network, None, None)
    };

    let tls = get_bool(map, "tls").unwrap_or(protocol == Protocol::Trojan);
    let sni = get_first(map, &["servername", "sni"]);

    Some(
        ProxyNode::new(&name, &server, port, config)
            .with_transport(transport)
            .with_tls(tls, sni),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clash_yaml_document() {
        let doc = r#"
port: 7890
proxies:
  - name: "HK"
    type: ss
    server: hk.example.com
    port: 8388
    cipher: aes-256-gcm
    password: "pw"
  - {name: v1, type: vmess, server: 1.1.1.1, port: "443", uuid: ID, alterId: 0, cipher: auto, network: ws, tls: true, servername: s.example, ws-opts: {path: /ray, headers: {Host: cdn.example}}}
  - name: unsupported
    type: hysteria2
    server: h
    port: 1
proxy-groups: []
"#;
        let nodes = parse_structured(doc).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "HK");
        assert_eq!(nodes[0].protocol(), Protocol::Shadowsocks);

        let vmess = &nodes[1];
        assert_eq!(vmess.port, 443);
        assert!(vmess.tls);
        assert_eq!(vmess.sni.as_deref(), Some("s.example"));
        assert_eq!(vmess.transport.path.as_deref(), Some("/ray"));
        assert_eq!(vmess.transport.host.as_deref(), Some("cdn.example"));
    }

    #[test]
    fn test_legacy_ws_keys() {
        let doc = r#"
proxies:
  - {name: v, type: vmess, server: h, port: 1, uuid: u, network: ws, ws-path: /old, ws-headers: {Host: legacy.example}}
"#;
        let nodes = parse_structured(doc).unwrap();
        assert_eq!(nodes[0].transport.path.as_deref(), Some("/old"));
        assert_eq!(nodes[0].transport.host.as_deref(), Some("legacy.example"));
    }

    #[test]
    fn test_trojan_mapping_defaults_to_tls() {
        let doc = r#"{"proxies": [{"type": "trojan", "server": "h", "port": 443, "password": "pw", "sni": "s"}]}"#;
        let nodes = parse_structured(doc).unwrap();
        assert!(nodes[0].tls);
        assert_eq!(nodes[0].sni.as_deref(), Some("s"));
    }

    #[test]
    fn test_string_entries_hold_links_or_inline_mappings() {
        let doc = r#"
proxies:
  - "trojan://pw@5.6.7.8:443#T"
  - "{name: inline, type: trojan, server: h, port: 443, password: pw}"
  - "garbage"
"#;
        let nodes = parse_structured(doc).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "T");
        assert_eq!(nodes[1].name, "inline");
    }

    #[test]
    fn test_missing_credentials_still_parse() {
        let doc = "proxies:\n  - {type: ss, server: h, port: 1}\n";
        let nodes = parse_structured(doc).unwrap();
        assert_eq!(
            nodes[0].config,
            ProtocolConfig::Shadowsocks {
                cipher: String::new(),
                password: String::new(),
            }
        );
    }

    #[test]
    fn test_not_structured() {
        assert!(parse_structured("ss://abc@h:1").is_none());
        assert!(parse_structured("foo: bar").is_none());
        assert!(parse_structured("proxies: 3").is_none());
        assert!(parse_structured("proxies: []").is_none());
        assert!(parse_structured("proxies:\n  - {type: ss}\n").is_none());
        assert!(parse_structured("[unclosed").is_none());
    }
}
