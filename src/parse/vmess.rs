//! `vmess://` links: base64-encoded JSON in the v2rayN layout.

use serde_json::Value;

use super::encoding::{decode_base64_text, split_fragment, strip_scheme};
use crate::node::{Network, ProtocolConfig, ProxyNode, Transport};

/// Reads a field that producers emit either as a string or as a number.
fn field_str(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_u64(obj: &Value, key: &str) -> Option<u64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes one `vmess://` link; `None` if it is malformed.
pub fn decode_vmess(link: &str) -> Option<ProxyNode> {
    let body = strip_scheme(link, "vmess")?;
    let (body, fragment_name) = split_fragment(body);
    let json = decode_base64_text(body)?;
    let obj: Value = serde_json::from_str(json.trim()).ok()?;
    if !obj.is_object() {
        return None;
    }

    let server = field_str(&obj, "add")?;
    let port = u16::try_from(field_u64(&obj, "port")?).ok()?;
    let uuid = field_str(&obj, "id")?;
    let alter_id = field_u64(&obj, "aid")
        .and_then(|aid| u32::try_from(aid).ok())
        .unwrap_or(0);
    let cipher = field_str(&obj, "scy").unwrap_or_else(|| "auto".to_string());
    let name = field_str(&obj, "ps").or(fragment_name).unwrap_or_default();

    let network = Network::from_name(&field_str(&obj, "net").unwrap_or_default());
    let transport = if network == Network::Ws {
        Transport::new(network, field_str(&obj, "path"), field_str(&obj, "host"))
    } else {
        Transport::new(network, None, None)
    };
    let tls = field_str(&obj, "tls").is_some_and(|t| t == "tls");

    let node = ProxyNode::new(
        &name,
        &server,
        port,
        ProtocolConfig::Vmess {
            uuid,
            alter_id,
            cipher,
        },
    )
    .with_transport(transport)
    .with_tls(tls, field_str(&obj, "sni"));
    Some(node)
}
