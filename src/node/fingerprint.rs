//! Node identity for deduplication.

use sha2::{Digest, Sha256};

use super::{ProtocolConfig, ProxyNode};

/// Derives the deduplication key of a node.
///
/// The key covers protocol, server, port and the credential fields of the
/// protocol:
/// - shadowsocks: cipher and password
/// - vmess / vless: uuid
/// - trojan: password
///
/// Display name, source, transport and TLS options do not participate.
/// Returns `None` when any identity field is empty or the port is 0; such
/// nodes cannot be deduplicated safely and are dropped by the caller.
pub fn fingerprint(node: &ProxyNode) -> Option<String> {
    let server = normalize_host(&node.server);
    if server.is_empty() || node.port == 0 {
        return None;
    }

    let credentials = match &node.config {
        ProtocolConfig::Shadowsocks { cipher, password } => {
            let cipher = cipher.trim().to_ascii_lowercase();
            if cipher.is_empty() || password.is_empty() {
                return None;
            }
            format!("{cipher}:{password}")
        }
        ProtocolConfig::Vmess { uuid, .. } | ProtocolConfig::Vless { uuid, .. } => {
            let uuid = uuid.trim().to_ascii_lowercase();
            if uuid.is_empty() {
                return None;
            }
            uuid
        }
        ProtocolConfig::Trojan { password } => {
            if password.is_empty() {
                return None;
            }
            password.clone()
        }
    };

    let key = format!(
        "{}\n{}\n{}\n{}",
        node.protocol().as_str(),
        server,
        node.port,
        credentials
    );
    Some(format!("{:x}", Sha256::digest(key.as_bytes())))
}

fn normalize_host(server: &str) -> String {
    server
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}
