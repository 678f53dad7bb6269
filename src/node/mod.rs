//! Canonical proxy node model.
//!
//! Every decoder produces a [`ProxyNode`], whatever encoding the node arrived
//! in. Deduplication and packaging only ever see this shape.

mod clash;
mod fingerprint;

pub use fingerprint::fingerprint;

use std::fmt;

/// Proxy protocol of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Shadowsocks,
    Vmess,
    Vless,
    Trojan,
}

impl Protocol {
    /// Short type name as used in Clash configurations and link schemes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Shadowsocks => "ss",
            Protocol::Vmess => "vmess",
            Protocol::Vless => "vless",
            Protocol::Trojan => "trojan",
        }
    }

    /// Parses a Clash `type` value or a link scheme, case-insensitively.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ss" | "shadowsocks" => Some(Protocol::Shadowsocks),
            "vmess" => Some(Protocol::Vmess),
            "vless" => Some(Protocol::Vless),
            "trojan" => Some(Protocol::Trojan),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol-specific credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolConfig {
    Shadowsocks {
        cipher: String,
        password: String,
    },
    Vmess {
        uuid: String,
        alter_id: u32,
        cipher: String,
    },
    Vless {
        uuid: String,
        flow: Option<String>,
    },
    Trojan {
        password: String,
    },
}

impl ProtocolConfig {
    pub fn protocol(&self) -> Protocol {
        match self {
            ProtocolConfig::Shadowsocks { .. } => Protocol::Shadowsocks,
            ProtocolConfig::Vmess { .. } => Protocol::Vmess,
            ProtocolConfig::Vless { .. } => Protocol::Vless,
            ProtocolConfig::Trojan { .. } => Protocol::Trojan,
        }
    }
}

/// Transport network carrying the proxy stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Tcp,
    Ws,
    Grpc,
    H2,
    Http,
    Other(String),
}

impl Network {
    /// Parses a transport name; empty input means plain TCP.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "tcp" | "none" => Network::Tcp,
            "ws" | "websocket" => Network::Ws,
            "grpc" => Network::Grpc,
            "h2" => Network::H2,
            "http" => Network::Http,
            other => Network::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Network::Tcp => "tcp",
            Network::Ws => "ws",
            Network::Grpc => "grpc",
            Network::H2 => "h2",
            Network::Http => "http",
            Network::Other(name) => name,
        }
    }
}

/// Transport and its options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transport {
    pub network: Network,
    /// Request path (websocket and friends)
    pub path: Option<String>,
    /// Host header override
    pub host: Option<String>,
}

impl Transport {
    /// Builds a transport, dropping empty option strings.
    pub fn new(network: Network, path: Option<String>, host: Option<String>) -> Self {
        Self {
            network,
            path: path.filter(|p| !p.is_empty()),
            host: host.filter(|h| !h.is_empty()),
        }
    }
}

/// One proxy server descriptor.
///
/// `name` and `source_id` are labels only; identity is defined by
/// [`fingerprint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyNode {
    /// Human-readable display name
    pub name: String,
    pub server: String,
    pub port: u16,
    pub config: ProtocolConfig,
    pub transport: Transport,
    pub tls: bool,
    /// TLS server name override
    pub sni: Option<String>,
    /// Ledger id of the source that produced the node
    pub source_id: Option<String>,
}

impl ProxyNode {
    /// Creates a node with TCP transport, no TLS and the server as its name
    /// when `name` is empty.
    pub fn new(name: &str, server: &str, port: u16, config: ProtocolConfig) -> Self {
        let name = if name.trim().is_empty() {
            server.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            name,
            server: server.trim().to_string(),
            port,
            config,
            transport: Transport::default(),
            tls: false,
            sni: None,
            source_id: None,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol()
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_tls(mut self, tls: bool, sni: Option<String>) -> Self {
        self.tls = tls;
        self.sni = sni.filter(|s| !s.is_empty());
        self
    }

    pub fn with_source(mut self, source_id: &str) -> Self {
        self.source_id = Some(source_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_from_type_name() {
        assert_eq!(Protocol::from_type_name("SS"), Some(Protocol::Shadowsocks));
        assert_eq!(Protocol::from_type_name("vmess"), Some(Protocol::Vmess));
        assert_eq!(Protocol::from_type_name("Trojan"), Some(Protocol::Trojan));
        assert_eq!(Protocol::from_type_name("hysteria2"), None);
    }

    #[test]
    fn test_network_from_name() {
        assert_eq!(Network::from_name(""), Network::Tcp);
        assert_eq!(Network::from_name("WS"), Network::Ws);
        assert_eq!(Network::from_name("quic"), Network::Other("quic".into()));
        assert_eq!(Network::from_name("quic").as_str(), "quic");
    }

    #[test]
    fn test_new_defaults_name_to_server() {
        let node = ProxyNode::new(
            "  ",
            "1.2.3.4",
            443,
            ProtocolConfig::Trojan {
                password: "pw".into(),
            },
        );
        assert_eq!(node.name, "1.2.3.4");
        assert_eq!(node.protocol(), Protocol::Trojan);
        assert!(!node.tls);
        assert_eq!(node.transport.network, Network::Tcp);
    }

    #[test]
    fn test_transport_drops_empty_options() {
        let transport =
            Transport::new(Network::Ws, Some(String::new()), Some("cdn.example".into()));
        assert!(transport.path.is_none());
        assert_eq!(transport.host.as_deref(), Some("cdn.example"));
    }
}
