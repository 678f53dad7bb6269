//! `vless://` and `trojan://` links.
//!
//! Both use the plain URI layout `scheme://secret@host:port?options#name`,
//! so they share one decoder built on [`url::Url`].

use std::collections::HashMap;

use url::Url;

use super::encoding::percent_decode;
use crate::node::{Network, ProtocolConfig, ProxyNode, Transport};

/// The parts of an authority-style link common to both protocols.
struct AuthorityLink {
    secret: String,
    server: String,
    port: u16,
    name: String,
    query: HashMap<String, String>,
}

impl AuthorityLink {
    fn parse(link: &str, scheme: &str) -> Option<Self> {
        let url = Url::parse(link.trim()).ok()?;
        if !url.scheme().eq_ignore_ascii_case(scheme) {
            return None;
        }

        let mut secret = percent_decode(url.username());
        // a ':' in the secret splits it into username and password
        if let Some(rest) = url.password() {
            secret = format!("{secret}:{}", percent_decode(rest));
        }
        if secret.is_empty() {
            return None;
        }

        let server = url
            .host_str()?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url.port().filter(|p| *p != 0)?;
        if server.is_empty() {
            return None;
        }

        let name = url.fragment().map(percent_decode).unwrap_or_default();
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Some(Self {
            secret,
            server,
            port,
            name,
            query,
        })
    }

    fn param(&self, key: &str) -> Option<String> {
        self.query.get(key).cloned()
    }

    fn transport(&self) -> Transport {
        let network = Network::from_name(&self.param("type").unwrap_or_default());
        if network == Network::Ws {
            Transport::new(network, self.param("path"), self.param("host"))
        } else {
            Transport::new(network, None, None)
        }
    }

    fn sni(&self) -> Option<String> {
        self.param("sni").or_else(|| self.param("peer"))
    }

    fn security(&self) -> Option<String> {
        self.param("security").map(|s| s.to_ascii_lowercase())
    }

    /// `security` defaults to `none` when absent.
    fn uses_tls(&self) -> bool {
        matches!(self.security().as_deref(), Some("tls" | "xtls" | "reality"))
    }
}

/// Decodes one `vless://` link; `None` if it is malformed.
pub fn decode_vless(link: &str) -> Option<ProxyNode> {
    let parsed = AuthorityLink::parse(link, "vless")?;
    let tls = parsed.uses_tls();
    let node = ProxyNode::new(
        &parsed.name,
        &parsed.server,
        parsed.port,
        ProtocolConfig::Vless {
            uuid: parsed.secret.clone(),
            flow: parsed.param("flow"),
        },
    )
    .with_transport(parsed.transport())
    .with_tls(tls, parsed.sni());
    Some(node)
}

/// Decodes one `trojan://` link; `None` if it is malformed.
pub fn decode_trojan(link: &str) -> Option<ProxyNode> {
    let parsed = AuthorityLink::parse(link, "trojan")?;
    let tls = parsed.uses_tls();
    let node = ProxyNode::new(
        &parsed.name,
        &parsed.server,
        parsed.port,
        ProtocolConfig::Trojan {
            password: parsed.secret.clone(),
        },
    )
    .with_transport(parsed.transport())
    .with_tls(tls, parsed.sni());
    Some(node)
}
