//! Clash-style re-serialization of nodes.

use serde_yaml::{Mapping, Value};

use super::{Network, ProtocolConfig, ProxyNode};

fn insert(map: &mut Mapping, key: &str, value: impl Into<Value>) {
    map.insert(Value::String(key.to_string()), value.into());
}

impl ProxyNode {
    /// Renders the node as a Clash proxy mapping.
    ///
    /// The mapping is sufficient for re-import by Clash-compatible clients;
    /// it is not a byte-exact reproduction of any particular client schema.
    pub fn to_clash_value(&self) -> Value {
        let mut map = Mapping::new();
        insert(&mut map, "name", self.name.as_str());
        insert(&mut map, "type", self.protocol().as_str());
        insert(&mut map, "server", self.server.as_str());
        insert(&mut map, "port", u64::from(self.port));

        match &self.config {
            ProtocolConfig::Shadowsocks { cipher, password } => {
                insert(&mut map, "cipher", cipher.as_str());
                insert(&mut map, "password", password.as_str());
            }
            ProtocolConfig::Vmess {
                uuid,
                alter_id,
                cipher,
            } => {
                insert(&mut map, "uuid", uuid.as_str());
                insert(&mut map, "alterId", u64::from(*alter_id));
                insert(&mut map, "cipher", cipher.as_str());
            }
            ProtocolConfig::Vless { uuid, flow } => {
                insert(&mut map, "uuid", uuid.as_str());
                if let Some(flow) = flow {
                    insert(&mut map, "flow", flow.as_str());
                }
            }
            ProtocolConfig::Trojan { password } => {
                insert(&mut map, "password", password.as_str());
            }
        }

        if self.transport.network != Network::Tcp {
            insert(&mut map, "network", self.transport.network.as_str());
        }
        if self.tls {
            insert(&mut map, "tls", true);
        }
        if let Some(sni) = &self.sni {
            // trojan names the field `sni`, everything else `servername`
            let key = match self.config {
                ProtocolConfig::Trojan { .. } => "sni",
                _ => "servername",
            };
            insert(&mut map, key, sni.as_str());
        }

        if self.transport.network == Network::Ws
            && (self.transport.path.is_some() || self.transport.host.is_some())
        {
            let mut opts = Mapping::new();
            if let Some(path) = &self.transport.path {
                insert(&mut opts, "path", path.as_str());
            }
            if let Some(host) = &self.transport.host {
                let mut headers = Mapping::new();
                insert(&mut headers, "Host", host.as_str());
                insert(&mut opts, "headers", Value::Mapping(headers));
            }
            insert(&mut map, "ws-opts", Value::Mapping(opts));
        }

        Value::Mapping(map)
    }
}
