//! Discovery server topology string
//!
//! Fast DDS takes its server list as `;`-separated `address:port` segments
//! where a segment's position is the server ID. Empty segments pad unused
//! IDs, so local ID 0 plus remote ID 2 becomes
//! `127.0.0.1:11811;;10.0.0.5:11811;`.
//!
//! The robot runs exactly one local server bound to loopback and may list
//! one remote server.

use crate::defaults;
use crate::error::{AppError, Result};
use crate::models::DiscoveryConf;
use serde::{Deserialize, Serialize};

/// The on-robot server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalServer {
    pub id: u8,
    pub port: u16,
}

/// An off-robot server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteServer {
    pub id: u8,
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub local: LocalServer,
    pub remote: Option<RemoteServer>,
}

impl From<&DiscoveryConf> for Topology {
    fn from(conf: &DiscoveryConf) -> Self {
        Self {
            local: LocalServer {
                id: conf.server_id,
                port: conf.port,
            },
            remote: conf
                .offboard_ip
                .as_deref()
                .filter(|ip| !ip.trim().is_empty())
                .map(|ip| RemoteServer {
                    id: conf.offboard_id,
                    ip: ip.trim().to_string(),
                    port: conf.offboard_port,
                }),
        }
    }
}

impl Topology {
    /// Overwrite the discovery record with this topology and mark it enabled
    ///
    /// Without a remote server the offboard fields return to their defaults;
    /// the default offboard ID yields to the local one if they collide.
    pub fn apply_to(&self, conf: &mut DiscoveryConf) {
        conf.enabled = true;
        conf.server_id = self.local.id;
        conf.port = self.local.port;

        match &self.remote {
            Some(remote) => {
                conf.offboard_id = remote.id;
                conf.offboard_ip = Some(remote.ip.clone());
                conf.offboard_port = remote.port;
            }
            None => {
                conf.offboard_ip = None;
                conf.offboard_port = defaults::DEFAULT_DISCOVERY_PORT;
                conf.offboard_id = if self.local.id == defaults::DEFAULT_OFFBOARD_ID {
                    0
                } else {
                    defaults::DEFAULT_OFFBOARD_ID
                };
            }
        }
    }

    fn endpoints(&self) -> Vec<(u8, String, u16)> {
        let mut endpoints = vec![(
            self.local.id,
            defaults::LOOPBACK_ADDRESS.to_string(),
            self.local.port,
        )];
        if let Some(remote) = &self.remote {
            endpoints.push((remote.id, remote.ip.clone(), remote.port));
        }
        endpoints.sort_by_key(|(id, _, _)| *id);
        endpoints
    }
}

/// Encode the topology as a positional server list
pub fn encode(topology: &Topology) -> String {
    let mut out = String::new();
    let mut next_id: usize = 0;

    for (id, address, port) in topology.endpoints() {
        let id = usize::from(id);
        while next_id < id {
            out.push(';');
            next_id += 1;
        }
        out.push_str(&format!("{}:{};", address, port));
        next_id = id + 1;
    }

    out
}

fn parse_port(raw: Option<&str>, segment: &str) -> Result<u16> {
    match raw.map(super::unquote).filter(|p| !p.is_empty()) {
        None => Ok(defaults::DEFAULT_DISCOVERY_PORT),
        Some(port) => port.parse().map_err(|_| {
            AppError::topology(format!("Invalid port '{}' in server '{}'", port, segment))
        }),
    }
}

/// Decode a positional server list
///
/// Exactly one loopback segment and at most one other segment are accepted.
pub fn decode(raw: &str) -> Result<Topology> {
    let mut local: Option<LocalServer> = None;
    let mut remote: Option<RemoteServer> = None;

    for (index, segment) in super::unquote(raw).split(';').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let id = u8::try_from(index).map_err(|_| {
            AppError::topology(format!("Server '{}' sits at ID {} beyond 255", segment, index))
        })?;

        let mut parts = segment.splitn(2, ':');
        let address = super::unquote(parts.next().unwrap_or_default());
        let port = parse_port(parts.next(), segment)?;

        if address == defaults::LOOPBACK_ADDRESS {
            if local.is_some() {
                return Err(AppError::topology(format!(
                    "More than one local server in '{}'",
                    raw
                )));
            }
            local = Some(LocalServer { id, port });
        } else {
            if address.is_empty() {
                return Err(AppError::topology(format!("Server '{}' has no address", segment)));
            }
            if remote.is_some() {
                return Err(AppError::topology(format!(
                    "More than one remote server in '{}'",
                    raw
                )));
            }
            remote = Some(RemoteServer {
                id,
                ip: address.to_string(),
                port,
            });
        }
    }

    let local = local.ok_or_else(|| {
        AppError::topology(format!("No local server bound to {} in '{}'", defaults::LOOPBACK_ADDRESS, raw))
    })?;

    Ok(Topology { local, remote })
}

/// Single-server list pointing the Create 3 base at the robot's local server
///
/// The base reaches the Raspberry Pi over the USB link address. There is no
/// trailing delimiter.
pub fn create3_server_str(server_id: u8, port: u16) -> String {
    format!(
        "{}{}:{}",
        ";".repeat(usize::from(server_id)),
        defaults::COMPANION_LINK_ADDRESS,
        port
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn topology(local: (u8, u16), remote: Option<(u8, &str, u16)>) -> Topology {
        Topology {
            local: LocalServer { id: local.0, port: local.1 },
            remote: remote.map(|(id, ip, port)| RemoteServer {
                id,
                ip: ip.to_string(),
                port,
            }),
        }
    }

    #[test]
    fn test_encode_local_and_remote() {
        let t = topology((0, 11811), Some((2, "10.0.0.5", 11811)));
        assert_eq!(encode(&t), "127.0.0.1:11811;;10.0.0.5:11811;");
    }

    #[test]
    fn test_encode_remote_first() {
        let t = topology((3, 11900), Some((1, "192.168.1.20", 12000)));
        assert_eq!(encode(&t), ";192.168.1.20:12000;;127.0.0.1:11900;");
    }

    #[test]
    fn test_decode_local_only() {
        let t = decode("127.0.0.1:11900;").unwrap();
        assert_eq!(t, topology((0, 11900), None));
    }

    #[test]
    fn test_decode_quoted_and_default_port() {
        let t = decode("\";127.0.0.1;10.0.0.5:'12000';\"").unwrap();
        assert_eq!(t, topology((1, 11811), Some((2, "10.0.0.5", 12000))));
    }

    #[test]
    fn test_decode_corruption() {
        assert!(matches!(
            decode("127.0.0.1:11811;127.0.0.1:11812;"),
            Err(AppError::TopologyCorruption(_))
        ));
        assert!(decode("10.0.0.5:11811;10.0.0.6:11811;127.0.0.1:11811;").is_err());
        assert!(decode("10.0.0.5:11811;").is_err());
        assert!(decode("127.0.0.1:eleven;").is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn test_decode_rejects_ids_beyond_255() {
        let raw = format!("{}127.0.0.1:11811;", ";".repeat(256));
        assert!(decode(&raw).is_err());

        let raw = format!("{}127.0.0.1:11811;", ";".repeat(255));
        assert_eq!(decode(&raw).unwrap().local.id, 255);
    }

    #[test]
    fn test_apply_to_without_remote_avoids_id_collision() {
        let mut conf = DiscoveryConf::default();
        topology((1, 11811), None).apply_to(&mut conf);
        assert!(conf.enabled);
        assert_eq!(conf.server_id, 1);
        assert_eq!(conf.offboard_id, 0);
        assert_eq!(conf.offboard_ip, None);

        topology((0, 11811), None).apply_to(&mut conf);
        assert_eq!(conf.offboard_id, 1);
    }

    #[test]
    fn test_conf_round_trip() {
        let conf = DiscoveryConf {
            enabled: true,
            port: 11811,
            server_id: 0,
            offboard_ip: Some("10.0.0.5".to_string()),
            offboard_port: 11811,
            offboard_id: 2,
        };
        let mut decoded = DiscoveryConf::default();
        decode(&encode(&Topology::from(&conf))).unwrap().apply_to(&mut decoded);
        assert_eq!(decoded, conf);
    }

    #[test]
    fn test_create3_server_str() {
        assert_eq!(create3_server_str(0, 11811), "192.168.186.3:11811");
        assert_eq!(create3_server_str(2, 11900), ";;192.168.186.3:11900");
    }

    fn ipv4() -> impl Strategy<Value = String> {
        (1u8..=254, any::<u8>(), any::<u8>(), 1u8..=254)
            .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
            .prop_filter("loopback is reserved for the local server", |ip| ip != "127.0.0.1")
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(
            local_id in any::<u8>(),
            local_port in 10000u16..,
            remote in proptest::option::of((any::<u8>(), ipv4(), 10000u16..)),
        ) {
            let remote = remote
                .filter(|(id, _, _)| *id != local_id)
                .map(|(id, ip, port)| RemoteServer { id, ip, port });
            let t = Topology { local: LocalServer { id: local_id, port: local_port }, remote };

            prop_assert_eq!(decode(&encode(&t)).unwrap(), t);
        }
    }
}
