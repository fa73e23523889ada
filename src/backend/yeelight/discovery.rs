//! Multicast lamp discovery.
//!
//! Yeelight lamps answer SSDP-style searches on the multicast group
//! 239.255.255.250:1982. Discovery sends one M-SEARCH datagram, then
//! collects replies for a fixed listening window and deduplicates them by
//! lamp id. The resulting snapshot is taken once per run; there is no
//! re-discovery while sequences are in flight.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use crate::backend::{LampBackend, LampFinder};
use crate::constants::{DISCOVERY_MULTICAST_ADDR, DISCOVERY_TIMEOUT_MS};

use super::YeelightLamp;

const SEARCH_REQUEST: &str = "M-SEARCH * HTTP/1.1\r\n\
    HOST: 239.255.255.250:1982\r\n\
    MAN: \"ssdp:discover\"\r\n\
    ST: wifi_bulb\r\n";

/// One lamp's discovery advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLamp {
    /// Firmware-assigned unique id, used for deduplication.
    pub id: String,
    /// User-assigned lamp name; the schedule refers to lamps by this.
    pub name: String,
    /// Control endpoint from the Location header.
    pub addr: SocketAddr,
    pub model: String,
}

/// Snapshot of the lamps present on the network.
pub struct YeelightFinder {
    lamps: Vec<DiscoveredLamp>,
}

impl YeelightFinder {
    /// Search the local network for lamps.
    pub fn discover() -> Result<Self> {
        Self::discover_with_timeout(Duration::from_millis(DISCOVERY_TIMEOUT_MS))
    }

    /// Search with an explicit listening window.
    pub fn discover_with_timeout(window: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind discovery socket")?;
        socket
            .send_to(SEARCH_REQUEST.as_bytes(), DISCOVERY_MULTICAST_ADDR)
            .context("Failed to send discovery search")?;

        let mut lamps = Vec::new();
        let mut seen = BTreeSet::new();
        let mut buffer = [0u8; 2048];
        let deadline = Instant::now() + window;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            socket
                .set_read_timeout(Some(remaining))
                .context("Failed to arm discovery timeout")?;
            match socket.recv_from(&mut buffer) {
                Ok((len, _)) => {
                    let reply = String::from_utf8_lossy(&buffer[..len]);
                    if let Some(lamp) = parse_reply(&reply) {
                        log_debug!("discovered '{}' ({}) at {}", lamp.name, lamp.model, lamp.addr);
                        if seen.insert(lamp.id.clone()) {
                            lamps.push(lamp);
                        }
                    }
                }
                // Window elapsed or a transient read error; either way we are done
                Err(_) => break,
            }
        }

        Ok(Self { lamps })
    }

    /// Construct a finder from an already-known lamp list.
    pub fn from_lamps(lamps: Vec<DiscoveredLamp>) -> Self {
        Self { lamps }
    }

    pub fn lamps(&self) -> &[DiscoveredLamp] {
        &self.lamps
    }
}

impl LampFinder for YeelightFinder {
    fn resolve(&self, name: &str) -> Result<Option<Box<dyn LampBackend>>> {
        // Require exactly one match: an ambiguous name cannot be addressed
        let mut matches = self.lamps.iter().filter(|lamp| lamp.name == name);
        let lamp = match (matches.next(), matches.next()) {
            (Some(lamp), None) => lamp,
            _ => return Ok(None),
        };
        Ok(Some(Box::new(YeelightLamp::connect(name, lamp.addr)?)))
    }
}

/// Parse one discovery reply into a lamp record.
///
/// Replies are HTTP-header shaped; the interesting headers are `Location`
/// (`yeelight://ip:port`), `id`, `name`, and `model`. A reply missing any of
/// the addressing headers is ignored.
fn parse_reply(reply: &str) -> Option<DiscoveredLamp> {
    let mut id = None;
    let mut name = None;
    let mut addr = None;
    let mut model = None;

    for line in reply.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "id" => id = Some(value.to_string()),
            "name" => name = Some(value.to_string()),
            "model" => model = Some(value.to_string()),
            "location" => {
                let endpoint = value.strip_prefix("yeelight://")?;
                addr = endpoint.parse::<SocketAddr>().ok();
            }
            _ => {}
        }
    }

    Some(DiscoveredLamp {
        id: id?,
        name: name.unwrap_or_default(),
        addr: addr?,
        model: model.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LAMP_CONTROL_PORT;

    const REPLY: &str = "HTTP/1.1 200 OK\r\n\
        Cache-Control: max-age=3600\r\n\
        Location: yeelight://192.168.1.239:55443\r\n\
        id: 0x000000000015243f\r\n\
        model: color\r\n\
        fw_ver: 18\r\n\
        support: get_prop set_power start_cf\r\n\
        power: on\r\n\
        bright: 100\r\n\
        name: nightstand\r\n";

    #[test]
    fn parses_a_full_reply() {
        let lamp = parse_reply(REPLY).unwrap();
        assert_eq!(lamp.name, "nightstand");
        assert_eq!(lamp.id, "0x000000000015243f");
        assert_eq!(lamp.model, "color");
        assert_eq!(lamp.addr.port(), LAMP_CONTROL_PORT);
        assert_eq!(lamp.addr.ip().to_string(), "192.168.1.239");
    }

    #[test]
    fn reply_without_location_is_ignored() {
        assert_eq!(parse_reply("HTTP/1.1 200 OK\r\nid: 0x1\r\nname: x\r\n"), None);
    }

    #[test]
    fn reply_without_id_is_ignored() {
        assert_eq!(
            parse_reply("Location: yeelight://10.0.0.2:55443\r\nname: x\r\n"),
            None
        );
    }

    #[test]
    fn resolve_requires_exactly_one_match() {
        let lamp = |id: &str, name: &str| DiscoveredLamp {
            id: id.into(),
            name: name.into(),
            addr: "127.0.0.1:55443".parse().unwrap(),
            model: "color".into(),
        };
        let finder =
            YeelightFinder::from_lamps(vec![lamp("0x1", "twin"), lamp("0x2", "twin")]);
        // Ambiguous: treated as not found rather than picking one at random
        assert!(finder.resolve("twin").unwrap().is_none());
        assert!(finder.resolve("absent").unwrap().is_none());
        assert_eq!(finder.lamps().len(), 2);
    }
}
