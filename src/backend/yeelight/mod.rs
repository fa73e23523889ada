//! Yeelight LAN control backend.
//!
//! Yeelight Wi-Fi lamps expose a line-oriented JSON protocol on TCP port
//! 55443: each request is one JSON object terminated by `\r\n`, each reply
//! echoes the request id with either a `result` array or an `error` object.
//! The lamp also pushes unsolicited `props` notifications on the same
//! connection, which the client skips while waiting for its reply.
//!
//! Multi-step sequences map onto the lamp's `start_cf` ("color flow")
//! command: a repeat count, a finish action, and a flat expression string of
//! `duration,mode,value,brightness` tuples that the lamp firmware animates on
//! its own. This is what makes the choreography fire-and-forget — one
//! command per lamp carries the whole phase list.

pub mod discovery;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::backend::{LampBackend, LampProps};
use crate::constants::MINIMUM_FLOW_STEP_MS;
use crate::flow::{Flow, FlowFinish, Transition, TransitionTarget};

/// A connected Yeelight lamp.
pub struct YeelightLamp {
    name: String,
    reader: BufReader<TcpStream>,
    next_id: u64,
}

impl YeelightLamp {
    /// Connect to a lamp's control port.
    pub fn connect(name: &str, addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .with_context(|| format!("Failed to connect to lamp '{name}' at {addr}"))?;
        Ok(Self {
            name: name.to_string(),
            reader: BufReader::new(stream),
            next_id: 1,
        })
    }

    /// Send one command and wait for the lamp's reply to it.
    ///
    /// Property notifications pushed by the lamp in between are skipped.
    fn command(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({ "id": id, "method": method, "params": params });
        log_debug!("{}: sending {request}", self.name);

        let mut line = serde_json::to_string(&request)?;
        line.push_str("\r\n");
        self.reader
            .get_mut()
            .write_all(line.as_bytes())
            .with_context(|| format!("Failed to send '{method}' to lamp '{}'", self.name))?;

        loop {
            let mut reply = String::new();
            let read = self
                .reader
                .read_line(&mut reply)
                .with_context(|| format!("Failed to read reply from lamp '{}'", self.name))?;
            if read == 0 {
                bail!("Lamp '{}' closed the connection", self.name);
            }

            let reply: Value = serde_json::from_str(reply.trim())
                .with_context(|| format!("Malformed reply from lamp '{}'", self.name))?;
            if reply.get("id").and_then(Value::as_u64) != Some(id) {
                // Unsolicited props notification, not our reply
                continue;
            }

            if let Some(error) = reply.get("error") {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                bail!("Lamp '{}' rejected '{method}': {message}", self.name);
            }
            return reply
                .get("result")
                .cloned()
                .ok_or_else(|| anyhow!("Lamp '{}' reply carries no result", self.name));
        }
    }
}

impl LampBackend for YeelightLamp {
    fn apply_transition(&mut self, transition: &Transition) -> Result<()> {
        self.apply_flow(&Flow::once(vec![transition.clone()]))
    }

    fn apply_flow(&mut self, flow: &Flow) -> Result<()> {
        let (count, action, expression) = encode_flow(flow);
        self.command("start_cf", json!([count, action, expression]))?;
        Ok(())
    }

    fn set_power(&mut self, on: bool, duration: Duration) -> Result<()> {
        let state = if on { "on" } else { "off" };
        self.command(
            "set_power",
            json!([state, "smooth", duration.as_millis() as u64]),
        )?;
        Ok(())
    }

    fn properties(&mut self) -> Result<LampProps> {
        let result = self.command("get_prop", json!(["power", "bright", "ct"]))?;
        let prop = |idx: usize| -> Result<&str> {
            result
                .get(idx)
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("Lamp '{}' returned malformed properties", self.name))
        };
        Ok(LampProps {
            powered_on: prop(0)? == "on",
            brightness: prop(1)?
                .parse()
                .with_context(|| format!("Lamp '{}': unparsable brightness", self.name))?,
            temperature: prop(2)?
                .parse()
                .with_context(|| format!("Lamp '{}': unparsable color temperature", self.name))?,
        })
    }
}

/// Encode a [`Flow`] into `start_cf` parameters.
///
/// The firmware counts individual state changes, not passes, so the count
/// parameter is `passes * steps`. Step durations below the firmware minimum
/// are clamped up to it.
fn encode_flow(flow: &Flow) -> (u64, u8, String) {
    let count = flow.count as u64 * flow.transitions.len() as u64;
    let action = match flow.finish {
        FlowFinish::Recover => 0,
        FlowFinish::Stay => 1,
        FlowFinish::Off => 2,
    };
    let expression = flow
        .transitions
        .iter()
        .map(encode_transition)
        .collect::<Vec<_>>()
        .join(",");
    (count, action, expression)
}

/// Encode one transition as a `duration,mode,value,brightness` tuple.
fn encode_transition(transition: &Transition) -> String {
    let duration = (transition.duration.as_millis() as u64).max(MINIMUM_FLOW_STEP_MS);
    match transition.target {
        TransitionTarget::Hsv {
            hue,
            saturation,
            brightness,
        } => {
            format!("{duration},1,{},{brightness}", hsv_to_rgb(hue, saturation))
        }
        TransitionTarget::Temperature { kelvin, brightness } => {
            format!("{duration},2,{kelvin},{brightness}")
        }
        TransitionTarget::Sleep => format!("{duration},7,0,0"),
    }
}

/// Convert a hue (degrees) and saturation (percent) at full value into the
/// packed RGB integer the flow expression expects.
fn hsv_to_rgb(hue: u16, saturation: u8) -> u32 {
    let h = f64::from(hue % 360) / 60.0;
    let s = f64::from(saturation.min(100)) / 100.0;

    let c = s; // chroma at full value
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let m = 1.0 - c;
    let to_byte = |v: f64| ((v + m) * 255.0).round() as u32;
    (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_hue_maps_to_red_rgb() {
        assert_eq!(hsv_to_rgb(0, 100), 0xFF0000);
        // Hue 1 is the configured "red" of the sunrise; still essentially red
        let rgb = hsv_to_rgb(1, 100);
        assert_eq!(rgb >> 16, 0xFF);
        assert!(rgb & 0xFF == 0);
    }

    #[test]
    fn zero_saturation_is_white() {
        assert_eq!(hsv_to_rgb(180, 0), 0xFFFFFF);
    }

    #[test]
    fn primary_hues_map_to_primaries() {
        assert_eq!(hsv_to_rgb(120, 100), 0x00FF00);
        assert_eq!(hsv_to_rgb(240, 100), 0x0000FF);
    }

    #[test]
    fn flow_expression_encodes_in_order() {
        let flow = Flow {
            count: 2,
            finish: FlowFinish::Recover,
            transitions: vec![
                Transition::temperature(6000, 1, Duration::from_millis(60)),
                Transition::temperature(6000, 100, Duration::from_millis(140)),
                Transition::sleep(Duration::from_millis(600)),
            ],
        };
        let (count, action, expression) = encode_flow(&flow);
        assert_eq!(count, 6); // 2 passes * 3 state changes
        assert_eq!(action, 0);
        assert_eq!(expression, "60,2,6000,1,140,2,6000,100,600,7,0,0");
    }

    #[test]
    fn short_steps_are_clamped_to_firmware_minimum() {
        let flow = Flow::once(vec![Transition::temperature(
            3000,
            50,
            Duration::from_millis(10),
        )]);
        let (_, action, expression) = encode_flow(&flow);
        assert_eq!(action, 1);
        assert_eq!(expression, "50,2,3000,50");
    }

    #[test]
    fn hsv_transition_encodes_packed_rgb() {
        let flow = Flow::once(vec![Transition::hsv(
            0,
            100,
            40,
            Duration::from_millis(1000),
        )]);
        let (_, _, expression) = encode_flow(&flow);
        assert_eq!(expression, format!("1000,1,{},40", 0xFF0000));
    }
}
