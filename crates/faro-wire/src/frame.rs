//! Encoding and classification of relay frames
//!
//! The relay speaks the original Spanish field names: `tipo` (frame type),
//! `estado` (distress state), `contacto` (emergency contact). Two inbound
//! shapes coexist and both must be accepted: typed frames
//! (`{"tipo":"alerta"}`) and state frames (`{"estado":"SOS",...}`).
//! Unrecognized `tipo`/`estado` values are ignored, not errors; only
//! non-JSON or non-object input is malformed.

use serde::{Deserialize, Serialize};

use faro_core::{DistressEvent, DistressKind, FaroError, FaroResult, Identity};

/// Frame type sent once per session to bind a routing handle.
pub const TIPO_REGISTER: &str = "register";
/// Typed inbound alert, equivalent to `estado: "SOS"`.
pub const TIPO_ALERTA: &str = "alerta";
/// Typed inbound clear, equivalent to `estado: "OK"`.
pub const TIPO_CLEAR: &str = "clear";

const ESTADO_SOS: &str = "SOS";
const ESTADO_OK: &str = "OK";
const ESTADO_PING: &str = "ping";

#[derive(Serialize)]
struct RegisterFrame<'a> {
    tipo: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct DistressFrame<'a> {
    alias: &'a str,
    email: &'a str,
    contacto: &'a str,
    lat: f64,
    lon: f64,
    estado: &'a str,
    ts: i64,
}

/// Inbound fields are all optional; absent ones take defaults. Unknown
/// foreign fields (e.g. a peer's `deviceId`) pass through untouched.
#[derive(Deserialize, Default)]
struct RawFrame {
    #[serde(default)]
    tipo: Option<String>,
    #[serde(default)]
    estado: Option<String>,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    ts: Option<i64>,
}

/// Classification of one successfully parsed inbound frame.
#[derive(Clone, PartialEq, Debug)]
pub enum InboundFrame {
    /// A state-carrying (or ping) distress event.
    Event(DistressEvent),
    /// Valid JSON object with no recognized `tipo`/`estado`. Dropped.
    Ignored,
}

/// Encode the per-session registration frame.
pub fn encode_register(contact_handle: &str) -> FaroResult<String> {
    let frame = RegisterFrame {
        tipo: TIPO_REGISTER,
        email: contact_handle,
    };
    serde_json::to_string(&frame).map_err(|e| FaroError::MalformedFrame(e.to_string()))
}

/// Encode an outbound distress frame for any kind (SOS, CLEAR, PING).
pub fn encode_distress(
    identity: &Identity,
    emergency_contact: &str,
    event: &DistressEvent,
) -> FaroResult<String> {
    let estado = match event.kind {
        DistressKind::Sos => ESTADO_SOS,
        DistressKind::Clear => ESTADO_OK,
        DistressKind::Ping => ESTADO_PING,
    };
    let frame = DistressFrame {
        alias: &event.alias,
        email: identity.contact_handle(),
        contacto: emergency_contact,
        lat: event.lat,
        lon: event.lon,
        estado,
        ts: event.timestamp_ms,
    };
    serde_json::to_string(&frame).map_err(|e| FaroError::MalformedFrame(e.to_string()))
}

/// Parse and classify one inbound frame.
///
/// Errors only on non-JSON or non-object input; every well-formed object
/// classifies as an event or `Ignored`.
pub fn decode_frame(text: &str) -> FaroResult<InboundFrame> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|e| FaroError::MalformedFrame(e.to_string()))?;

    let kind = match raw.tipo.as_deref() {
        Some(TIPO_ALERTA) => Some(DistressKind::Sos),
        Some(TIPO_CLEAR) => Some(DistressKind::Clear),
        Some(ESTADO_PING) => Some(DistressKind::Ping),
        _ => match raw.estado.as_deref() {
            Some(ESTADO_SOS) => Some(DistressKind::Sos),
            Some(ESTADO_OK) => Some(DistressKind::Clear),
            Some(ESTADO_PING) => Some(DistressKind::Ping),
            _ => None,
        },
    };

    let Some(kind) = kind else {
        return Ok(InboundFrame::Ignored);
    };

    Ok(InboundFrame::Event(DistressEvent::new(
        kind,
        raw.alias.unwrap_or_default(),
        raw.lat.unwrap_or(0.0),
        raw.lon.unwrap_or(0.0),
        raw.ts.unwrap_or(0),
    )))
}
