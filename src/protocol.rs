//! Wire format between the widget and its host.
//!
//! Both directions are newline-delimited JSON. Inbound lines are either a
//! render envelope (`{"type": "streamlit:render", "args": {...}}`) or the bare
//! args object; the args select an operation through their `action` field.
//! Outbound messages use the component message types the host understands.

use crate::locks::DEFAULT_LOCK_EXPIRATION_MS;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Component API version announced in the ready handshake.
pub const COMPONENT_API_VERSION: u32 = 1;

/// A configuration request from the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostMessage {
    /// Set or clear the shared lock.
    SetLock {
        /// Only a literal JSON `true` locks; anything else unlocks.
        #[serde(default, deserialize_with = "literal_true")]
        lock_state: bool,
    },

    /// Apply scheduler configuration and (re)start the refresh timer.
    StartRefresh(StartRefresh),

    /// Any other action. Ignored.
    #[serde(other)]
    Unrecognized,
}

/// Fields of a `start_refresh` request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartRefresh {
    /// Tick period in milliseconds. `None` or 0 falls back to the default.
    #[serde(default, deserialize_with = "json_millis")]
    pub interval: Option<u64>,

    /// Optional instance key.
    #[serde(default)]
    pub key: Option<String>,

    /// Tick limit. `None` or 0 means unlimited.
    #[serde(
        default,
        rename = "refreshLimit",
        alias = "limit",
        deserialize_with = "json_millis"
    )]
    pub refresh_limit: Option<u64>,

    /// Lock freshness window. Absent means the default window; an explicit
    /// `null` disables expiry.
    #[serde(default = "default_lock_expiration", deserialize_with = "json_millis")]
    pub lock_expiration: Option<u64>,
}

impl Default for StartRefresh {
    fn default() -> Self {
        Self {
            interval: None,
            key: None,
            refresh_limit: None,
            lock_expiration: default_lock_expiration(),
        }
    }
}

fn default_lock_expiration() -> Option<u64> {
    Some(DEFAULT_LOCK_EXPIRATION_MS)
}

fn literal_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value == Value::Bool(true))
}

/// Accept any JSON number for a millisecond or count field.
///
/// Fractions are truncated and negative values map to 0, so a negative
/// interval uses the default and a negative limit means unlimited. Values
/// past `u64::MAX` saturate. `null` is `None`; non-numbers are rejected.
fn json_millis<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(value) = number.as_u64() {
        return Ok(Some(value));
    }
    Ok(Some(
        number
            .as_f64()
            .filter(|value| *value > 0.0)
            .map_or(0, |value| value as u64),
    ))
}

/// Host envelope around render arguments.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Envelope {
    #[serde(rename = "streamlit:render")]
    Render { args: HostMessage },

    #[serde(other)]
    Other,
}

/// Outcome of decoding one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(HostMessage),
    /// A well-formed line that carries nothing for this component.
    Ignored,
}

/// Decode one inbound line.
///
/// Returns an error string for malformed JSON; the caller decides whether
/// that is fatal.
pub fn decode_line(line: &str) -> Result<Inbound, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;

    let message = if value.get("type").is_some() {
        match serde_json::from_value::<Envelope>(value).map_err(|e| e.to_string())? {
            Envelope::Render { args } => args,
            Envelope::Other => return Ok(Inbound::Ignored),
        }
    } else {
        serde_json::from_value::<HostMessage>(value).map_err(|e| e.to_string())?
    };

    Ok(match message {
        HostMessage::Unrecognized => Inbound::Ignored,
        message => Inbound::Message(message),
    })
}

/// Value reported to the host on each successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateValue {
    /// Always `"update"`.
    pub action: UpdateAction,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateAction {
    Update,
}

impl UpdateValue {
    pub fn new(count: u64) -> Self {
        Self {
            action: UpdateAction::Update,
            count,
        }
    }
}

/// A message sent from this component to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "streamlit:componentReady")]
    ComponentReady {
        #[serde(rename = "apiVersion")]
        api_version: u32,
    },

    #[serde(rename = "streamlit:setFrameHeight")]
    SetFrameHeight { height: u32 },

    #[serde(rename = "streamlit:setComponentValue")]
    SetComponentValue {
        value: UpdateValue,
        #[serde(rename = "dataType")]
        data_type: &'static str,
    },
}

impl OutboundMessage {
    pub fn ready() -> Self {
        OutboundMessage::ComponentReady {
            api_version: COMPONENT_API_VERSION,
        }
    }

    /// The widget renders nothing, so it always reports a zero-height frame.
    pub fn zero_height() -> Self {
        OutboundMessage::SetFrameHeight { height: 0 }
    }

    pub fn update(count: u64) -> Self {
        OutboundMessage::SetComponentValue {
            value: UpdateValue::new(count),
            data_type: "json",
        }
    }

    /// Serialize to a single NDJSON line (without the trailing newline).
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_start_refresh() {
        let line = r#"{"action":"start_refresh","interval":5000,"key":"comp12","refreshLimit":10,"lock_expiration":20000}"#;

        let inbound = decode_line(line).unwrap();

        assert_eq!(
            inbound,
            Inbound::Message(HostMessage::StartRefresh(StartRefresh {
                interval: Some(5000),
                key: Some("comp12".to_string()),
                refresh_limit: Some(10),
                lock_expiration: Some(20000),
            }))
        );
    }

    #[test]
    fn test_decode_start_refresh_accepts_float_numbers() {
        let line = r#"{"action":"start_refresh","interval":2500.0,"limit":3.9,"lock_expiration":1500.5}"#;

        let Inbound::Message(HostMessage::StartRefresh(req)) = decode_line(line).unwrap() else {
            panic!("expected start_refresh");
        };

        assert_eq!(req.interval, Some(2500));
        assert_eq!(req.refresh_limit, Some(3));
        assert_eq!(req.lock_expiration, Some(1500));
    }

    #[test]
    fn test_decode_start_refresh_negative_numbers_map_to_zero() {
        let line = r#"{"action":"start_refresh","interval":-5,"refreshLimit":-2.5,"lock_expiration":-1}"#;

        let Inbound::Message(HostMessage::StartRefresh(req)) = decode_line(line).unwrap() else {
            panic!("expected start_refresh");
        };

        assert_eq!(req.interval, Some(0));
        assert_eq!(req.refresh_limit, Some(0));
        assert_eq!(req.lock_expiration, Some(0));
    }

    #[test]
    fn test_decode_render_envelope() {
        let line = json!({
            "type": "streamlit:render",
            "args": {"action": "set_lock", "lock_state": true},
            "dfs": []
        })
        .to_string();

        assert_eq!(
            decode_line(&line).unwrap(),
            Inbound::Message(HostMessage::SetLock { lock_state: true })
        );
    }

    #[test]
    fn test_limit_alias_is_accepted() {
        let line = r#"{"action":"start_refresh","interval":1000,"limit":3}"#;

        let Inbound::Message(HostMessage::StartRefresh(req)) = decode_line(line).unwrap() else {
            panic!("expected start_refresh");
        };
        assert_eq!(req.refresh_limit, Some(3));
    }

    #[test]
    fn test_lock_expiration_absent_vs_null() {
        let absent = r#"{"action":"start_refresh","interval":1000}"#;
        let null = r#"{"action":"start_refresh","interval":1000,"lock_expiration":null}"#;

        let Inbound::Message(HostMessage::StartRefresh(absent)) = decode_line(absent).unwrap()
        else {
            panic!("expected start_refresh");
        };
        let Inbound::Message(HostMessage::StartRefresh(null)) = decode_line(null).unwrap() else {
            panic!("expected start_refresh");
        };

        assert_eq!(absent.lock_expiration, Some(DEFAULT_LOCK_EXPIRATION_MS));
        assert_eq!(null.lock_expiration, None);
    }

    #[test]
    fn test_lock_state_only_literal_true_locks() {
        for (state, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!("true"), false),
            (json!(1), false),
            (Value::Null, false),
        ] {
            let line = json!({"action": "set_lock", "lock_state": state}).to_string();
            assert_eq!(
                decode_line(&line).unwrap(),
                Inbound::Message(HostMessage::SetLock {
                    lock_state: expected
                })
            );
        }

        let missing = r#"{"action":"set_lock"}"#;
        assert_eq!(
            decode_line(missing).unwrap(),
            Inbound::Message(HostMessage::SetLock { lock_state: false })
        );
    }

    #[test]
    fn test_unknown_action_and_envelope_are_ignored() {
        assert_eq!(
            decode_line(r#"{"action":"explode"}"#).unwrap(),
            Inbound::Ignored
        );
        assert_eq!(
            decode_line(r#"{"type":"streamlit:themeChanged"}"#).unwrap(),
            Inbound::Ignored
        );
    }

    #[test]
    fn test_malformed_line_is_error() {
        assert!(decode_line("{not json").is_err());
        assert!(decode_line(r#"{"action":"start_refresh","interval":"fast"}"#).is_err());
    }

    #[test]
    fn test_outbound_wire_shapes() {
        assert_eq!(
            serde_json::to_value(OutboundMessage::ready()).unwrap(),
            json!({"type": "streamlit:componentReady", "apiVersion": 1})
        );
        assert_eq!(
            serde_json::to_value(OutboundMessage::zero_height()).unwrap(),
            json!({"type": "streamlit:setFrameHeight", "height": 0})
        );
        assert_eq!(
            serde_json::to_value(OutboundMessage::update(7)).unwrap(),
            json!({
                "type": "streamlit:setComponentValue",
                "value": {"action": "update", "count": 7},
                "dataType": "json"
            })
        );
    }
}
