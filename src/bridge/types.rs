//! Wire types for the content → host bridge.
//!
//! A message is a single JSON string:
//!
//! ```text
//! {
//!   "key": "auth" | "goBack",
//!   "authProps"?: { "isSigned": boolean, "tokens": { "accessToken": string } },
//!   "apiHost"?: string
//! }
//! ```
//!
//! Decoding is validate-then-tag: the payload is checked against the wire
//! schema and then mapped onto the closed [`BridgeMessage`] set. Unknown keys
//! become [`BridgeMessage::Unknown`], not errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials handed over by the signed-in web content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProps {
    /// Whether the user is signed in. Registration only proceeds when true.
    #[serde(default)]
    pub is_signed: bool,
    /// Session tokens.
    #[serde(default)]
    pub tokens: AuthTokens,
}

impl AuthProps {
    /// The bearer credential, if present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.tokens
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Token bag inside [`AuthProps`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Opaque bearer credential.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Payload of an `auth` message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequest {
    /// Sign-in state and tokens, if the content sent them.
    pub auth_props: Option<AuthProps>,
    /// Backend address chosen by the content.
    pub api_host: Option<String>,
}

/// A decoded bridge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    /// Register this device for push notifications.
    Auth(AuthRequest),
    /// Navigate the embedded surface back one entry.
    GoBack,
    /// A key this host build does not know about.
    Unknown(String),
}

/// Raw wire shape. Unknown top-level fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    key: String,
    #[serde(default)]
    auth_props: Option<AuthProps>,
    #[serde(default)]
    api_host: Option<String>,
}

impl From<WireMessage> for BridgeMessage {
    fn from(wire: WireMessage) -> Self {
        match wire.key.as_str() {
            "auth" => Self::Auth(AuthRequest {
                auth_props: wire.auth_props,
                api_host: wire.api_host,
            }),
            "goBack" => Self::GoBack,
            _ => Self::Unknown(wire.key),
        }
    }
}

impl BridgeMessage {
    /// Decode a raw payload from the embedded content.
    ///
    /// Fails on malformed JSON or a schema mismatch (missing or non-string
    /// `key`, wrongly typed `authProps`/`apiHost`).
    ///
    /// Positional arrays are rejected wherever the schema has an object.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if !has_object_shape(&value) {
            return Err(serde::de::Error::custom(
                "bridge message must be a JSON object",
            ));
        }
        WireMessage::deserialize(value).map(Self::from)
    }

    /// The wire discriminator.
    pub fn key(&self) -> &str {
        match self {
            Self::Auth(_) => "auth",
            Self::GoBack => "goBack",
            Self::Unknown(key) => key,
        }
    }
}

/// Objects where the schema has objects. `authProps` may be absent or null.
fn has_object_shape(value: &Value) -> bool {
    let Value::Object(message) = value else {
        return false;
    };
    match message.get("authProps") {
        None | Some(Value::Null) => true,
        Some(Value::Object(props)) => matches!(
            props.get("tokens"),
            None | Some(Value::Object(_))
        ),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_message() {
        let raw = r#"{
            "key": "auth",
            "authProps": { "isSigned": true, "tokens": { "accessToken": "abc" } },
            "apiHost": "https://api.example.com"
        }"#;

        let msg = BridgeMessage::parse(raw).unwrap();
        let BridgeMessage::Auth(request) = msg else {
            panic!("expected auth message, got {msg:?}");
        };
        let props = request.auth_props.unwrap();
        assert!(props.is_signed);
        assert_eq!(props.access_token(), Some("abc"));
        assert_eq!(request.api_host.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn test_parse_auth_without_props() {
        let msg = BridgeMessage::parse(r#"{"key":"auth"}"#).unwrap();
        assert_eq!(msg, BridgeMessage::Auth(AuthRequest::default()));
    }

    #[test]
    fn test_parse_go_back_ignores_extra_fields() {
        let msg = BridgeMessage::parse(r#"{"key":"goBack","extra":{"nested":[1,2]}}"#).unwrap();
        assert_eq!(msg, BridgeMessage::GoBack);
        assert_eq!(msg.key(), "goBack");
    }

    #[test]
    fn test_unknown_key_is_not_an_error() {
        let msg = BridgeMessage::parse(r#"{"key":"ping"}"#).unwrap();
        assert_eq!(msg, BridgeMessage::Unknown("ping".to_string()));
        assert_eq!(msg.key(), "ping");
    }

    #[test]
    fn test_schema_mismatches_fail() {
        for raw in [
            "",
            "not json",
            "{",
            "null",
            "42",
            r#""auth""#,
            r#"["auth"]"#,
            r"{}",
            r#"{"key":1}"#,
            r#"{"key":null}"#,
            r#"{"key":"auth","authProps":"yes"}"#,
            r#"{"key":"auth","authProps":{"isSigned":"true"}}"#,
            r#"{"key":"auth","apiHost":42}"#,
            r#"["goBack"]"#,
            r#"["auth",{"isSigned":true,"tokens":{"accessToken":"abc"}},"https://evil.example"]"#,
            r#"{"key":"auth","authProps":[true,{"accessToken":"abc"}]}"#,
            r#"{"key":"auth","authProps":{"isSigned":true,"tokens":["abc"]}}"#,
        ] {
            assert!(BridgeMessage::parse(raw).is_err(), "expected failure for {raw:?}");
        }
    }

    #[test]
    fn test_empty_access_token_is_absent() {
        let props = AuthProps {
            is_signed: true,
            tokens: AuthTokens {
                access_token: Some(String::new()),
            },
        };
        assert_eq!(props.access_token(), None);
    }
}
