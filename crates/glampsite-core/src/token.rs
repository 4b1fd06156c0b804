//! Session token payload decoding.
//!
//! Session tokens are three-segment signed strings (`header.payload.signature`)
//! issued by the booking API. This module only reads the payload segment:
//! the signature is verified by the issuer, never here.
//!
//! Decoding is all-or-nothing. A payload missing `role` or `userId` is rejected
//! as a whole, and every decode or parse failure surfaces as `None` from
//! [`decode_token`] rather than as a panic or partially-filled payload.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

use crate::TRACING_TARGET_TOKEN;

/// Standard-alphabet engine that tolerates non-canonical trailing bits.
///
/// URL-safe characters are mapped onto the standard alphabet before decoding,
/// so both encodings are accepted.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a session token could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token does not have exactly three dot-separated segments.
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),
    /// The payload segment is not valid base64.
    #[error("payload segment is not valid base64")]
    Base64(#[from] base64::DecodeError),
    /// The payload is not a JSON object with the expected claim types.
    #[error("payload is not a valid claims object")]
    Json(#[from] serde_json::Error),
    /// A required claim is absent, null or empty.
    #[error("required claim `{0}` is missing")]
    MissingClaim(&'static str),
}

/// Decoded, untrusted claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPayload {
    /// Role identifier, exactly as issued.
    pub role: String,
    /// Identifier of the signed-in user.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Issued-at time in Unix seconds.
    #[serde(rename = "iat", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    /// Expiry time in Unix seconds.
    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Wire shape of the payload before required claims are enforced.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    role: Option<String>,
    #[serde(default, rename = "userId")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "informational_unix_seconds")]
    iat: Option<i64>,
    #[serde(default, deserialize_with = "unix_seconds")]
    exp: Option<i64>,
}

fn floor_seconds(number: &serde_json::Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|seconds| seconds.floor() as i64))
}

/// Accepts any JSON number, flooring fractional seconds.
fn unix_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.as_ref().and_then(floor_seconds))
}

/// Like [`unix_seconds`], but a value of any other type reads as absent.
///
/// `iat` is never used for gating.
fn informational_unix_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => floor_seconds(&number),
        _ => None,
    })
}

fn required(claim: Option<String>, name: &'static str) -> Result<String, TokenError> {
    claim
        .filter(|value| !value.is_empty())
        .ok_or(TokenError::MissingClaim(name))
}

/// Decodes a base64 segment, restoring any stripped `=` padding first.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut padded: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    PAYLOAD_ENGINE.decode(padded)
}

impl TokenPayload {
    /// Decodes the payload of a raw token, reporting why decoding failed.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] for a wrong segment count, a payload that is not
    /// base64 or not a claims object, or a missing `role`/`userId` claim.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let segments: Vec<&str> = raw.split('.').collect();
        let [_header, payload, _signature] = segments.as_slice() else {
            return Err(TokenError::SegmentCount(segments.len()));
        };

        let bytes = decode_segment(payload)?;
        let claims: RawClaims = serde_json::from_slice(&bytes)?;

        Ok(Self {
            role: required(claims.role, "role")?,
            user_id: required(claims.user_id, "userId")?,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Returns `true` if `exp` is present and strictly before `now`.
    ///
    /// `now` keeps its sub-second part, so a token is still valid during the
    /// instant `exp` names and expired right after it. A fractional `exp` was
    /// floored on decode and therefore never outlives its claim. Tokens
    /// without an `exp` claim never expire at this layer.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };

        match Timestamp::from_second(expires_at) {
            Ok(expiry) => expiry < now,
            // Outside jiff's range: far past or far future.
            Err(_) => expires_at < 0,
        }
    }

    /// Returns `true` if the token has expired as of the current time.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// Returns the expiry claim as a timestamp, if present and representable.
    #[must_use]
    pub fn expiry(&self) -> Option<Timestamp> {
        self.expires_at
            .and_then(|seconds| Timestamp::from_second(seconds).ok())
    }
}

/// Decodes a raw session token into its payload.
///
/// Returns `None` for any malformed token. The reason is logged at debug level
/// only; callers treat every failure like an absent token.
#[must_use]
pub fn decode_token(raw: &str) -> Option<TokenPayload> {
    match TokenPayload::parse(raw) {
        Ok(payload) => Some(payload),
        Err(error) => {
            tracing::debug!(
                target: TRACING_TARGET_TOKEN,
                error = %error,
                "rejected malformed session token"
            );
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::{Value, json};

    use super::*;

    /// Issues an HS256-signed token carrying the given claims.
    pub(crate) fn issue(claims: &Value) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"booking-api-secret"),
        )
        .expect("token encoding")
    }

    /// Builds an unsigned three-segment token with a hand-encoded payload.
    fn with_payload(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_signed_token() {
        let token = issue(&json!({
            "role": "AGENT",
            "userId": "agent-17",
            "iat": 1_700_000_000,
            "exp": 1_700_604_800,
        }));

        let payload = decode_token(&token).expect("valid token");
        assert_eq!(payload.role, "AGENT");
        assert_eq!(payload.user_id, "agent-17");
        assert_eq!(payload.issued_at, Some(1_700_000_000));
        assert_eq!(payload.expires_at, Some(1_700_604_800));
    }

    #[test]
    fn keeps_claims_verbatim() {
        let token = issue(&json!({ "role": " admin ", "userId": "U-1" }));

        let payload = decode_token(&token).expect("valid token");
        assert_eq!(payload.role, " admin ");
        assert_eq!(payload.user_id, "U-1");
        assert_eq!(payload.issued_at, None);
        assert_eq!(payload.expires_at, None);
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        for raw in ["", "abc", "a.b", "a.b.c.d", "a.b.c.d.e", "...."] {
            assert!(decode_token(raw).is_none(), "accepted {raw:?}");
        }

        assert!(matches!(
            TokenPayload::parse("a.b"),
            Err(TokenError::SegmentCount(2))
        ));
        assert!(matches!(
            TokenPayload::parse("a.b.c.d"),
            Err(TokenError::SegmentCount(4))
        ));
    }

    #[test]
    fn rejects_missing_required_claims() {
        let no_role = issue(&json!({ "userId": "u-1", "exp": 4_102_444_800_i64 }));
        let no_user = issue(&json!({ "role": "ADMIN" }));
        let null_role = issue(&json!({ "role": null, "userId": "u-1" }));
        let empty_user = issue(&json!({ "role": "ADMIN", "userId": "" }));

        for token in [&no_role, &no_user, &null_role, &empty_user] {
            assert!(decode_token(token).is_none());
        }

        assert!(matches!(
            TokenPayload::parse(&no_role),
            Err(TokenError::MissingClaim("role"))
        ));
        assert!(matches!(
            TokenPayload::parse(&no_user),
            Err(TokenError::MissingClaim("userId"))
        ));
    }

    #[test]
    fn rejects_undecodable_payloads() {
        assert!(matches!(
            TokenPayload::parse(&with_payload("!!!not-base64!!!")),
            Err(TokenError::Base64(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode("role=ADMIN");
        assert!(matches!(
            TokenPayload::parse(&with_payload(&not_json)),
            Err(TokenError::Json(_))
        ));

        let not_object = URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(decode_token(&with_payload(&not_object)).is_none());

        let numeric_role = URL_SAFE_NO_PAD.encode(r#"{"role":7,"userId":"u"}"#);
        assert!(decode_token(&with_payload(&numeric_role)).is_none());

        let text_expiry = URL_SAFE_NO_PAD.encode(r#"{"role":"ADMIN","userId":"u","exp":"soon"}"#);
        assert!(decode_token(&with_payload(&text_expiry)).is_none());
    }

    #[test]
    fn malformed_issued_at_is_ignored() {
        for iat in [r#""yesterday""#, "true", "[1]", r#"{"s":1}"#] {
            let json = format!(r#"{{"role":"ADMIN","userId":"u","iat":{iat}}}"#);
            let segment = URL_SAFE_NO_PAD.encode(json);

            let payload = decode_token(&with_payload(&segment)).expect("valid payload");
            assert_eq!(payload.role, "ADMIN");
            assert_eq!(payload.issued_at, None);
        }
    }

    #[test]
    fn restores_padding_and_accepts_both_alphabets() {
        // 46 bytes encode to 62 characters unpadded, 64 padded.
        let json = r#"{"role":"ADMIN","userId":"u-1","exp":12345678}"#;
        assert_eq!(json.len() % 3, 1);

        let unpadded = URL_SAFE_NO_PAD.encode(json);
        let padded = STANDARD.encode(json);
        assert!(!unpadded.ends_with('='));
        assert!(padded.ends_with("=="));

        for segment in [unpadded, padded] {
            let payload = decode_token(&with_payload(&segment)).expect("valid payload");
            assert_eq!(payload.role, "ADMIN");
            assert_eq!(payload.expires_at, Some(12_345_678));
        }

        // Encodes to `+` and `/` in the standard alphabet.
        let tricky = r#"{"role":"AGENT","userId":"~~~?>"}"#;
        let standard = STANDARD.encode(tricky);
        let url_safe = URL_SAFE_NO_PAD.encode(tricky);
        assert_ne!(standard.trim_end_matches('='), url_safe);

        for segment in [standard, url_safe] {
            let payload = decode_token(&with_payload(&segment)).expect("valid payload");
            assert_eq!(payload.user_id, "~~~?>");
        }
    }

    #[test]
    fn floors_fractional_timestamps() {
        let token = issue(&json!({
            "role": "AGENT",
            "userId": "a",
            "iat": 1_700_000_000.75,
            "exp": 1_700_000_100.5,
        }));

        let payload = decode_token(&token).expect("valid token");
        assert_eq!(payload.issued_at, Some(1_700_000_000));
        assert_eq!(payload.expires_at, Some(1_700_000_100));
    }

    #[test]
    fn expiry_is_strict() -> Result<(), jiff::Error> {
        let now = Timestamp::from_second(1_800_000_000)?;
        let payload = |exp: Option<i64>, iat: Option<i64>| TokenPayload {
            role: "ADMIN".into(),
            user_id: "u".into(),
            issued_at: iat,
            expires_at: exp,
        };

        assert!(payload(Some(1_799_999_999), None).is_expired_at(now));
        assert!(!payload(Some(1_800_000_000), None).is_expired_at(now));
        assert!(!payload(Some(1_800_000_001), None).is_expired_at(now));
        assert!(!payload(None, None).is_expired_at(now));
        assert!(!payload(None, Some(0)).is_expired_at(now));
        assert!(!payload(None, Some(1_900_000_000)).is_expired_at(now));
        Ok(())
    }

    #[test]
    fn expiry_compares_below_the_second() -> Result<(), jiff::Error> {
        let token = issue(&json!({ "role": "ADMIN", "userId": "u", "exp": 1_800_000_000.5 }));
        let payload = decode_token(&token).expect("valid token");

        assert!(payload.is_expired_at(Timestamp::new(1_800_000_000, 900_000_000)?));
        assert!(!payload.is_expired_at(Timestamp::from_second(1_800_000_000)?));
        assert!(payload.is_expired_at(Timestamp::new(1_800_000_000, 1_000_000)?));
        Ok(())
    }

    #[test]
    fn out_of_range_expiry() -> Result<(), jiff::Error> {
        let now = Timestamp::from_second(1_800_000_000)?;
        let payload = |exp: i64| TokenPayload {
            role: "ADMIN".into(),
            user_id: "u".into(),
            issued_at: None,
            expires_at: Some(exp),
        };

        assert!(!payload(i64::MAX).is_expired_at(now));
        assert!(payload(i64::MIN).is_expired_at(now));
        Ok(())
    }

    #[test]
    fn expiry_against_wall_clock() {
        let past = issue(&json!({ "role": "AGENT", "userId": "a", "exp": 946_684_800 }));
        let future = issue(&json!({ "role": "AGENT", "userId": "a", "exp": 4_102_444_800_i64 }));

        assert!(decode_token(&past).expect("valid").is_expired());
        assert!(!decode_token(&future).expect("valid").is_expired());
        assert_eq!(
            decode_token(&future).and_then(|p| p.expiry()),
            Timestamp::from_second(4_102_444_800).ok()
        );
    }
}
