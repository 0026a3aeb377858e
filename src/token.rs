//! Identity token payload decoding.
//!
//! The identity token is a compact JWS: `header.payload.signature`, every
//! segment URL-safe base64. Only the payload is decoded. The signature is
//! not verified here.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use error_stack::{IntoReport, Result, ResultExt};
use tracing::debug;

use crate::utils::IntoReportExt;

/// Claims of the token payload segment.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Claim which identifies the user.
pub const SUBJECT_CLAIM: &str = "sub";

/// Standard alphabet decoder which requires correct padding and ignores
/// nonzero trailing bits.
const PERMISSIVE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Token did not contain a payload segment")]
    MalformedToken,

    #[error("Token payload segment was not valid base64")]
    InvalidBase64,

    #[error("Token payload was not a JSON object")]
    InvalidJson,
}

/// Decode claims from the second segment of a dot-separated token.
pub fn decode_payload_segment(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 {
        debug!("the identity token has {} segment(s)", segments.len());
        return Err(DecodeError::MalformedToken)
            .into_report()
            .attach_printable_lazy(|| format!("segment count: {}", segments.len()));
    }

    let payload = base64_url_decode(segments[1]).map_err(|e| {
        debug!("invalid base64 url");
        e
    })?;

    decode_json_object(&payload).map_err(|e| {
        debug!("invalid json");
        e
    })
}

/// Convert URL-safe base64 to the standard alphabet and pad it to a
/// multiple of four characters.
pub fn normalize_base64_url(value: &str) -> String {
    let mut base64 = value.replace('-', "+").replace('_', "/");
    let padding = padding_length(base64.len());
    base64.extend(std::iter::repeat('=').take(padding));
    base64
}

/// Count of `=` characters needed to make `len` a multiple of four.
pub fn padding_length(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn base64_url_decode(value: &str) -> Result<Vec<u8>, DecodeError> {
    let normalized = normalize_base64_url(value);
    decode_base64_permissive(&normalized)
        .into_error_with_info(DecodeError::InvalidBase64, normalized)
}

/// Decode padded standard base64, skipping every character outside the
/// alphabet. Padding is counted before skipping, so stray characters can
/// leave the remaining input misaligned.
fn decode_base64_permissive(value: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let filtered: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    PERMISSIVE.decode(filtered)
}

fn decode_json_object(data: &[u8]) -> Result<Claims, DecodeError> {
    let value = serde_json::from_slice::<serde_json::Value>(data)
        .into_error(DecodeError::InvalidJson)?;
    match value {
        serde_json::Value::Object(claims) => Ok(claims),
        other => Err(DecodeError::InvalidJson)
            .into_report()
            .attach_printable_lazy(|| format!("top level value: {}", other)),
    }
}

/// String value of the `sub` claim, if the claim exists and is a string.
pub fn subject(claims: &Claims) -> Option<&str> {
    claims.get(SUBJECT_CLAIM).and_then(|v| v.as_str())
}

/// Log the JOSE header of the token. Only for diagnostics, the header is
/// not trusted for anything.
pub fn log_header(token: &str) {
    match jsonwebtoken::decode_header(token) {
        Ok(header) => debug!("identity token header: {:?}", header),
        Err(e) => debug!("identity token header decoding failed: {}", e),
    }
}
