//! HMAC-SHA256 Webhook Verification
//!
//! Twitch signs `message_id || timestamp || body` with the webhook secret
//! and sends `sha256=<hex>` in `Twitch-Eventsub-Message-Signature`.
//! Verification fails closed: a missing secret, a missing or malformed
//! header, and a mismatch are all rejections.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Prefix Twitch puts in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Length of a hex-encoded SHA-256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

/// Why a signature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("webhook secret is not configured")]
    MissingSecret,
    #[error("signature header is missing")]
    MissingSignature,
    #[error("signature header is malformed")]
    MalformedSignature,
    #[error("signature does not match")]
    Mismatch,
}

/// Build the byte string Twitch signs.
pub fn signed_message(message_id: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(message_id.len() + timestamp.len() + body.len());
    message.extend_from_slice(message_id.as_bytes());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);
    message
}

fn compute(secret: &str, message: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Sign a message and return the header value (`sha256=<hex>`).
pub fn sign_payload(secret: &str, message: &[u8]) -> String {
    format!("{SIGNATURE_PREFIX}{}", hex::encode(compute(secret, message)))
}

/// Decode a signature header into digest bytes.
fn decode_signature(signature: &str) -> Result<Vec<u8>, VerifyError> {
    let digest = signature
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .unwrap_or_else(|| signature.trim());
    if digest.len() != SIGNATURE_HEX_LEN {
        return Err(VerifyError::MalformedSignature);
    }
    hex::decode(digest).map_err(|_| VerifyError::MalformedSignature)
}

/// Verify a signature header against a message.
pub fn verify_signature(
    secret: Option<&str>,
    message: &[u8],
    signature: Option<&str>,
) -> Result<(), VerifyError> {
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or(VerifyError::MissingSecret)?;
    let signature = signature
        .filter(|s| !s.trim().is_empty())
        .ok_or(VerifyError::MissingSignature)?;

    let provided = decode_signature(signature)?;
    let expected = compute(secret, message);

    if bool::from(expected.ct_eq(&provided)) {
        Ok(())
    } else {
        Err(VerifyError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cr3t-webhook-secret";

    #[test]
    fn sign_and_verify() {
        let message = signed_message("msg-1", "2024-01-01T00:00:00Z", b"{\"a\":1}");
        let sig = sign_payload(SECRET, &message);
        assert!(sig.starts_with("sha256="));
        assert_eq!(verify_signature(Some(SECRET), &message, Some(&sig)), Ok(()));
        assert_eq!(
            verify_signature(Some("wrong"), &message, Some(&sig)),
            Err(VerifyError::Mismatch)
        );
        assert_eq!(
            verify_signature(Some(SECRET), b"other", Some(&sig)),
            Err(VerifyError::Mismatch)
        );
    }

    #[test]
    fn bare_hex_signature_is_accepted() {
        let sig = sign_payload(SECRET, b"payload");
        let bare = sig.trim_start_matches(SIGNATURE_PREFIX);
        assert!(verify_signature(Some(SECRET), b"payload", Some(bare)).is_ok());
    }

    #[test]
    fn any_single_bit_flip_fails() {
        let sig = sign_payload(SECRET, b"payload");
        let bytes = hex::decode(sig.trim_start_matches(SIGNATURE_PREFIX)).unwrap();

        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut flipped = bytes.clone();
                flipped[byte] ^= 1 << bit;
                let header = format!("sha256={}", hex::encode(&flipped));
                assert_eq!(
                    verify_signature(Some(SECRET), b"payload", Some(&header)),
                    Err(VerifyError::Mismatch),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn empty_or_missing_secret_always_fails() {
        let sig = sign_payload("", b"payload");
        assert_eq!(
            verify_signature(Some(""), b"payload", Some(&sig)),
            Err(VerifyError::MissingSecret)
        );
        assert_eq!(
            verify_signature(None, b"payload", Some(&sig)),
            Err(VerifyError::MissingSecret)
        );
    }

    #[test]
    fn malformed_headers_fail() {
        assert_eq!(
            verify_signature(Some(SECRET), b"p", None),
            Err(VerifyError::MissingSignature)
        );
        assert_eq!(
            verify_signature(Some(SECRET), b"p", Some("sha256=xyz")),
            Err(VerifyError::MalformedSignature)
        );
        let not_hex = format!("sha256={}", "g".repeat(64));
        assert_eq!(
            verify_signature(Some(SECRET), b"p", Some(&not_hex)),
            Err(VerifyError::MalformedSignature)
        );
    }

    #[test]
    fn signed_message_concatenates_parts() {
        assert_eq!(signed_message("id", "ts", b"body"), b"idtsbody".to_vec());
        assert_eq!(signed_message("", "", b"body"), b"body".to_vec());
    }
}
