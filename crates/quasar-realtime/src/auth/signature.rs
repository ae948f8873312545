//! HMAC-SHA256 signatures.
//!
//! Three message shapes are signed with an application's secret:
//!
//! - private channel auth: `"{socket_id}:{channel}"`
//! - presence channel auth: `"{socket_id}:{channel}:{channel_data}"`
//! - HTTP trigger: `"{METHOD}\n{path}:{body}"`
//!
//! Signatures travel as lower-case hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use quasar_core::types::SocketId;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 MAC.
const SIGNATURE_HEX_LEN: usize = 64;

/// Computes and checks HMAC-SHA256 signatures. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Sign `message` with `secret`, returning lower-case hex.
    pub fn sign(secret: &str, message: &str) -> String {
        hex::encode(Self::mac(secret, message).finalize().into_bytes())
    }

    /// Check `candidate` against the signature of `message`.
    ///
    /// Comparison runs in constant time over the decoded MAC bytes.
    pub fn verify(secret: &str, message: &str, candidate: &str) -> bool {
        if candidate.len() != SIGNATURE_HEX_LEN || !is_lower_hex(candidate) {
            return false;
        }
        let Ok(bytes) = hex::decode(candidate) else {
            return false;
        };
        Self::mac(secret, message).verify_slice(&bytes).is_ok()
    }

    /// Message signed for a private or presence channel subscription.
    ///
    /// `channel_data` is the raw string the client sent, never re-serialized.
    pub fn channel_auth_message(
        socket_id: &SocketId,
        channel: &str,
        channel_data: Option<&str>,
    ) -> String {
        match channel_data {
            Some(data) => format!("{socket_id}:{channel}:{data}"),
            None => format!("{socket_id}:{channel}"),
        }
    }

    /// Message signed for an HTTP trigger or query request.
    pub fn request_message(method: &str, path: &str, body: &str) -> String {
        format!("{}\n{}:{}", method.to_ascii_uppercase(), path, body)
    }

    fn mac(secret: &str, message: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any length"));
        mac.update(message.as_bytes());
        mac
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_case_2() {
        let sig = SignatureVerifier::sign("Jefe", "what do ya want for nothing?");
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sign_is_lower_hex_without_breaks() {
        let sig = SignatureVerifier::sign("secret", "abc:private-room");
        assert_eq!(sig.len(), 64);
        assert!(is_lower_hex(&sig));
    }

    #[test]
    fn test_verify_accepts_own_signature() {
        let message = "GET\n/apps/k/channels:";
        let sig = SignatureVerifier::sign("s3cret", message);
        assert!(SignatureVerifier::verify("s3cret", message, &sig));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_or_message() {
        let sig = SignatureVerifier::sign("s3cret", "hello");
        assert!(!SignatureVerifier::verify("other", "hello", &sig));
        assert!(!SignatureVerifier::verify("s3cret", "hello!", &sig));
    }

    #[test]
    fn test_verify_rejects_malformed_candidates() {
        let sig = SignatureVerifier::sign("s3cret", "hello");
        assert!(!SignatureVerifier::verify("s3cret", "hello", ""));
        assert!(!SignatureVerifier::verify("s3cret", "hello", &sig[..10]));
        assert!(!SignatureVerifier::verify(
            "s3cret",
            "hello",
            &sig.to_uppercase()
        ));
        assert!(!SignatureVerifier::verify("s3cret", "hello", &"z".repeat(64)));
    }

    #[test]
    fn test_message_shapes() {
        let socket: SocketId = "6f1c2a0e-8f4b-4a57-9a4c-2f3b1d2e3c4d".parse().unwrap();
        assert_eq!(
            SignatureVerifier::channel_auth_message(&socket, "private-a", None),
            "6f1c2a0e-8f4b-4a57-9a4c-2f3b1d2e3c4d:private-a"
        );
        assert_eq!(
            SignatureVerifier::channel_auth_message(&socket, "presence-a", Some("{\"user_id\":1}")),
            "6f1c2a0e-8f4b-4a57-9a4c-2f3b1d2e3c4d:presence-a:{\"user_id\":1}"
        );
        assert_eq!(
            SignatureVerifier::request_message("post", "/apps/k/events", "{}"),
            "POST\n/apps/k/events:{}"
        );
    }
}
