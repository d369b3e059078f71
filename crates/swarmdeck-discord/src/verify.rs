// ABOUTME: Ed25519 verification of Discord interaction requests.
// ABOUTME: Signature covers timestamp || body, checked against the application's public key.

use crate::error::{DiscordError, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Build a verifier from the hex public key shown in the developer portal.
    pub fn from_hex(public_key: &str) -> Result<Self> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| DiscordError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DiscordError::InvalidKey("expected 32 bytes".into()))?;
        let key =
            VerifyingKey::from_bytes(&bytes).map_err(|e| DiscordError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> Result<()> {
        let sig_bytes = hex::decode(signature_hex.trim()).map_err(|_| DiscordError::InvalidSignature)?;
        let sig_bytes: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| DiscordError::InvalidSignature)?;
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| DiscordError::InvalidSignature)
    }
}
