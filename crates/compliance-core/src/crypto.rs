//! Ed25519 primitives for signing compliance claims
//!
//! Key types:
//! - `KeyPair`: the issuer's signing key
//! - `PublicKey`: verification key carried alongside every record
//! - `SignatureRecord`: signature and public key as stored with a record
//!
//! All key material crosses boundaries as lowercase hex. Decoding goes through
//! [`decode_fixed`], which checks the decoded length explicitly instead of
//! leaving malformed input to the signature library.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::error::{ComplianceError, Result};
use crate::types::ComplianceClaim;

/// Raw private scalar (seed) length
pub const SECRET_KEY_LENGTH: usize = 32;

/// Raw public key length
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Raw signature length
pub const SIGNATURE_LENGTH: usize = 64;

/// Lowercase hex encoding
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex into exactly `N` bytes
///
/// `field` names the material in error messages.
pub fn decode_fixed<const N: usize>(field: &'static str, input: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(input).map_err(|e| ComplianceError::InvalidEncoding {
        field,
        reason: e.to_string(),
    })?;

    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ComplianceError::InvalidLength {
            field,
            expected: N,
            actual,
        })
}

/// Decode a hex public key (64 hex chars)
pub fn decode_public_key(input: &str) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
    decode_fixed::<PUBLIC_KEY_LENGTH>("public key", input)
}

/// Decode a hex signature (128 hex chars)
pub fn decode_signature(input: &str) -> Result<[u8; SIGNATURE_LENGTH]> {
    decode_fixed::<SIGNATURE_LENGTH>("signature", input)
}

/// Ed25519 key pair used to sign issued claims
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &encode_hex(self.verifying_key.as_bytes()))
            .field("signing_key", &"[redacted]")
            .finish()
    }
}

impl KeyPair {
    /// Generate a new random key pair from the OS CSPRNG
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create a key pair from an existing signing key
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create a key pair from a raw 32-byte private scalar
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    /// Create a key pair from raw bytes of unchecked length
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; SECRET_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| ComplianceError::InvalidLength {
                    field: "private key",
                    expected: SECRET_KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Get the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.verifying_key,
        }
    }

    /// Raw private scalar, for writing the key file only
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Sign arbitrary bytes
    pub fn sign_bytes(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign the canonical bytes of a claim
    pub fn sign_claim(&self, claim: &ComplianceClaim) -> Result<SignatureRecord> {
        let payload = claim.to_canonical_bytes()?;
        Ok(SignatureRecord {
            signature: self.sign_bytes(&payload),
            public_key: self.verifying_key.to_bytes(),
        })
    }
}

/// Ed25519 public key for verification
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl PublicKey {
    /// Create a public key from raw bytes
    ///
    /// Fails if the bytes are not a valid compressed Edwards point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(bytes)?;
        Ok(Self { verifying_key })
    }

    /// Parse a hex public key
    pub fn from_hex(input: &str) -> Result<Self> {
        Self::from_bytes(&decode_public_key(input)?)
    }

    /// Get the raw verifying key bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// Lowercase hex, 64 characters
    pub fn to_hex(&self) -> String {
        encode_hex(self.verifying_key.as_bytes())
    }

    /// Verify a signature over arbitrary bytes
    ///
    /// Uses strict verification: small-order keys and non-canonical
    /// signatures are rejected.
    pub fn verify_bytes(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> Result<()> {
        let signature = Signature::from_bytes(signature);
        self.verifying_key
            .verify_strict(message, &signature)
            .map_err(ComplianceError::from)
    }

    /// Verify a signature over the canonical bytes of a claim
    pub fn verify_claim(
        &self,
        claim: &ComplianceClaim,
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> Result<()> {
        let payload = claim.to_canonical_bytes()?;
        self.verify_bytes(&payload, signature)
    }
}

/// Signature and signing public key as persisted with a domain record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureRecord {
    pub signature: [u8; SIGNATURE_LENGTH],
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl SignatureRecord {
    /// Lowercase hex signature, 128 characters
    pub fn signature_hex(&self) -> String {
        encode_hex(&self.signature)
    }

    /// Lowercase hex public key, 64 characters
    pub fn public_key_hex(&self) -> String {
        encode_hex(&self.public_key)
    }
}
