//! Signature verification for stored compliance records
//!
//! Verification never fails with an error: malformed hex, wrong lengths, bad
//! curve points and signature mismatches are all just an invalid signature.
//! Only the caller-supplied public key is trusted; the issuer's private key is
//! never consulted.

use tracing::{debug, warn};

use crate::crypto::{decode_public_key, decode_signature, PublicKey};
use crate::error::Result;
use crate::types::{ComplianceClaim, ComplianceStatus, IssuedAt};

/// Check a stored signature against the claimed fields
///
/// Signatures are made over `status = active` at issuance. Callers verifying a
/// revoked record must pass [`ComplianceStatus::Active`] here and report the
/// live status separately, otherwise the check fails.
pub fn verify(
    domain_name: &str,
    status: ComplianceStatus,
    compliance_level: &str,
    issued_at: impl Into<IssuedAt>,
    signature_hex: &str,
    public_key_hex: &str,
) -> bool {
    let claim = ComplianceClaim::new(domain_name, status, compliance_level, issued_at);
    match check(&claim, signature_hex, public_key_hex) {
        Ok(()) => {
            debug!(domain = %domain_name, "Signature verified");
            true
        }
        Err(e) => {
            warn!(domain = %domain_name, error = %e, "Signature verification failed");
            false
        }
    }
}

fn check(claim: &ComplianceClaim, signature_hex: &str, public_key_hex: &str) -> Result<()> {
    let public_key = PublicKey::from_bytes(&decode_public_key(public_key_hex)?)?;
    let signature = decode_signature(signature_hex)?;
    public_key.verify_claim(claim, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use chrono::{TimeZone, Utc};

    fn issued() -> IssuedAt {
        Utc.with_ymd_and_hms(2026, 2, 24, 12, 0, 0).unwrap().into()
    }

    fn signed() -> (String, String) {
        let kp = KeyPair::generate();
        let record = kp
            .sign_claim(&ComplianceClaim::issuance("example.com", "basic", issued()))
            .unwrap();
        (record.signature_hex(), record.public_key_hex())
    }

    #[test]
    fn test_valid_signature() {
        let (sig, pk) = signed();
        assert!(verify("example.com", ComplianceStatus::Active, "basic", issued(), &sig, &pk));
    }

    #[test]
    fn test_revoked_status_does_not_match_issuance() {
        let (sig, pk) = signed();
        assert!(!verify("example.com", ComplianceStatus::Revoked, "basic", issued(), &sig, &pk));
    }

    #[test]
    fn test_malformed_hex_is_invalid() {
        let (sig, pk) = signed();
        let active = ComplianceStatus::Active;

        assert!(!verify("example.com", active, "basic", issued(), "not-hex", &pk));
        assert!(!verify("example.com", active, "basic", issued(), &sig, "xyz"));
        assert!(!verify("example.com", active, "basic", issued(), &sig[..127], &pk));
        assert!(!verify("example.com", active, "basic", issued(), &sig, &pk[..63]));
    }

    #[test]
    fn test_wrong_lengths_are_invalid() {
        let (sig, pk) = signed();
        let active = ComplianceStatus::Active;

        assert!(!verify("example.com", active, "basic", issued(), &sig[..126], &pk));
        assert!(!verify("example.com", active, "basic", issued(), &format!("{sig}00"), &pk));
        assert!(!verify("example.com", active, "basic", issued(), &sig, &pk[..62]));
        assert!(!verify("example.com", active, "basic", issued(), "", ""));
    }

    #[test]
    fn test_small_order_key_is_invalid() {
        let (sig, _) = signed();
        // Encoding of the identity point
        let mut identity = [0u8; 32];
        identity[0] = 1;
        let bad_pk = hex::encode(identity);
        assert!(!verify("example.com", ComplianceStatus::Active, "basic", issued(), &sig, &bad_pk));
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let (sig, pk) = signed();
        assert!(verify(
            "example.com",
            ComplianceStatus::Active,
            "basic",
            issued(),
            &sig.to_uppercase(),
            &pk.to_uppercase(),
        ));
    }
}
