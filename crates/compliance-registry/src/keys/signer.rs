//! Issuance signing
//!
//! Every record is signed once, at creation, over its `active` claim.

use std::sync::Arc;

use compliance_core::{ComplianceClaim, IssuedAt, SignatureRecord};
use tracing::info;

use super::manager::{KeyError, KeyManager};

/// Signs issuance claims with the registry key
#[derive(Debug, Clone)]
pub struct Signer {
    keys: Arc<KeyManager>,
}

impl Signer {
    /// Create a signer backed by the given key manager
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    /// The key manager this signer draws from
    pub fn keys(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    /// Sign the issuance claim for a new record
    ///
    /// The claim is always canonicalized with `status = active`, whatever
    /// status the record later takes.
    pub fn sign(
        &self,
        domain_name: &str,
        compliance_level: &str,
        issued_at: impl Into<IssuedAt>,
    ) -> Result<SignatureRecord, KeyError> {
        let claim = ComplianceClaim::issuance(domain_name, compliance_level, issued_at);
        let key_pair = self.keys.obtain_signing_key()?;
        let record = key_pair.sign_claim(&claim)?;

        info!(
            domain = %claim.domain_name,
            compliance_level = %claim.compliance_level,
            issued_at = %claim.issued_at,
            "Signed issuance claim"
        );

        Ok(record)
    }
}
