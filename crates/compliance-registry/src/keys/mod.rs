//! Issuer key management and signing

mod manager;
mod signer;

pub use manager::{KeyError, KeyManager};
pub use signer::Signer;
