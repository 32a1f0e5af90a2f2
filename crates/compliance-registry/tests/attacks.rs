//! Attack Scenario Tests
//!
//! Each test plants a forged or altered record directly in the store, the way
//! an attacker with database write access would, and checks that public
//! verification reports `signature_valid = false`.

mod common;

use chrono::{Duration, Utc};
use common::{TestServer, ADMIN_KEY};
use compliance_core::{ComplianceClaim, ComplianceStatus, IssuedAt, KeyPair};
use compliance_registry::{DomainRecord, DomainStore};
use serde_json::Value;

// =============================================================================
// Test Helpers
// =============================================================================

/// A record signed by `signer` for `domain`
fn signed_record(signer: &KeyPair, domain: &str, level: &str) -> DomainRecord {
    let issued_at = IssuedAt::now();
    let signature = signer
        .sign_claim(&ComplianceClaim::issuance(domain, level, issued_at))
        .unwrap();
    DomainRecord::issue(domain, level, issued_at.as_datetime(), &signature)
}

async fn signature_valid(server: &TestServer, domain: &str) -> bool {
    let response = server.verify(domain).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    body["signature_valid"].as_bool().unwrap()
}

fn registry_key(server: &TestServer) -> &KeyPair {
    server.keys.obtain_signing_key().unwrap()
}

// =============================================================================
// ATTACK: Field tampering
// =============================================================================

/// Upgrading a domain's compliance tier in the database breaks its signature
#[tokio::test]
async fn attack_level_upgrade_detected() {
    let server = TestServer::spawn().await;

    let mut record = signed_record(registry_key(&server), "example.com", "basic");
    record.compliance_level = "advanced".into();
    server.store.insert(record).await.unwrap();

    assert!(!signature_valid(&server, "example.com").await);
}

/// Moving a record to another domain breaks its signature
#[tokio::test]
async fn attack_domain_swap_detected() {
    let server = TestServer::spawn().await;

    let mut record = signed_record(registry_key(&server), "good.example", "basic");
    record.domain_name = "evil.example".into();
    server.store.insert(record).await.unwrap();

    assert!(!signature_valid(&server, "evil.example").await);
}

/// Back-dating the issuance time breaks the signature
#[tokio::test]
async fn attack_backdated_issuance_detected() {
    let server = TestServer::spawn().await;

    let mut record = signed_record(registry_key(&server), "example.com", "basic");
    record.issued_at -= Duration::days(365);
    server.store.insert(record).await.unwrap();

    assert!(!signature_valid(&server, "example.com").await);
}

/// Sub-second drift in a stored timestamp is not tampering
#[tokio::test]
async fn stored_subsecond_drift_still_verifies() {
    let server = TestServer::spawn().await;

    let mut record = signed_record(registry_key(&server), "example.com", "basic");
    record.issued_at += Duration::milliseconds(999);
    server.store.insert(record).await.unwrap();

    assert!(signature_valid(&server, "example.com").await);
}

// =============================================================================
// ATTACK: Signature forgery
// =============================================================================

/// A record signed by an attacker's own key, with the attacker's public key
/// stored beside it, verifies only against that key
#[tokio::test]
async fn attack_foreign_key_is_visible() {
    let server = TestServer::spawn().await;
    let attacker = KeyPair::generate();

    server
        .store
        .insert(signed_record(&attacker, "example.com", "basic"))
        .await
        .unwrap();

    let body: Value = server.verify("example.com").await.json().await.unwrap();
    assert_eq!(body["signature_valid"], true);
    assert_eq!(body["public_key"], attacker.public_key().to_hex());
    assert_ne!(body["public_key"], server.public_key_hex());
}

/// Attacker signature with the registry's public key substituted in
#[tokio::test]
async fn attack_public_key_substitution_detected() {
    let server = TestServer::spawn().await;
    let attacker = KeyPair::generate();

    let mut record = signed_record(&attacker, "example.com", "basic");
    record.public_key = server.public_key_hex();
    server.store.insert(record).await.unwrap();

    assert!(!signature_valid(&server, "example.com").await);
}

/// Re-signing with `revoked` status does not produce a valid record
#[tokio::test]
async fn attack_signature_over_revoked_claim_rejected() {
    let server = TestServer::spawn().await;
    let key = registry_key(&server);

    let issued_at = IssuedAt::now();
    let claim = ComplianceClaim::new(
        "example.com",
        ComplianceStatus::Revoked,
        "basic",
        issued_at,
    );
    let signature = key.sign_claim(&claim).unwrap();
    let record = DomainRecord::issue("example.com", "basic", issued_at.as_datetime(), &signature);
    server.store.insert(record).await.unwrap();

    assert!(!signature_valid(&server, "example.com").await);
}

/// Garbage in the signature columns reads as invalid, not as a server error
#[tokio::test]
async fn attack_malformed_signature_columns() {
    let server = TestServer::spawn().await;

    let cases = [
        ("short.example", "abcd".to_string(), server.public_key_hex()),
        ("nothex.example", "zz".repeat(64), server.public_key_hex()),
        ("empty.example", String::new(), String::new()),
        ("longkey.example", "00".repeat(64), "00".repeat(33)),
    ];

    for (domain, signature, public_key) in cases {
        let mut record = signed_record(registry_key(&server), domain, "basic");
        record.signature = signature;
        record.public_key = public_key;
        server.store.insert(record).await.unwrap();

        assert!(!signature_valid(&server, domain).await, "{domain}");
    }
}

// =============================================================================
// ATTACK: Revocation bypass
// =============================================================================

/// Flipping a revoked record back to active in the database leaves the
/// signature valid, but the revocation timestamp still shows through
#[tokio::test]
async fn revoked_record_reports_status_separately() {
    let server = TestServer::spawn().await;

    let mut record = signed_record(registry_key(&server), "example.com", "basic");
    record.status = ComplianceStatus::Revoked;
    record.revoked_at = Some(Utc::now());
    server.store.insert(record).await.unwrap();

    let body: Value = server.verify("example.com").await.json().await.unwrap();
    assert_eq!(body["status"], "revoked");
    assert_eq!(body["signature_valid"], true);
}

// =============================================================================
// ATTACK: Admin key guessing
// =============================================================================

/// Prefixes, case variants and padded copies of the admin key are all rejected
#[tokio::test]
async fn attack_admin_key_near_misses_rejected() {
    let server = TestServer::spawn().await;
    let upper = ADMIN_KEY.to_uppercase();
    let padded = format!("{ADMIN_KEY}\0");

    let guesses = [&ADMIN_KEY[..1], &ADMIN_KEY[..ADMIN_KEY.len() - 1], upper.as_str(), padded.as_str()];

    for guess in guesses {
        let response = server
            .client
            .post(server.url("/admin/domains"))
            .header("X-Admin-Key", guess)
            .json(&serde_json::json!({"domain_name": "example.com", "compliance_level": "basic"}))
            .send()
            .await;

        // A header value reqwest refuses to send is just as rejected
        if let Ok(response) = response {
            assert_eq!(response.status(), 401, "guess {guess:?}");
        }
    }

    assert_eq!(server.store.count().await.unwrap(), 0);
}
