//! In-memory storage backend
//!
//! Default storage implementation using in-memory hashmaps.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use compliance_core::ComplianceStatus;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{DomainRecord, DomainStore, StorageError};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Uuid, DomainRecord>,
    /// Insertion order, oldest first
    order: Vec<Uuid>,
}

/// In-memory record store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn insert(&self, record: DomainRecord) -> Result<DomainRecord, StorageError> {
        let mut inner = self.inner.write().unwrap();

        if inner
            .records
            .values()
            .any(|r| r.domain_name == record.domain_name)
        {
            return Err(StorageError::AlreadyExists(record.domain_name));
        }

        info!(id = %record.id, domain = %record.domain_name, "Storing domain record");
        inner.order.push(record.id);
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DomainRecord>, StorageError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.get(&id).cloned())
    }

    async fn find_by_domain(&self, domain_name: &str) -> Result<Option<DomainRecord>, StorageError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .records
            .values()
            .find(|r| r.domain_name == domain_name)
            .cloned())
    }

    async fn list(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<(usize, Vec<DomainRecord>), StorageError> {
        let inner = self.inner.read().unwrap();

        let mut records: Vec<&DomainRecord> = inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.records.get(id))
            .collect();
        // Stable sort keeps newest-inserted first among equal timestamps
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = records
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();
        Ok((inner.records.len(), page))
    }

    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> Result<DomainRecord, StorageError> {
        let mut inner = self.inner.write().unwrap();
        let record = inner
            .records
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        if record.status == ComplianceStatus::Revoked {
            return Err(StorageError::AlreadyRevoked(record.domain_name.clone()));
        }

        record.status = ComplianceStatus::Revoked;
        record.revoked_at = Some(at);
        record.updated_at = at;

        info!(id = %id, domain = %record.domain_name, "Revoked domain record");
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.inner.write().unwrap();
        let removed = inner.records.remove(&id);
        if let Some(record) = &removed {
            inner.order.retain(|existing| *existing != id);
            info!(id = %id, domain = %record.domain_name, "Deleted domain record");
        }
        Ok(removed.is_some())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_core::KeyPair;
    use compliance_core::{ComplianceClaim, IssuedAt};

    fn record(domain: &str) -> DomainRecord {
        let kp = KeyPair::generate();
        let issued = IssuedAt::now();
        let signature = kp
            .sign_claim(&ComplianceClaim::issuance(domain, "basic", issued))
            .unwrap();
        DomainRecord::issue(domain, "basic", issued.as_datetime(), &signature)
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryStore::new();
        let inserted = store.insert(record("example.com")).await.unwrap();

        let by_id = store.get(inserted.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&inserted));

        let by_name = store.find_by_domain("example.com").await.unwrap();
        assert_eq!(by_name, Some(inserted));

        assert!(store.find_by_domain("other.com").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_domain_rejected() {
        let store = MemoryStore::new();
        store.insert(record("example.com")).await.unwrap();

        let err = store.insert(record("example.com")).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(d) if d == "example.com"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_revoke_keeps_signature() {
        let store = MemoryStore::new();
        let inserted = store.insert(record("example.com")).await.unwrap();
        let at = Utc::now();

        let revoked = store.revoke(inserted.id, at).await.unwrap();
        assert_eq!(revoked.status, ComplianceStatus::Revoked);
        assert_eq!(revoked.revoked_at, Some(at));
        assert_eq!(revoked.signature, inserted.signature);
        assert_eq!(revoked.public_key, inserted.public_key);
        assert!(revoked.signature_valid());

        let again = store.revoke(inserted.id, Utc::now()).await.unwrap_err();
        assert!(matches!(again, StorageError::AlreadyRevoked(_)));
    }

    #[tokio::test]
    async fn test_revoke_unknown_record() {
        let store = MemoryStore::new();
        let err = store.revoke(Uuid::new_v4(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_pagination() {
        let store = MemoryStore::new();
        for name in ["a.com", "b.com", "c.com", "d.com"] {
            store.insert(record(name)).await.unwrap();
        }

        let (total, page) = store.list(0, 2).await.unwrap();
        assert_eq!(total, 4);
        let names: Vec<_> = page.iter().map(|r| r.domain_name.as_str()).collect();
        assert_eq!(names, vec!["d.com", "c.com"]);

        let (_, rest) = store.list(2, 10).await.unwrap();
        let names: Vec<_> = rest.iter().map(|r| r.domain_name.as_str()).collect();
        assert_eq!(names, vec!["b.com", "a.com"]);

        let (_, empty) = store.list(10, 10).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let inserted = store.insert(record("example.com")).await.unwrap();

        assert!(store.delete(inserted.id).await.unwrap());
        assert!(!store.delete(inserted.id).await.unwrap());
        assert!(store.get(inserted.id).await.unwrap().is_none());

        // Name is free again
        store.insert(record("example.com")).await.unwrap();
    }
}
