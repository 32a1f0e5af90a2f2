//! Issuer key lifecycle
//!
//! The registry signs every record with a single Ed25519 key held in one file
//! as the raw 32-byte private scalar. The first call to
//! [`KeyManager::obtain_signing_key`] loads that file, or generates and
//! persists a new key when it does not exist; every later call returns the
//! cached key without touching the filesystem.
//!
//! First-time initialization runs under a mutex, so concurrent callers in one
//! process never mint two keys. New keys are written to a temporary sibling
//! and hard-linked into place, which never clobbers an existing file: if
//! another process got there first, its key is loaded instead.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use compliance_core::crypto::SECRET_KEY_LENGTH;
use compliance_core::{ComplianceError, KeyPair, PublicKey};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Owner read/write only
#[cfg(unix)]
const KEY_FILE_MODE: u32 = 0o600;

/// Errors from loading, creating or using the issuer key
#[derive(Error, Debug)]
pub enum KeyError {
    /// Key file exists but is unreadable or malformed
    #[error("Failed to load signing key from {path}: {reason}")]
    Load { path: String, reason: String },

    /// A newly generated key could not be written
    #[error("Failed to persist signing key to {path}: {reason}")]
    Persist { path: String, reason: String },

    /// Claim could not be signed
    #[error("Signing failed: {0}")]
    Signing(#[from] ComplianceError),
}

impl KeyError {
    fn load(path: &Path, reason: impl ToString) -> Self {
        KeyError::Load {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn persist(path: &Path, reason: impl ToString) -> Self {
        KeyError::Persist {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Owns the process-wide signing key
///
/// Construct once at startup, share behind an `Arc`.
pub struct KeyManager {
    path: PathBuf,
    key_pair: OnceLock<KeyPair>,
    init_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("path", &self.path)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl KeyManager {
    /// Create a manager for the key file at `path`; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key_pair: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Location of the key file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the key has been loaded or generated yet
    pub fn is_initialized(&self) -> bool {
        self.key_pair.get().is_some()
    }

    /// Get the signing key, loading or creating it on first use
    ///
    /// Idempotent: every call on the same manager returns the same key.
    pub fn obtain_signing_key(&self) -> Result<&KeyPair, KeyError> {
        if let Some(key_pair) = self.key_pair.get() {
            return Ok(key_pair);
        }

        // The guarded section holds no data, so a poisoned lock is still usable
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(key_pair) = self.key_pair.get() {
            return Ok(key_pair);
        }

        let key_pair = load_or_create(&self.path)?;
        Ok(self.key_pair.get_or_init(|| key_pair))
    }

    /// Public half of the signing key
    pub fn public_key(&self) -> Result<PublicKey, KeyError> {
        Ok(self.obtain_signing_key()?.public_key())
    }
}

fn load_or_create(path: &Path) -> Result<KeyPair, KeyError> {
    if let Some(key_pair) = load(path)? {
        info!(
            path = %path.display(),
            public_key = %key_pair.public_key().to_hex(),
            "Signing key loaded"
        );
        return Ok(key_pair);
    }

    let key_pair = KeyPair::generate();
    match persist(path, &key_pair.secret_bytes()) {
        Ok(Persisted::Created) => {
            warn!(
                path = %path.display(),
                public_key = %key_pair.public_key().to_hex(),
                "New signing key generated"
            );
            Ok(key_pair)
        }
        Ok(Persisted::AlreadyPresent) => {
            info!(path = %path.display(), "Key file created concurrently, loading it");
            load(path)?.ok_or_else(|| KeyError::load(path, "key file vanished after creation"))
        }
        Err(e) => Err(KeyError::persist(path, e)),
    }
}

/// Read the key file; `Ok(None)` when it does not exist
///
/// A parent path that is not a directory also counts as absent, so the
/// failure surfaces from `persist` as `KeyError::Persist`.
fn load(path: &Path) -> Result<Option<KeyPair>, KeyError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            return Ok(None)
        }
        Err(e) => return Err(KeyError::load(path, e)),
    };

    if bytes.len() != SECRET_KEY_LENGTH {
        return Err(KeyError::load(
            path,
            format!(
                "expected {} raw bytes, found {}",
                SECRET_KEY_LENGTH,
                bytes.len()
            ),
        ));
    }

    warn_if_exposed(path);
    KeyPair::from_slice(&bytes)
        .map(Some)
        .map_err(|e| KeyError::load(path, e))
}

/// Outcome of writing a freshly generated key
enum Persisted {
    Created,
    /// Another writer linked a key file in first; ours was discarded
    AlreadyPresent,
}

/// Write a new key file without ever replacing an existing one
fn persist(path: &Path, secret: &[u8; SECRET_KEY_LENGTH]) -> io::Result<Persisted> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_sibling(path);
    let result = write_new_file(&tmp, secret).and_then(|()| {
        restrict_permissions(&tmp);
        match fs::hard_link(&tmp, path) {
            Ok(()) => Ok(Persisted::Created),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(Persisted::AlreadyPresent),
            Err(e) => Err(e),
        }
    });

    if let Err(e) = fs::remove_file(&tmp) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!(path = %tmp.display(), error = %e, "Failed to remove temporary key file");
        }
    }

    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "signing-key".into());
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
}

fn write_new_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(KEY_FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Best-effort `0o600`; failure is logged, never fatal
#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(KEY_FILE_MODE)) {
        warn!(
            path = %path.display(),
            error = %e,
            "Could not restrict signing key file permissions"
        );
    }
}

#[cfg(not(unix))]
fn restrict_permissions(path: &Path) {
    debug!(path = %path.display(), "File permission hardening not supported on this platform");
}

#[cfg(unix)]
fn warn_if_exposed(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::metadata(path) {
        let mode = meta.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode),
                "Signing key file is accessible to other users"
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_exposed(_path: &Path) {}
