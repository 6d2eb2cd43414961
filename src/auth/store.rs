use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::StoredCredential;
use crate::error::{NewstlerError, Result};

const CREDENTIAL_FILE_VERSION: u32 = 1;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence for per-user credentials.
///
/// Writes for the same user are last-writer-wins; no cross-user locking is
/// expected from implementations.
pub trait CredentialStore: Send + Sync {
    fn load_credential(&self, user_id: &str) -> Result<Option<StoredCredential>>;
    fn save_credential(&self, credential: &StoredCredential) -> Result<()>;

    /// Drop the token but keep the user's record.
    fn clear_credential(&self, user_id: &str) -> Result<()> {
        self.save_credential(&StoredCredential::cleared(user_id))
    }
}

/// File-backed credential store, one TOML file per user.
///
/// File names are the hex encoding of the exact user id, so distinct ids
/// never share a file.
///
/// # Example
/// ```no_run
/// use newstler::auth::{CredentialStore, FileCredentialStore, StoredCredential};
///
/// let store = FileCredentialStore::new("/tmp/newstler-credentials");
/// store.save_credential(&StoredCredential::cleared("42"))?;
/// # Ok::<(), newstler::error::NewstlerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn credential_path(&self, user_id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.toml", file_key(user_id)))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load_credential(&self, user_id: &str) -> Result<Option<StoredCredential>> {
        let path = self.credential_path(user_id);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(NewstlerError::Io(err)),
        };
        let file: CredentialFile = toml::from_str(&raw).map_err(|err| {
            NewstlerError::Storage(format!("corrupt credential file {}: {err}", path.display()))
        })?;
        if file.version != CREDENTIAL_FILE_VERSION {
            return Err(NewstlerError::Storage(format!(
                "unsupported credential file version {} at {}",
                file.version,
                path.display()
            )));
        }
        if file.credential.owning_user_id != user_id {
            return Err(NewstlerError::Storage(format!(
                "credential file {} belongs to another user",
                path.display()
            )));
        }
        Ok(Some(file.credential))
    }

    fn save_credential(&self, credential: &StoredCredential) -> Result<()> {
        let path = self.credential_path(&credential.owning_user_id);
        let file = CredentialFile {
            version: CREDENTIAL_FILE_VERSION,
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)
            .map_err(|err| NewstlerError::Storage(format!("cannot encode credential: {err}")))?;
        atomic_write(&path, serialized.as_bytes())?;
        tracing::debug!(
            user_id = %credential.owning_user_id,
            linked = credential.is_linked(),
            "credential saved"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    saved_at: DateTime<Utc>,
    credential: StoredCredential,
}

/// Write through a temp file and rename so readers never see a partial
/// record and concurrent writers resolve to the last rename.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        NewstlerError::Storage(format!("credential path {} has no file name", path.display()))
    })?;

    let temp_name = format!(
        ".{}.tmp-{}-{}",
        file_name.to_string_lossy(),
        std::process::id(),
        TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(NewstlerError::Io(err));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(NewstlerError::Io(err));
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

/// Lowercase hex of the id's UTF-8 bytes.
fn file_key(user_id: &str) -> String {
    if user_id.is_empty() {
        return "_".to_string();
    }
    user_id.bytes().map(|byte| format!("{byte:02x}")).collect()
}
