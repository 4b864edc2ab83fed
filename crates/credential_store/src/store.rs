use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::CredentialStoreError;
use crate::keys::{validate_key_name, StorageKeys};

/// The two credential slots the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Session,
    Api,
}

/// Durable key/value store for service credentials.
///
/// Each slot is one file under `root`, named by the configured storage key
/// and holding the raw credential string. Every operation takes the store
/// lock, so `clear_all` is atomic with respect to concurrent reads: a reader
/// sees both slots or neither, never a half-cleared pair.
pub struct CredentialStore {
    root: PathBuf,
    keys: StorageKeys,
    guard: Mutex<()>,
}

impl CredentialStore {
    pub fn open(
        root: impl Into<PathBuf>,
        keys: StorageKeys,
    ) -> Result<Self, CredentialStoreError> {
        validate_key_name(&keys.session)?;
        validate_key_name(&keys.api)?;

        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(CredentialStoreError::RootNotDirectory { path: root });
        }

        fs::create_dir_all(&root)
            .map_err(|source| CredentialStoreError::io("creating store root", &root, source))?;

        Ok(Self {
            root,
            keys,
            guard: Mutex::new(()),
        })
    }

    pub fn get(&self, kind: CredentialKind) -> Result<Option<String>, CredentialStoreError> {
        let _guard = self.lock();
        self.read_slot(kind)
    }

    pub fn set(&self, kind: CredentialKind, value: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.lock();
        self.write_slot(kind, value)
    }

    pub fn clear(&self, kind: CredentialKind) -> Result<(), CredentialStoreError> {
        let _guard = self.lock();
        self.remove_slot(kind)
    }

    /// Clears both slots under one lock acquisition. Attempts both removals
    /// even when the first fails; the first error is reported.
    pub fn clear_all(&self) -> Result<(), CredentialStoreError> {
        let _guard = self.lock();
        let session = self.remove_slot(CredentialKind::Session);
        let api = self.remove_slot(CredentialKind::Api);
        session.and(api)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn key_name(&self, kind: CredentialKind) -> &str {
        match kind {
            CredentialKind::Session => &self.keys.session,
            CredentialKind::Api => &self.keys.api,
        }
    }

    fn slot_path(&self, kind: CredentialKind) -> PathBuf {
        self.root.join(self.key_name(kind))
    }

    fn read_slot(&self, kind: CredentialKind) -> Result<Option<String>, CredentialStoreError> {
        let path = self.slot_path(kind);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CredentialStoreError::io(
                "reading credential",
                &path,
                source,
            )),
        }
    }

    fn write_slot(&self, kind: CredentialKind, value: &str) -> Result<(), CredentialStoreError> {
        // Stage then rename so a crash mid-write never leaves a torn value.
        // Valid key names cannot start with '.', so staging names are free.
        let staged = self.root.join(format!(".{}.tmp", self.key_name(kind)));
        let path = self.slot_path(kind);

        fs::write(&staged, value).map_err(|source| {
            CredentialStoreError::io("staging credential write", &staged, source)
        })?;
        fs::rename(&staged, &path).map_err(|source| {
            CredentialStoreError::io("committing credential write", &path, source)
        })
    }

    fn remove_slot(&self, kind: CredentialKind) -> Result<(), CredentialStoreError> {
        let path = self.slot_path(kind);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CredentialStoreError::io(
                "removing credential",
                &path,
                source,
            )),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        match self.guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
