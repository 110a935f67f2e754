//! Filesystem document store rooted in a capability directory.
//!
//! Layout: `<root>/<collection>/<key>.json`. Writes stage a dot-prefixed
//! temporary file and then link or rename it into place, so readers never
//! observe a partially written document.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use super::{Collection, DocumentStore, DocumentStoreError, is_safe_name};

const EXTENSION: &str = ".json";

#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: Arc<Dir>,
}

impl FsDocumentStore {
    /// Open (creating if needed) a document store under `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        for collection in [Collection::Users, Collection::Things] {
            root.create_dir_all(collection.as_str())?;
        }
        Ok(Self {
            root: Arc::new(root),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, DocumentStoreError>
    where
        F: FnOnce(&Dir) -> Result<T, DocumentStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|error| DocumentStoreError::io(format!("blocking task failed: {error}")))?
    }
}

fn document_name(key: &str) -> Result<String, DocumentStoreError> {
    if is_safe_name(key) {
        Ok(format!("{key}{EXTENSION}"))
    } else {
        Err(DocumentStoreError::invalid_key(key))
    }
}

fn io_error(action: &str, target: &str, error: io::Error) -> DocumentStoreError {
    DocumentStoreError::io(format!("{action} {target}: {error}"))
}

fn open_collection(root: &Dir, collection: Collection) -> Result<Dir, DocumentStoreError> {
    root.open_dir(collection.as_str())
        .map_err(|error| io_error("open", collection.as_str(), error))
}

fn staging_name() -> String {
    format!(".tmp-{}", Uuid::new_v4().simple())
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Vec<u8>>, DocumentStoreError> {
        let name = document_name(key)?;
        self.blocking(move |root| {
            let dir = open_collection(root, collection)?;
            match dir.read(&name) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(error) => Err(io_error("read", &name, error)),
            }
        })
        .await
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        key: &str,
        document: &[u8],
    ) -> Result<bool, DocumentStoreError> {
        let name = document_name(key)?;
        let document = document.to_vec();
        self.blocking(move |root| {
            let dir = open_collection(root, collection)?;
            if dir.exists(&name) {
                return Ok(false);
            }
            let staging = staging_name();
            dir.write(&staging, &document)
                .map_err(|error| io_error("write", &staging, error))?;
            // Hard links fail when the target exists, which makes creation atomic.
            let linked = dir.hard_link(&staging, &dir, &name);
            let _cleanup_result = dir.remove_file(&staging);
            match linked {
                Ok(()) => Ok(true),
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
                Err(error) => Err(io_error("link", &name, error)),
            }
        })
        .await
    }

    async fn replace(
        &self,
        collection: Collection,
        key: &str,
        document: &[u8],
    ) -> Result<bool, DocumentStoreError> {
        let name = document_name(key)?;
        let document = document.to_vec();
        self.blocking(move |root| {
            let dir = open_collection(root, collection)?;
            if !dir.exists(&name) {
                return Ok(false);
            }
            let staging = staging_name();
            dir.write(&staging, &document)
                .map_err(|error| io_error("write", &staging, error))?;
            if let Err(error) = dir.rename(&staging, &dir, &name) {
                let _cleanup_result = dir.remove_file(&staging);
                return Err(io_error("rename", &name, error));
            }
            Ok(true)
        })
        .await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Vec<u8>>, DocumentStoreError> {
        self.blocking(move |root| {
            let dir = open_collection(root, collection)?;
            let entries = dir
                .entries()
                .map_err(|error| io_error("list", collection.as_str(), error))?;
            let mut documents = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|error| io_error("list", collection.as_str(), error))?;
                let file_name = entry.file_name();
                let Some(name) = file_name.to_str() else {
                    continue;
                };
                if name.starts_with('.') || !name.ends_with(EXTENSION) {
                    continue;
                }
                match dir.read(name) {
                    Ok(bytes) => documents.push(bytes),
                    Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                    Err(error) => return Err(io_error("read", name, error)),
                }
            }
            Ok(documents)
        })
        .await
    }
}
