//! Filesystem blob store rooted in a capability directory.
//!
//! Layout: `<root>/<thing id>/<kind>/<file name>`. Each write stages a
//! dot-prefixed temporary file and renames it over the target.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{BlobLocation, BlobStore, BlobStoreError};
use crate::outbound::documents::is_safe_name;

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: Arc<Dir>,
}

impl FsBlobStore {
    /// Open (creating if needed) a blob store under `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, BlobStoreError>
    where
        F: FnOnce(&Dir) -> Result<T, BlobStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|error| BlobStoreError::io(format!("blocking task failed: {error}")))?
    }
}

fn location_path(location: &BlobLocation) -> PathBuf {
    Path::new(location.thing_id.as_ref()).join(location.kind.as_str())
}

fn checked_name(file_name: &str) -> Result<String, BlobStoreError> {
    if is_safe_name(file_name) {
        Ok(file_name.to_owned())
    } else {
        Err(BlobStoreError::invalid_name(file_name))
    }
}

fn io_error(action: &str, target: &Path, error: io::Error) -> BlobStoreError {
    BlobStoreError::io(format!("{action} {}: {error}", target.display()))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(
        &self,
        location: &BlobLocation,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError> {
        let name = checked_name(file_name)?;
        let directory = location_path(location);
        let bytes = bytes.to_vec();
        self.blocking(move |root| {
            root.create_dir_all(&directory)
                .map_err(|error| io_error("create", &directory, error))?;
            let dir = root
                .open_dir(&directory)
                .map_err(|error| io_error("open", &directory, error))?;
            let staging = format!(".upload-{}", Uuid::new_v4().simple());
            dir.write(&staging, &bytes)
                .map_err(|error| io_error("write", &directory.join(&staging), error))?;
            if let Err(error) = dir.rename(&staging, &dir, &name) {
                let _cleanup_result = dir.remove_file(&staging);
                return Err(io_error("rename", &directory.join(&name), error));
            }
            Ok(())
        })
        .await
    }

    async fn read(
        &self,
        location: &BlobLocation,
        file_name: &str,
    ) -> Result<Option<Vec<u8>>, BlobStoreError> {
        let name = checked_name(file_name)?;
        let path = location_path(location).join(name);
        self.blocking(move |root| match root.read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error("read", &path, error)),
        })
        .await
    }

    async fn prune(&self, location: &BlobLocation, keep: &str) -> Result<(), BlobStoreError> {
        let keep = checked_name(keep)?;
        let directory = location_path(location);
        self.blocking(move |root| {
            let dir = match root.open_dir(&directory) {
                Ok(dir) => dir,
                Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(error) => return Err(io_error("open", &directory, error)),
            };
            let entries = dir
                .entries()
                .map_err(|error| io_error("list", &directory, error))?;
            for entry in entries {
                let entry = entry.map_err(|error| io_error("list", &directory, error))?;
                let file_name = entry.file_name();
                if file_name.to_str() == Some(keep.as_str()) {
                    continue;
                }
                match dir.remove_file(&file_name) {
                    Ok(()) => {}
                    Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                    Err(error) => {
                        return Err(io_error("remove", &directory.join(&file_name), error));
                    }
                }
            }
            Ok(())
        })
        .await
    }
}
