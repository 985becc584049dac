use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BoxReader, MediaStore};

/// Filesystem-backed media store.
///
/// Blobs live in a sharded layout, `{root}/{first 2 hex chars}/{rest}`, so a
/// single directory never accumulates every upload. Writes go through a temp
/// file and a rename, which keeps concurrent uploads of the same content safe.
pub struct FilesystemMediaStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn blob_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(hash.shard_prefix()).join(hash.shard_suffix())
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put_stream(&self, mut reader: BoxReader) -> Result<ContentHash, StorageError> {
        let temp_path = self.temp_path();
        let mut temp_file = fs::File::create(&temp_path).await?;
        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            written += n as u64;
            if written > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: written,
                    limit: self.max_size,
                });
            }
            hasher.update(&buf[..n]);
            temp_file.write_all(&buf[..n]).await?;
        }
        temp_file.flush().await?;
        drop(temp_file);

        let hash = ContentHash::from_bytes(hasher.finalize().into());
        let blob_path = self.blob_path(&hash);

        if blob_path.exists() {
            // Same content already stored; the temp copy is redundant.
            let _ = fs::remove_file(&temp_path).await;
            return Ok(hash);
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(hash)
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.blob_path(hash)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        match fs::metadata(self.blob_path(hash)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
