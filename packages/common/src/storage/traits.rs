use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::hash::ContentHash;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Content-addressed storage for uploaded media.
///
/// Identical content always maps to the same hash, so re-uploading a file is
/// a no-op and blobs can be shared between posts and avatars freely.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes and return the content hash.
    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(reader).await
    }

    /// Store data from an async reader and return the content hash.
    async fn put_stream(&self, reader: BoxReader) -> Result<ContentHash, StorageError>;

    /// Retrieve a blob as a streaming async reader.
    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError>;

    /// Size of a stored blob in bytes.
    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError>;
}
