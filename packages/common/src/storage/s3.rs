use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tokio::io::AsyncReadExt;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BoxReader, MediaStore};

/// Media store backed by an S3-compatible object storage service.
///
/// Objects are keyed by content hash, same addressing scheme as the
/// filesystem backend, so the two are interchangeable behind [`MediaStore`].
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

impl S3MediaStore {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .with_path_style();
        Ok(Self { bucket, max_size })
    }

    fn object_key(hash: &ContentHash) -> String {
        format!("{}/{}", hash.shard_prefix(), hash.shard_suffix())
    }
}

fn map_s3_error(err: S3Error, hash: &ContentHash) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(hash.to_hex()),
        other => StorageError::Backend(other.to_string()),
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn put_stream(&self, mut reader: BoxReader) -> Result<ContentHash, StorageError> {
        // The object key is the content hash, so the upload has to be
        // buffered before the key is known.
        let mut data = Vec::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            if data.len() as u64 > self.max_size {
                return Err(StorageError::SizeLimitExceeded {
                    actual: data.len() as u64,
                    limit: self.max_size,
                });
            }
        }

        let hash = ContentHash::compute(&data);
        self.bucket
            .put_object(Self::object_key(&hash), &data)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(hash)
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        let response = self
            .bucket
            .get_object(Self::object_key(hash))
            .await
            .map_err(|e| map_s3_error(e, hash))?;
        Ok(Box::new(std::io::Cursor::new(response.to_vec())))
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        let (head, _status) = self
            .bucket
            .head_object(Self::object_key(hash))
            .await
            .map_err(|e| map_s3_error(e, hash))?;
        head.content_length
            .map(|len| len as u64)
            .ok_or_else(|| StorageError::Backend("missing content length".into()))
    }
}
