//! Object storage port

use async_trait::async_trait;

use crate::domain::result::Result;

/// Bucket holding trip photos
pub const TRIP_PHOTOS_BUCKET: &str = "trip-photos";

/// Backend object storage abstraction
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an object
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// Remove objects by path
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<()>;

    /// Publicly reachable URL for an object
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Extract the in-bucket object path from a public URL
///
/// Returns `None` when the URL does not point into the given bucket.
pub fn object_path_from_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{}/", bucket);
    url.split_once(&marker).map(|(_, path)| path.to_string())
}
