use crate::domain::model::{Coordinate, ZipCode};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// ZIP → 座標查詢。查不到時回傳 `GateError::UnknownZip`。
///
/// The reference dataset is versioned outside this crate, so implementations are
/// swappable: an in-memory table, a remote lookup, or a chain of both.
#[async_trait]
pub trait CoordinateResolver: Send + Sync {
    async fn resolve(&self, zip: &ZipCode) -> Result<Coordinate>;
}

#[async_trait]
impl<R: CoordinateResolver + ?Sized> CoordinateResolver for Arc<R> {
    async fn resolve(&self, zip: &ZipCode) -> Result<Coordinate> {
        (**self).resolve(zip).await
    }
}

#[async_trait]
impl<R: CoordinateResolver + ?Sized> CoordinateResolver for Box<R> {
    async fn resolve(&self, zip: &ZipCode) -> Result<Coordinate> {
        (**self).resolve(zip).await
    }
}
