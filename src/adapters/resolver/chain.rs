use crate::domain::model::{Coordinate, ZipCode};
use crate::domain::ports::CoordinateResolver;
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Tries each resolver in order; the first one that knows the ZIP wins.
#[derive(Clone, Default)]
pub struct ChainResolver {
    resolvers: Vec<Arc<dyn CoordinateResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<R: CoordinateResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }
}

#[async_trait]
impl CoordinateResolver for ChainResolver {
    async fn resolve(&self, zip: &ZipCode) -> Result<Coordinate> {
        for resolver in &self.resolvers {
            match resolver.resolve(zip).await {
                Ok(coordinate) => return Ok(coordinate),
                Err(e) => tracing::debug!("Resolver miss for {}: {}", zip, e),
            }
        }
        Err(GateError::UnknownZip {
            zip: zip.to_string(),
        })
    }
}
