use crate::core::distance::haversine_miles;
use crate::domain::model::{
    Coordinate, DecisionReason, GateDecision, ServiceAreaConfig, ServiceAreaEntry, ZipCode,
};
use crate::domain::ports::CoordinateResolver;
use crate::utils::error::{GateError, Result};
use std::sync::Arc;

/// Accepts or rejects a ZIP based on distance to the configured service areas.
///
/// Stateless: the configuration snapshot is passed into every call, so concurrent
/// evaluations share nothing but the (read-only) resolver.
#[derive(Clone)]
pub struct ProximityGate {
    resolver: Arc<dyn CoordinateResolver>,
}

impl ProximityGate {
    pub fn new<R: CoordinateResolver + 'static>(resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    pub fn with_shared(resolver: Arc<dyn CoordinateResolver>) -> Self {
        Self { resolver }
    }

    pub async fn evaluate(
        &self,
        candidate_zip: &str,
        config: &ServiceAreaConfig,
    ) -> Result<GateDecision> {
        if config.is_empty() {
            tracing::debug!("No service areas configured, rejecting {}", candidate_zip);
            return Ok(GateDecision::rejected(DecisionReason::ConfigEmpty));
        }

        let candidate = ZipCode::parse(candidate_zip)?;

        // 完全相同的郵遞區號不需要查座標
        if let Some(radius) = config.get(&candidate) {
            tracing::debug!("Exact service-area match for {}", candidate);
            return Ok(GateDecision::matched(
                ServiceAreaEntry::new(candidate, radius),
                0.0,
            ));
        }

        let origin = self.resolve_candidate(&candidate).await?;

        let mut closest: Option<(ServiceAreaEntry, f64)> = None;
        for entry in config.entries() {
            let center = match self.resolver.resolve(&entry.zip_code).await {
                Ok(center) => center,
                Err(e) => {
                    tracing::warn!(
                        "Skipping service area {}: {}",
                        entry.zip_code,
                        e
                    );
                    continue;
                }
            };

            let miles = haversine_miles(origin, center);
            if !miles.is_finite() {
                tracing::warn!("Non-finite distance between {} and {}", candidate, entry.zip_code);
                continue;
            }

            tracing::debug!(
                "{} → {}: {:.2} mi (radius {} mi)",
                candidate,
                entry.zip_code,
                miles,
                entry.radius_miles
            );

            if miles > f64::from(entry.radius_miles.miles()) {
                continue;
            }

            // 嚴格小於：距離相同時保留郵遞區號較小者
            if closest.as_ref().map_or(true, |(_, best)| miles < *best) {
                closest = Some((entry, miles));
            }
        }

        Ok(match closest {
            Some((entry, miles)) => GateDecision::matched(entry, miles),
            None => GateDecision::rejected(DecisionReason::OutOfRange),
        })
    }

    /// Distance in miles between two ZIP codes.
    pub async fn distance(&self, from_zip: &str, to_zip: &str) -> Result<f64> {
        let from = ZipCode::parse(from_zip)?;
        let to = ZipCode::parse(to_zip)?;
        let a = self.resolve_candidate(&from).await?;
        let b = self.resolve_candidate(&to).await?;
        Ok(haversine_miles(a, b))
    }

    async fn resolve_candidate(&self, zip: &ZipCode) -> Result<Coordinate> {
        self.resolver.resolve(zip).await.map_err(|e| match e {
            GateError::UnknownZip { .. } => e,
            other => {
                tracing::warn!("Resolver failed for {}: {}", zip, other);
                GateError::UnknownZip {
                    zip: zip.to_string(),
                }
            }
        })
    }
}
