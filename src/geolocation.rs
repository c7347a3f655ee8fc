//! Optional location hint for map grounding. Lookup is best effort: any failure
//! or a timeout yields `None` and planning proceeds without a location.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_millis(3000);
pub const IP_LOCATE_URL: &str = "https://ipapi.co/json/";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }
}

#[async_trait]
pub trait Locator: Send + Sync {
    async fn locate(&self) -> anyhow::Result<GeoPoint>;
}

/// A coordinate the user supplied up front.
pub struct FixedLocator(pub GeoPoint);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> anyhow::Result<GeoPoint> {
        Ok(self.0)
    }
}

/// Coarse position from the public IP address.
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(IP_LOCATE_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpLocateResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> anyhow::Result<GeoPoint> {
        let response: IpLocateResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        match (response.latitude, response.longitude) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
                .ok_or_else(|| anyhow::anyhow!("coordinate out of range: {}, {}", lat, lng)),
            _ => Err(anyhow::anyhow!("location service returned no coordinate")),
        }
    }
}

/// Runs the locator under `timeout`; failures are logged and swallowed.
pub async fn locate_with_timeout(locator: &dyn Locator, timeout: Duration) -> Option<GeoPoint> {
    match tokio::time::timeout(timeout, locator.locate()).await {
        Ok(Ok(point)) => {
            debug!(latitude = point.latitude, longitude = point.longitude, "locate: position acquired");
            Some(point)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Location intel unavailable.");
            None
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Location intel unavailable: lookup timed out.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowLocator;

    #[async_trait]
    impl Locator for SlowLocator {
        async fn locate(&self) -> anyhow::Result<GeoPoint> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(GeoPoint { latitude: 0.0, longitude: 0.0 })
        }
    }

    struct BrokenLocator;

    #[async_trait]
    impl Locator for BrokenLocator {
        async fn locate(&self) -> anyhow::Result<GeoPoint> {
            Err(anyhow::anyhow!("permission denied"))
        }
    }

    #[test]
    fn test_geopoint_range_checked() {
        assert!(GeoPoint::new(12.9, 77.6).is_some());
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -181.0).is_none());
    }

    #[tokio::test]
    async fn test_fixed_locator_passes_through() {
        let point = GeoPoint { latitude: 28.6, longitude: 77.2 };
        let located = locate_with_timeout(&FixedLocator(point), DEFAULT_LOCATE_TIMEOUT).await;
        assert_eq!(located, Some(point));
    }

    #[tokio::test]
    async fn test_timeout_yields_none() {
        let located = locate_with_timeout(&SlowLocator, Duration::from_millis(20)).await;
        assert_eq!(located, None);
    }

    #[tokio::test]
    async fn test_failure_yields_none() {
        assert_eq!(locate_with_timeout(&BrokenLocator, DEFAULT_LOCATE_TIMEOUT).await, None);
    }
}
