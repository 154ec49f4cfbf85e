//! HTTP client for the Google Roads and Directions APIs.
//!
//! Snapping runs in batches of [`SNAP_BATCH_SIZE`] points; directions run in
//! overlapping segments of [`DIRECTIONS_SEGMENT_SIZE`] points so the returned
//! route is continuous. A batch the API rejects (error envelope or non-`OK`
//! status) is logged and skipped; transport failures are retried and then
//! propagated.

use std::time::Duration;

use reqwest::{Client, Url};
use routetrace_core::LatLng;
use routetrace_track::haversine_m;
use serde::de::DeserializeOwned;

use crate::error::RoadsError;
use crate::polyline::decode_polyline;
use crate::retry::retry_with_backoff;
use crate::types::{DirectionsResponse, SnapToRoadsResponse};

const DEFAULT_ROADS_BASE_URL: &str = "https://roads.googleapis.com/";
const DEFAULT_DIRECTIONS_BASE_URL: &str = "https://maps.googleapis.com/";

/// Maximum points per snap-to-roads request.
pub const SNAP_BATCH_SIZE: usize = 100;
/// Origin + 23 waypoints + destination.
pub const DIRECTIONS_SEGMENT_SIZE: usize = 25;
/// Consecutive segments share their boundary point.
const DIRECTIONS_STEP: usize = DIRECTIONS_SEGMENT_SIZE - 1;

/// Road-following distance and geometry for a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadRoute {
    pub distance_km: f64,
    pub coords: Vec<LatLng>,
}

/// Client for the Roads and Directions APIs.
///
/// Use [`RoadsClient::new`] for production or [`RoadsClient::with_base_urls`]
/// to point at a mock server in tests.
pub struct RoadsClient {
    client: Client,
    api_key: String,
    roads_base: Url,
    directions_base: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    inter_request_delay: Duration,
}

impl RoadsClient {
    /// Creates a client pointed at the production Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RoadsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, RoadsError> {
        Self::with_base_urls(
            api_key,
            timeout_secs,
            DEFAULT_ROADS_BASE_URL,
            DEFAULT_DIRECTIONS_BASE_URL,
        )
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RoadsError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`RoadsError::InvalidBaseUrl`] if either base URL does not parse.
    pub fn with_base_urls(
        api_key: &str,
        timeout_secs: u64,
        roads_base_url: &str,
        directions_base_url: &str,
    ) -> Result<Self, RoadsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("routetrace/0.1 (route-reconstruction)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            roads_base: parse_base_url(roads_base_url)?,
            directions_base: parse_base_url(directions_base_url)?,
            max_retries: 3,
            backoff_base_ms: 500,
            inter_request_delay: Duration::from_millis(100),
        })
    }

    /// Sets the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Sets the pause between consecutive batch requests.
    #[must_use]
    pub fn with_inter_request_delay(mut self, delay_ms: u64) -> Self {
        self.inter_request_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Snaps `points` to the nearest roads.
    ///
    /// Snapped points further than `max_snap_distance_m` from the point they
    /// came from are discarded, as are interpolated points with no
    /// `originalIndex`. Output keeps input order.
    ///
    /// # Errors
    ///
    /// - [`RoadsError::Http`] on network failure or 5xx after retries.
    /// - [`RoadsError::Deserialize`] if a body is not the expected JSON.
    pub async fn snap_to_roads(
        &self,
        points: &[LatLng],
        max_snap_distance_m: f64,
    ) -> Result<Vec<LatLng>, RoadsError> {
        let mut snapped = Vec::with_capacity(points.len());

        for (batch_no, batch) in points.chunks(SNAP_BATCH_SIZE).enumerate() {
            if batch_no > 0 {
                self.pause().await;
            }

            let path = join_points(batch.iter().map(ToString::to_string));
            let url = build_url(
                &self.roads_base,
                "v1/snapToRoads",
                &[
                    ("path", path.as_str()),
                    ("interpolate", "false"),
                    ("key", self.api_key.as_str()),
                ],
            )?;
            let response: SnapToRoadsResponse = self
                .get_json(&url, &format!("snapToRoads(batch={batch_no})"))
                .await?;

            let Some(snapped_points) = response.snapped_points else {
                let error = response.error.as_ref();
                tracing::warn!(
                    batch = batch_no,
                    status = error.and_then(|e| e.status.as_deref()).unwrap_or("unknown"),
                    message = error.and_then(|e| e.message.as_deref()).unwrap_or(""),
                    "snap-to-roads batch rejected, skipping"
                );
                continue;
            };

            for point in snapped_points {
                let Some(original) = point.original_index.and_then(|i| batch.get(i)) else {
                    continue;
                };
                let candidate = LatLng::new(point.location.latitude, point.location.longitude);
                if haversine_m(*original, candidate) <= max_snap_distance_m {
                    snapped.push(candidate);
                }
            }
        }

        tracing::debug!(
            input = points.len(),
            snapped = snapped.len(),
            "snap-to-roads finished"
        );
        Ok(snapped)
    }

    /// Looks up the driving route through `points`, summing leg distances and
    /// decoding each segment's overview polyline.
    ///
    /// Fewer than two points yields an empty route.
    ///
    /// # Errors
    ///
    /// - [`RoadsError::Http`] on network failure or 5xx after retries.
    /// - [`RoadsError::Deserialize`] if a body is not the expected JSON.
    /// - [`RoadsError::InvalidPolyline`] if an overview polyline is corrupt.
    pub async fn road_route(&self, points: &[LatLng]) -> Result<RoadRoute, RoadsError> {
        let mut total_m = 0.0;
        let mut coords = Vec::new();

        for (segment_no, segment) in direction_segments(points).into_iter().enumerate() {
            if segment_no > 0 {
                self.pause().await;
            }

            let url = self.directions_url(segment)?;
            let response: DirectionsResponse = self
                .get_json(&url, &format!("directions(segment={segment_no})"))
                .await?;

            if response.status != "OK" {
                tracing::warn!(
                    segment = segment_no,
                    status = %response.status,
                    message = response.error_message.as_deref().unwrap_or(""),
                    "directions segment rejected, skipping"
                );
                continue;
            }

            let Some(route) = response.routes.first() else {
                tracing::warn!(segment = segment_no, "directions returned no routes");
                continue;
            };

            total_m += route.legs.iter().map(|leg| leg.distance.value).sum::<f64>();
            coords.extend(decode_polyline(&route.overview_polyline.points)?);
        }

        Ok(RoadRoute {
            distance_km: total_m / 1000.0,
            coords,
        })
    }

    fn directions_url(&self, segment: &[LatLng]) -> Result<Url, RoadsError> {
        let origin = segment[0].to_string();
        let destination = segment[segment.len() - 1].to_string();
        let waypoints = join_points(
            segment[1..segment.len() - 1]
                .iter()
                .map(|p| format!("via:{p}")),
        );

        let mut params = vec![
            ("origin", origin.as_str()),
            ("destination", destination.as_str()),
        ];
        if !waypoints.is_empty() {
            params.push(("waypoints", waypoints.as_str()));
        }
        params.push(("key", self.api_key.as_str()));

        build_url(&self.directions_base, "maps/api/directions/json", &params)
    }

    async fn pause(&self) {
        if !self.inter_request_delay.is_zero() {
            tokio::time::sleep(self.inter_request_delay).await;
        }
    }

    /// GETs `url` with retries and decodes the body as JSON.
    ///
    /// `context` names the call in errors; the URL itself carries the API key
    /// and is kept out of error messages.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, RoadsError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_text(url)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| RoadsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Only 5xx is an HTTP error here: the APIs report bad requests in a JSON
    /// body, which the callers inspect.
    async fn request_text(&self, url: &Url) -> Result<String, RoadsError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RoadsError::Http(e.without_url()))?;

        let response = if response.status().is_server_error() {
            response
                .error_for_status()
                .map_err(|e| RoadsError::Http(e.without_url()))?
        } else {
            response
        };

        response
            .text()
            .await
            .map_err(|e| RoadsError::Http(e.without_url()))
    }
}

/// Splits `points` into overlapping direction segments.
pub(crate) fn direction_segments(points: &[LatLng]) -> Vec<&[LatLng]> {
    if points.len() < 2 {
        return Vec::new();
    }
    (0..points.len() - 1)
        .step_by(DIRECTIONS_STEP)
        .map(|start| &points[start..(start + DIRECTIONS_SEGMENT_SIZE).min(points.len())])
        .collect()
}

fn join_points(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join("|")
}

fn parse_base_url(raw: &str) -> Result<Url, RoadsError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| RoadsError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn build_url(base: &Url, path: &str, params: &[(&str, &str)]) -> Result<Url, RoadsError> {
    let mut url = base.join(path).map_err(|e| RoadsError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}
