//! Backend sensor API client
//!
//! Appends endpoint path segments onto the configured origin, rejects non-2xx
//! responses, and hands the parsed JSON body straight back to the caller.
//! Sensor ids are pushed as single percent-encoded segments, so an id can
//! never address a different endpoint.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::io::{HttpClient, HttpResponse};
use crate::model::{Envelope, HistoryQuery, LocationUpdate, Reading, Sensor};
use crate::DashboardError;

/// Client for the sensor backend's REST API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created ApiClient for {}", base_url);
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> crate::Result<String> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            DashboardError::Config(format!("Invalid API base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DashboardError::Config(format!(
                    "API base URL '{}' cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    /// GET the endpoint at `segments` and parse the body
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> crate::Result<T> {
        let url = self.url(segments)?;
        let response = self.http.get(&url, query).await?;
        parse_body("GET", url, response)
    }

    /// POST `body` as JSON to the endpoint at `segments` and parse the response body
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> crate::Result<T> {
        let url = self.url(segments)?;
        let response = self.http.post_json(&url, &serde_json::to_value(body)?).await?;
        parse_body("POST", url, response)
    }

    /// PUT `body` as JSON to the endpoint at `segments` and parse the response body
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> crate::Result<T> {
        let url = self.url(segments)?;
        let response = self.http.put_json(&url, &serde_json::to_value(body)?).await?;
        parse_body("PUT", url, response)
    }

    /// DELETE the endpoint at `segments` and parse the response body
    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> crate::Result<T> {
        let url = self.url(segments)?;
        let response = self.http.delete(&url).await?;
        parse_body("DELETE", url, response)
    }

    pub async fn list_sensors(&self) -> crate::Result<Option<Vec<Sensor>>> {
        let body: Envelope<Vec<Sensor>> = self.get(&["api", "sensors"], &[]).await?;
        Ok(body.into_inner())
    }

    pub async fn realtime(&self, sensor_id: &str) -> crate::Result<Option<Reading>> {
        let id = id_segment(sensor_id)?;
        let body: Envelope<Envelope<Reading>> =
            self.get(&["api", "sensors", id, "realtime"], &[]).await?;
        Ok(body.into_nested())
    }

    pub async fn history(&self, query: &HistoryQuery) -> crate::Result<Option<Vec<Reading>>> {
        let body: Envelope<Envelope<Vec<Reading>>> = self
            .get(&["api", "data", "history"], &query.to_params())
            .await?;
        Ok(body.into_nested())
    }

    pub async fn create_sensor(&self, sensor: &Sensor) -> crate::Result<()> {
        let _: serde_json::Value = self.post(&["api", "sensors"], sensor).await?;
        Ok(())
    }

    pub async fn update_sensor(&self, sensor: &Sensor) -> crate::Result<()> {
        let id = id_segment(sensor.id.as_deref().unwrap_or_default())?;
        let _: serde_json::Value = self.put(&["api", "sensors", id], sensor).await?;
        Ok(())
    }

    pub async fn delete_sensor(&self, id: &str) -> crate::Result<()> {
        let id = id_segment(id)?;
        let _: serde_json::Value = self.delete(&["api", "sensors", id]).await?;
        Ok(())
    }

    pub async fn update_location(&self, location: &LocationUpdate) -> crate::Result<()> {
        let id = id_segment(&location.id)?;
        let body = serde_json::json!({
            "latitude": location.latitude,
            "longitude": location.longitude,
        });
        let _: serde_json::Value = self
            .put(&["api", "map", "sensors", id, "location"], &body)
            .await?;
        Ok(())
    }
}

/// Empty, `.` and `..` ids would collapse into the parent path
fn id_segment(id: &str) -> crate::Result<&str> {
    match id {
        "" | "." | ".." => Err(DashboardError::InvalidSensorId(id.to_string())),
        _ => Ok(id),
    }
}

/// Reject non-2xx responses, then parse the body. An empty body parses as
/// JSON `null`.
fn parse_body<T: DeserializeOwned>(
    method: &'static str,
    url: String,
    response: HttpResponse,
) -> crate::Result<T> {
    if !response.is_success() {
        return Err(DashboardError::Status {
            method,
            url,
            status: response.status,
            body: response.body,
        });
    }
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    Ok(serde_json::from_str(body)?)
}
