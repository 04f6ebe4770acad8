//! Sensor, reading and request types exchanged with the backend

use serde::{Deserialize, Deserializer, Serialize};

/// A registered sensor as the backend describes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensor {
    #[serde(
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "deserialize_truthy")]
    pub status: bool,
}

impl Sensor {
    /// A sensor with only a name, as submitted for creation
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn status_text(&self) -> &'static str {
        if self.status {
            "online"
        } else {
            "offline"
        }
    }
}

/// A single measurement
///
/// Fields are kept exactly as the backend sent them: `value` and `ts` may be
/// numbers or strings, and anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, alias = "timestamp", skip_serializing_if = "Option::is_none")]
    pub ts: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Reading {
    pub fn value_text(&self) -> String {
        display_field(self.value.as_ref())
    }

    pub fn ts_text(&self) -> String {
        display_field(self.ts.as_ref())
    }
}

/// Strings without quotes, other JSON as-is, `-` when absent
fn display_field(field: Option<&serde_json::Value>) -> String {
    match field {
        None | Some(serde_json::Value::Null) => "-".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parameters of a historical data query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub sensor_id: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

impl HistoryQuery {
    pub const DEFAULT_PAGE: u32 = 0;
    pub const DEFAULT_SIZE: u32 = 10;

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(Self::DEFAULT_PAGE)
    }

    pub fn size(&self) -> u32 {
        self.size.unwrap_or(Self::DEFAULT_SIZE)
    }

    /// Query string pairs with pagination defaults applied
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("sensorId", self.sensor_id.clone())];
        if let Some(start) = &self.start_time {
            params.push(("startTime", start.clone()));
        }
        if let Some(end) = &self.end_time {
            params.push(("endTime", end.clone()));
        }
        params.push(("page", self.page().to_string()));
        params.push(("size", self.size().to_string()));
        params
    }
}

/// A coordinates-only update for one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// `{"data": ...}` wrapper the backend puts around payloads
///
/// A missing or null `data` decodes to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> Option<T> {
        self.data
    }
}

impl<T> Envelope<Envelope<T>> {
    /// Unwrap `{"data": {"data": ...}}`
    pub fn into_nested(self) -> Option<T> {
        self.data.and_then(Envelope::into_inner)
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(serde_json::Value::String(s)) => {
            matches!(s.to_ascii_lowercase().as_str(), "online" | "true" | "1")
        }
        _ => false,
    })
}
