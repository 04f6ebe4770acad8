//! Sensor store actions
//!
//! Each action calls the backend, commits the result into the shared state,
//! and reports failures as error toasts before handing the error back to the
//! caller. Locks are only taken to commit, so overlapping actions race and
//! the last response to arrive wins.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::model::{HistoryQuery, LocationUpdate, Sensor};
use crate::notifier::{Notifier, Toast};
use crate::state::{Mutation, StateHandle};
use crate::DashboardError;

pub const FETCH_SENSORS_FAILED: &str = "Failed to fetch sensor list";
pub const FETCH_REALTIME_FAILED: &str = "Failed to fetch real-time data";
pub const FETCH_HISTORY_FAILED: &str = "Failed to fetch historical data";
pub const ADD_SENSOR_FAILED: &str = "Failed to add sensor";
pub const UPDATE_SENSOR_FAILED: &str = "Failed to update sensor";
pub const DELETE_SENSOR_FAILED: &str = "Failed to delete sensor";
pub const UPDATE_LOCATION_FAILED: &str = "Failed to update sensor location";

pub const SENSOR_ADDED: &str = "Sensor added";
pub const SENSOR_UPDATED: &str = "Sensor updated";
pub const SENSOR_DELETED: &str = "Sensor deleted";
pub const LOCATION_UPDATED: &str = "Sensor location updated";

/// Actions over the shared sensor state
#[derive(Debug, Clone)]
pub struct SensorStore {
    api: ApiClient,
    state: StateHandle,
    notifier: Arc<dyn Notifier>,
}

impl SensorStore {
    pub fn new(api: ApiClient, state: StateHandle, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            state,
            notifier,
        }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    async fn commit(&self, mutation: Mutation) {
        self.state.write().await.commit(mutation);
    }

    async fn fail(&self, message: &str, error: DashboardError) -> DashboardError {
        tracing::error!("{}: {}", message, error);
        self.notifier.notify(Toast::error(message)).await;
        error
    }

    /// Replace the cached sensor list with the backend's
    pub async fn fetch_sensors(&self) -> crate::Result<()> {
        match self.api.list_sensors().await {
            Ok(Some(sensors)) => {
                tracing::debug!("Fetched {} sensors", sensors.len());
                self.commit(Mutation::SetSensors(sensors)).await;
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("Sensor list response carried no data");
                Ok(())
            }
            Err(e) => Err(self.fail(FETCH_SENSORS_FAILED, e).await),
        }
    }

    /// Replace the cached real-time reading with the latest one for `sensor_id`
    pub async fn fetch_realtime_data(&self, sensor_id: &str) -> crate::Result<()> {
        match self.api.realtime(sensor_id).await {
            Ok(Some(reading)) => {
                self.commit(Mutation::SetRealtimeData {
                    sensor_id: sensor_id.to_string(),
                    reading,
                })
                .await;
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("Real-time response for '{}' carried no data", sensor_id);
                Ok(())
            }
            Err(e) => Err(self.fail(FETCH_REALTIME_FAILED, e).await),
        }
    }

    /// Replace the cached history page; page and size default to 0 and 10
    pub async fn fetch_historical_data(&self, query: &HistoryQuery) -> crate::Result<()> {
        match self.api.history(query).await {
            Ok(Some(page)) => {
                tracing::debug!(
                    "Fetched {} readings for '{}' (page {}, size {})",
                    page.len(),
                    query.sensor_id,
                    query.page(),
                    query.size()
                );
                self.commit(Mutation::SetHistoricalData {
                    query: query.clone(),
                    page,
                })
                .await;
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("History response for '{}' carried no data", query.sensor_id);
                Ok(())
            }
            Err(e) => Err(self.fail(FETCH_HISTORY_FAILED, e).await),
        }
    }

    /// Mark `sensor` as the one the views focus on
    pub async fn select_sensor(&self, sensor: Option<Sensor>) {
        self.commit(Mutation::SetCurrentSensor(sensor)).await;
    }

    pub async fn add_sensor(&self, sensor: &Sensor) -> crate::Result<()> {
        if let Err(e) = self.api.create_sensor(sensor).await {
            return Err(self.fail(ADD_SENSOR_FAILED, e).await);
        }
        self.notifier.notify(Toast::success(SENSOR_ADDED)).await;
        self.fetch_sensors().await
    }

    pub async fn update_sensor(&self, sensor: &Sensor) -> crate::Result<()> {
        if let Err(e) = self.api.update_sensor(sensor).await {
            return Err(self.fail(UPDATE_SENSOR_FAILED, e).await);
        }
        self.notifier.notify(Toast::success(SENSOR_UPDATED)).await;
        self.fetch_sensors().await
    }

    pub async fn delete_sensor(&self, id: &str) -> crate::Result<()> {
        if let Err(e) = self.api.delete_sensor(id).await {
            return Err(self.fail(DELETE_SENSOR_FAILED, e).await);
        }
        self.notifier.notify(Toast::success(SENSOR_DELETED)).await;
        self.fetch_sensors().await
    }

    pub async fn update_sensor_location(&self, location: &LocationUpdate) -> crate::Result<()> {
        if let Err(e) = self.api.update_location(location).await {
            return Err(self.fail(UPDATE_LOCATION_FAILED, e).await);
        }
        self.notifier.notify(Toast::success(LOCATION_UPDATED)).await;
        self.fetch_sensors().await
    }
}
