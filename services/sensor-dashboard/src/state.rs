//! Cached sensor state shared by the store actions and the dashboard views
//!
//! The cached backend data only changes through [`SensorState::commit`].

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::model::{HistoryQuery, Reading, Sensor};
use crate::notifier::Toast;

/// A named change to the cached data
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetSensors(Vec<Sensor>),
    SetCurrentSensor(Option<Sensor>),
    SetRealtimeData { sensor_id: String, reading: Reading },
    SetHistoricalData { query: HistoryQuery, page: Vec<Reading> },
}

/// Read-through cache of backend state plus pending toasts
#[derive(Debug, Default, Serialize)]
pub struct SensorState {
    pub sensors: Vec<Sensor>,
    pub current_sensor: Option<Sensor>,
    pub realtime_data: Option<Reading>,
    /// Sensor the cached reading belongs to
    pub realtime_sensor_id: Option<String>,
    pub historical_data: Vec<Reading>,
    /// Query the cached history page answers
    pub historical_query: Option<HistoryQuery>,
    #[serde(skip)]
    pub toasts: VecDeque<Toast>,
    #[serde(skip)]
    pub toasts_max_size: usize,
}

impl SensorState {
    pub fn new(toasts_max_size: usize) -> Self {
        Self {
            toasts: VecDeque::with_capacity(toasts_max_size),
            toasts_max_size,
            ..Self::default()
        }
    }

    /// Apply a mutation, replacing the targeted slice of cached data wholesale
    pub fn commit(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetSensors(sensors) => self.sensors = sensors,
            Mutation::SetCurrentSensor(sensor) => self.current_sensor = sensor,
            Mutation::SetRealtimeData { sensor_id, reading } => {
                self.realtime_sensor_id = Some(sensor_id);
                self.realtime_data = Some(reading);
            }
            Mutation::SetHistoricalData { query, page } => {
                self.historical_query = Some(query);
                self.historical_data = page;
            }
        }
    }

    /// The cached reading, if it was fetched for `sensor_id`
    pub fn realtime_for(&self, sensor_id: &str) -> Option<&Reading> {
        if self.realtime_sensor_id.as_deref() == Some(sensor_id) {
            self.realtime_data.as_ref()
        } else {
            None
        }
    }

    /// The cached history page, if it was fetched for exactly `query`
    pub fn history_for(&self, query: &HistoryQuery) -> Option<&[Reading]> {
        if self.historical_query.as_ref() == Some(query) {
            Some(&self.historical_data)
        } else {
            None
        }
    }

    pub fn find_sensor(&self, id: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id.as_deref() == Some(id))
    }

    /// Queue a toast, dropping the oldest once the queue is full
    pub fn push_toast(&mut self, toast: Toast) {
        if self.toasts_max_size == 0 {
            return;
        }
        if self.toasts.len() >= self.toasts_max_size {
            self.toasts.pop_front();
        }
        self.toasts.push_back(toast);
    }

    /// Drain queued toasts in arrival order
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SensorState>>;

pub fn new_state_handle(toasts_max_size: usize) -> StateHandle {
    Arc::new(RwLock::new(SensorState::new(toasts_max_size)))
}
