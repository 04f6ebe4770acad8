//! BDD test world for the sensor dashboard

use cucumber::World;
use sensor_dashboard::map::{MapView, MarkerId};
use sensor_dashboard::routes::Route;
use sensor_dashboard::store::SensorStore;

use crate::backend::StubBackend;

#[derive(Debug, Default, World)]
pub struct DashboardWorld {
    // Store testing
    pub backend: Option<StubBackend>,
    pub store: Option<SensorStore>,
    pub last_result: Option<sensor_dashboard::Result<()>>,

    // Map testing
    pub map: Option<MapView>,
    pub marker: Option<MarkerId>,

    // Route testing
    pub resolved_route: Option<Route>,
}

impl DashboardWorld {
    pub fn backend(&self) -> &StubBackend {
        self.backend.as_ref().expect("backend not started")
    }

    pub fn store(&self) -> &SensorStore {
        self.store.as_ref().expect("store not built")
    }

    pub fn map(&self) -> &MapView {
        self.map.as_ref().expect("map not initialized")
    }

    pub fn map_mut(&mut self) -> &mut MapView {
        self.map.as_mut().expect("map not initialized")
    }
}
