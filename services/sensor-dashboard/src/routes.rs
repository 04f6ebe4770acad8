//! Static route table for the dashboard views

use std::fmt;

/// A dashboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Map,
    RealTime,
    History,
    SensorManagement,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Map => "/",
            Route::RealTime => "/realtime",
            Route::History => "/history",
            Route::SensorManagement => "/sensor-management",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::Map => "map",
            Route::RealTime => "realtime",
            Route::History => "history",
            Route::SensorManagement => "sensor-management",
        }
    }

    /// Navigation label
    pub fn title(self) -> &'static str {
        match self {
            Route::Map => "Map",
            Route::RealTime => "Real-time Data",
            Route::History => "Historical Data",
            Route::SensorManagement => "Sensor Management",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every view, in navigation order
pub const ROUTES: [Route; 4] = [
    Route::Map,
    Route::RealTime,
    Route::History,
    Route::SensorManagement,
];

/// Look up the view for an exact path
pub fn resolve(path: &str) -> Option<Route> {
    ROUTES.iter().copied().find(|route| route.path() == path)
}
