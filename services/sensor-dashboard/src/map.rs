//! Map widget model: viewport, controls, sensor markers and info windows
//!
//! The map page serializes a [`MapView`] for the front-end map script, which
//! owns tiles and projection.

use serde::Serialize;

use crate::config::MapConfig;
use crate::html;
use crate::model::Sensor;

/// A geographic point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Standard map controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapControl {
    Navigation,
    Scale,
    Overview,
    MapType,
}

/// Marker handle, valid for the map that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerId(u32);

/// Popup shown when a marker is clicked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoWindow {
    pub content: String,
}

impl InfoWindow {
    /// Name, type and online/offline status of `sensor`
    pub fn for_sensor(sensor: &Sensor) -> Self {
        let content = format!(
            "<div><h4>{}</h4><p>Type: {}</p><p>Status: {}</p></div>",
            html::escape(&sensor.name),
            html::escape(&sensor.sensor_type),
            sensor.status_text()
        );
        Self { content }
    }
}

/// A sensor overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: MarkerId,
    pub point: Point,
    pub sensor_id: Option<String>,
    pub online: bool,
    pub info_window: InfoWindow,
}

/// One map instance
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    container: String,
    center: Point,
    zoom: u8,
    scroll_wheel_zoom: bool,
    controls: Vec<MapControl>,
    markers: Vec<Marker>,
    open_info_window: Option<MarkerId>,
    #[serde(skip)]
    next_marker_id: u32,
}

/// Create a map bound to `container`, centered and zoomed per `config`, with
/// scroll-wheel zoom and the four standard controls
pub fn init_map(container: &str, config: &MapConfig) -> MapView {
    tracing::debug!(
        "Initializing map '{}' at ({}, {}) zoom {}",
        container,
        config.center_lng,
        config.center_lat,
        config.zoom
    );
    MapView {
        container: container.to_string(),
        center: Point::new(config.center_lng, config.center_lat),
        zoom: config.zoom,
        scroll_wheel_zoom: true,
        controls: vec![
            MapControl::Navigation,
            MapControl::Scale,
            MapControl::Overview,
            MapControl::MapType,
        ],
        markers: Vec::new(),
        open_info_window: None,
        next_marker_id: 0,
    }
}

impl MapView {
    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn scroll_wheel_zoom(&self) -> bool {
        self.scroll_wheel_zoom
    }

    pub fn controls(&self) -> &[MapControl] {
        &self.controls
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// The sensor's coordinate, if it has one
    pub fn sensor_point(sensor: &Sensor) -> Option<Point> {
        match (sensor.longitude, sensor.latitude) {
            (Some(lng), Some(lat)) => Some(Point::new(lng, lat)),
            _ => None,
        }
    }

    /// Place a marker for `sensor` at `point` and return its handle
    pub fn add_marker(&mut self, point: Point, sensor: &Sensor) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        self.markers.push(Marker {
            id,
            point,
            sensor_id: sensor.id.clone(),
            online: sensor.status,
            info_window: InfoWindow::for_sensor(sensor),
        });
        id
    }

    /// Add a marker for every sensor that has a location
    pub fn add_sensor_markers<'a>(&mut self, sensors: impl IntoIterator<Item = &'a Sensor>) {
        for sensor in sensors {
            match Self::sensor_point(sensor) {
                Some(point) => {
                    self.add_marker(point, sensor);
                }
                None => tracing::debug!("Sensor '{}' has no location, skipping marker", sensor.name),
            }
        }
    }

    /// Open the info window of a marker; returns it, or `None` for an unknown marker
    pub fn click_marker(&mut self, id: MarkerId) -> Option<&InfoWindow> {
        let marker = self.markers.iter().find(|m| m.id == id)?;
        self.open_info_window = Some(id);
        Some(&marker.info_window)
    }

    /// The currently open info window and the point it is anchored at
    pub fn open_info_window(&self) -> Option<(Point, &InfoWindow)> {
        let marker = self.marker(self.open_info_window?)?;
        Some((marker.point, &marker.info_window))
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        if self.open_info_window == Some(id) {
            self.open_info_window = None;
        }
        self.markers.len() != before
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.open_info_window = None;
    }
}
