//! BDD step definitions for the map feature

use cucumber::{given, then, when};

use sensor_dashboard::config::MapConfig;
use sensor_dashboard::map::{init_map, MapView, Point};
use sensor_dashboard::model::Sensor;

use crate::world::DashboardWorld;

fn sensor(name: &str, online: bool) -> Sensor {
    Sensor {
        id: Some(name.to_lowercase()),
        name: name.to_string(),
        sensor_type: "temperature".to_string(),
        latitude: Some(30.59),
        longitude: Some(114.30),
        status: online,
    }
}

#[given("a map with default settings")]
fn default_map(world: &mut DashboardWorld) {
    world.map = Some(init_map("map", &MapConfig::default()));
}

#[when(expr = "a marker is added for an {word} sensor named {string}")]
fn add_marker(world: &mut DashboardWorld, status: String, name: String) {
    let sensor = sensor(&name, status == "online");
    let point = MapView::sensor_point(&sensor).expect("sensor has a location");
    let id = world.map_mut().add_marker(point, &sensor);
    world.marker = Some(id);
}

#[when("the marker is clicked")]
fn click_marker(world: &mut DashboardWorld) {
    let id = world.marker.expect("no marker added");
    assert!(world.map_mut().click_marker(id).is_some());
}

#[when("the marker is removed")]
fn remove_marker(world: &mut DashboardWorld) {
    let id = world.marker.expect("no marker added");
    assert!(world.map_mut().remove_marker(id));
}

#[then(expr = "the map is centered at longitude {float} and latitude {float}")]
fn map_center(world: &mut DashboardWorld, lng: f64, lat: f64) {
    assert_eq!(world.map().center(), Point::new(lng, lat));
}

#[then(expr = "the map zoom is {int}")]
fn map_zoom(world: &mut DashboardWorld, zoom: u8) {
    assert_eq!(world.map().zoom(), zoom);
}

#[then(expr = "the map has {int} controls and scroll-wheel zoom")]
fn map_controls(world: &mut DashboardWorld, count: usize) {
    let map = world.map();
    assert_eq!(map.controls().len(), count);
    assert!(map.scroll_wheel_zoom());
}

#[then(expr = "the open info window shows {string}")]
fn info_window_shows(world: &mut DashboardWorld, text: String) {
    let (_, window) = world
        .map()
        .open_info_window()
        .expect("no info window open");
    assert!(
        window.content.contains(&text),
        "'{}' not in '{}'",
        text,
        window.content
    );
}

#[then("no info window is open")]
fn no_info_window(world: &mut DashboardWorld) {
    assert!(world.map().open_info_window().is_none());
}

#[then(expr = "the map has {int} marker(s)")]
fn marker_count(world: &mut DashboardWorld, count: usize) {
    assert_eq!(world.map().markers().len(), count);
}
