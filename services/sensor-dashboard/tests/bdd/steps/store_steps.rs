//! BDD step definitions for the sensor store feature

use cucumber::{given, then, when};
use serde_json::json;

use sensor_dashboard::model::{HistoryQuery, LocationUpdate, Sensor};
use sensor_dashboard::notifier::Toast;
use sensor_dashboard::state::Mutation;
use sensor_dashboard::{build_store, Config};

use crate::backend::StubBackend;
use crate::world::DashboardWorld;

fn ids(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

async fn start_backend(world: &mut DashboardWorld) {
    let backend = StubBackend::start().await;
    let mut config = Config::default();
    config.api.base_url = backend.base_url.clone();
    world.store = Some(build_store(&config).expect("store"));
    world.backend = Some(backend);
}

#[given(expr = "a backend with sensors {string}")]
async fn backend_with_sensors(world: &mut DashboardWorld, list: String) {
    start_backend(world).await;
    let mut data = world.backend().data.lock().unwrap();
    data.sensors = ids(&list)
        .into_iter()
        .map(|id| json!({ "id": id, "name": format!("Sensor {}", id), "type": "temperature", "status": 1 }))
        .collect();
}

#[given("a failing backend")]
async fn failing_backend(world: &mut DashboardWorld) {
    start_backend(world).await;
    world.backend().data.lock().unwrap().failing = true;
}

#[given(expr = "the store has cached sensors {string}")]
async fn cached_sensors(world: &mut DashboardWorld, list: String) {
    let sensors = ids(&list)
        .into_iter()
        .map(|id| Sensor {
            id: Some(id.clone()),
            ..Sensor::named(id)
        })
        .collect();
    world
        .store()
        .state()
        .write()
        .await
        .commit(Mutation::SetSensors(sensors));
}

#[given(expr = "sensor {string} has a real-time reading of {float} at {int}")]
fn realtime_reading(world: &mut DashboardWorld, id: String, value: f64, ts: i64) {
    world
        .backend()
        .data
        .lock()
        .unwrap()
        .realtime
        .insert(id, json!({ "value": value, "ts": ts }));
}

#[when("the sensor list is fetched")]
async fn fetch_sensors(world: &mut DashboardWorld) {
    world.last_result = Some(world.store().fetch_sensors().await);
}

#[when(expr = "the real-time data for {string} is fetched")]
async fn fetch_realtime(world: &mut DashboardWorld, id: String) {
    world.last_result = Some(world.store().fetch_realtime_data(&id).await);
}

#[when(expr = "the history for {string} is fetched without pagination")]
async fn fetch_history(world: &mut DashboardWorld, id: String) {
    let query = HistoryQuery {
        sensor_id: id,
        start_time: Some("1700000000000".to_string()),
        end_time: Some("1700003600000".to_string()),
        page: None,
        size: None,
    };
    world.last_result = Some(world.store().fetch_historical_data(&query).await);
}

#[when(expr = "a sensor named {string} is added")]
async fn add_sensor(world: &mut DashboardWorld, name: String) {
    world.last_result = Some(world.store().add_sensor(&Sensor::named(name)).await);
}

#[when(expr = "sensor {string} is renamed to {string}")]
async fn rename_sensor(world: &mut DashboardWorld, id: String, name: String) {
    let sensor = Sensor {
        id: Some(id),
        ..Sensor::named(name)
    };
    world.last_result = Some(world.store().update_sensor(&sensor).await);
}

#[when(expr = "sensor {string} is deleted")]
async fn delete_sensor(world: &mut DashboardWorld, id: String) {
    world.last_result = Some(world.store().delete_sensor(&id).await);
}

#[when(expr = "sensor {string} is moved to latitude {float} and longitude {float}")]
async fn move_sensor(world: &mut DashboardWorld, id: String, latitude: f64, longitude: f64) {
    let location = LocationUpdate {
        id,
        latitude,
        longitude,
    };
    world.last_result = Some(world.store().update_sensor_location(&location).await);
}

#[then("the action succeeds")]
fn action_succeeds(world: &mut DashboardWorld) {
    let result = world.last_result.as_ref().expect("no action run");
    assert!(result.is_ok(), "expected success, got {:?}", result);
}

#[then("the action fails")]
fn action_fails(world: &mut DashboardWorld) {
    let result = world.last_result.as_ref().expect("no action run");
    assert!(result.is_err(), "expected failure, got {:?}", result);
}

#[then(expr = "the cached sensors are {string}")]
async fn cached_sensors_are(world: &mut DashboardWorld, list: String) {
    let state = world.store().state().read().await;
    let cached: Vec<String> = state.sensors.iter().filter_map(|s| s.id.clone()).collect();
    assert_eq!(cached, ids(&list));
}

#[then(expr = "the cached sensors include a sensor named {string}")]
async fn cached_sensors_include(world: &mut DashboardWorld, name: String) {
    let state = world.store().state().read().await;
    assert!(
        state.sensors.iter().any(|s| s.name == name),
        "no sensor named '{}' in {:?}",
        name,
        state.sensors
    );
}

#[then(expr = "the cached sensor {string} is at latitude {float} and longitude {float}")]
async fn cached_sensor_location(world: &mut DashboardWorld, id: String, lat: f64, lng: f64) {
    let state = world.store().state().read().await;
    let sensor = state.find_sensor(&id).expect("sensor not cached");
    assert_eq!(sensor.latitude, Some(lat));
    assert_eq!(sensor.longitude, Some(lng));
}

#[then(expr = "an error toast {string} is shown")]
async fn error_toast(world: &mut DashboardWorld, message: String) {
    let toasts = world.store().state().write().await.take_toasts();
    assert!(
        toasts.contains(&Toast::error(message.clone())),
        "missing error toast '{}' in {:?}",
        message,
        toasts
    );
}

#[then(expr = "a success toast {string} is shown")]
async fn success_toast(world: &mut DashboardWorld, message: String) {
    let toasts = world.store().state().write().await.take_toasts();
    assert!(
        toasts.contains(&Toast::success(message.clone())),
        "missing success toast '{}' in {:?}",
        message,
        toasts
    );
}

#[then(expr = "the real-time reading has value {float} at {int}")]
async fn realtime_reading_is(world: &mut DashboardWorld, value: f64, ts: i64) {
    let state = world.store().state().read().await;
    let reading = state.realtime_data.as_ref().expect("no reading cached");
    assert_eq!(reading.value, Some(serde_json::json!(value)));
    assert_eq!(reading.ts, Some(serde_json::json!(ts)));
}

#[then(expr = "the backend received a history request with page {string} and size {string}")]
fn history_request(world: &mut DashboardWorld, page: String, size: String) {
    let requests = world.backend().requests();
    let request = requests
        .iter()
        .find(|r| r.path == "/api/data/history")
        .expect("no history request");
    assert_eq!(request.query.get("page"), Some(&page));
    assert_eq!(request.query.get("size"), Some(&size));
    assert!(request.query.contains_key("sensorId"));
}

#[then(expr = "the backend received requests {string}")]
fn received_requests(world: &mut DashboardWorld, expected: String) {
    let received: Vec<String> = world
        .backend()
        .requests()
        .iter()
        .map(|r| r.summary())
        .collect();
    let expected: Vec<String> = expected.split(',').map(|s| s.trim().to_string()).collect();
    assert_eq!(received, expected);
}
