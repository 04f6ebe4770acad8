//! Web dashboard: one server-rendered page per route-table entry, the
//! sensor-management form endpoints, and a JSON state snapshot

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::config::MapConfig;
use crate::html::escape;
use crate::map::init_map;
use crate::model::{HistoryQuery, LocationUpdate, Reading, Sensor};
use crate::notifier::{Toast, ToastLevel};
use crate::routes::{Route, ROUTES};
use crate::store::SensorStore;
use crate::DashboardError;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub store: SensorStore,
    pub map: MapConfig,
}

/// Build the dashboard axum router
pub fn build_router(store: SensorStore, map: MapConfig) -> Router {
    let dashboard_state = DashboardState { store, map };

    let mut router = Router::new();
    for route in ROUTES {
        router = router.route(route.path(), view_handler(route));
    }

    router
        .route("/sensor-management/sensors", post(add_sensor_handler))
        .route("/sensor-management/sensors/{id}", post(update_sensor_handler))
        .route(
            "/sensor-management/sensors/{id}/delete",
            post(delete_sensor_handler),
        )
        .route(
            "/sensor-management/sensors/{id}/location",
            post(update_location_handler),
        )
        .route("/api/state", get(state_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(dashboard_state)
}

fn view_handler(route: Route) -> MethodRouter<DashboardState> {
    match route {
        Route::Map => get(map_handler),
        Route::RealTime => get(realtime_handler),
        Route::History => get(history_handler),
        Route::SensorManagement => get(management_handler),
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        tracing::error!("Dashboard request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

async fn map_handler(State(dashboard): State<DashboardState>) -> crate::Result<Html<String>> {
    if let Err(e) = dashboard.store.fetch_sensors().await {
        tracing::debug!("Rendering map from cached sensors: {}", e);
    }

    let mut map = init_map(&dashboard.map.container, &dashboard.map);
    let (toasts, rows) = {
        let mut state = dashboard.store.state().write().await;
        map.add_sensor_markers(&state.sensors);
        let rows: String = state
            .sensors
            .iter()
            .map(|s| {
                let location = match (s.latitude, s.longitude) {
                    (Some(lat), Some(lng)) => format!("{:.4}, {:.4}", lat, lng),
                    _ => "-".to_string(),
                };
                format!(
                    "<tr>{}{}{}{}</tr>",
                    cell(&escape(&s.name)),
                    cell(&escape(&s.sensor_type)),
                    cell(&location),
                    cell(&status_badge(s.status)),
                )
            })
            .collect();
        (state.take_toasts(), rows)
    };

    // Keep "</script>" in sensor text from closing the tag early
    let map_json = serde_json::to_string(&map)?.replace("</", "<\\/");
    let body = format!(
        r#"<div id="{container}" style="height: 480px; border: 1px solid #dee2e6;"></div>
    <script>window.sensorMap = {map_json};</script>
    <h2>Sensors</h2>
    <table style="{TABLE}">
        <thead><tr>{head}</tr></thead>
        <tbody>{rows}</tbody>
    </table>"#,
        container = escape(map.container()),
        map_json = map_json,
        TABLE = TABLE_STYLE,
        head = header_cells(&["Name", "Type", "Location", "Status"]),
        rows = rows,
    );

    Ok(Html(page(Route::Map, &toasts, &body)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeParams {
    sensor_id: Option<String>,
}

async fn realtime_handler(
    State(dashboard): State<DashboardState>,
    Query(params): Query<RealtimeParams>,
) -> Html<String> {
    let store = &dashboard.store;
    if let Err(e) = store.fetch_sensors().await {
        tracing::debug!("Using cached sensors for real-time view: {}", e);
    }

    let sensor_id = params.sensor_id.filter(|id| !id.is_empty());
    if let Some(id) = &sensor_id {
        let selected = store.state().read().await.find_sensor(id).cloned();
        store.select_sensor(selected).await;
        if let Err(e) = store.fetch_realtime_data(id).await {
            tracing::debug!("Showing previous reading for '{}': {}", id, e);
        }
    }

    let mut state = store.state().write().await;
    let picker = sensor_picker(Route::RealTime, &state.sensors, sensor_id.as_deref(), "");
    let reading = match sensor_id.as_deref().map(|id| state.realtime_for(id)) {
        None => "<p>Select a sensor to see its latest reading.</p>".to_string(),
        Some(None) => "<p>No reading available.</p>".to_string(),
        Some(Some(reading)) => reading_table(std::slice::from_ref(reading)),
    };
    let heading = state
        .current_sensor
        .as_ref()
        .map(|s| format!("<h2>{}</h2>", escape(&s.name)))
        .unwrap_or_default();
    let toasts = state.take_toasts();

    let body = format!("{picker}{heading}{reading}");
    Html(page(Route::RealTime, &toasts, &body))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams {
    sensor_id: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    page: Option<u32>,
    size: Option<u32>,
}

impl HistoryParams {
    fn to_query(&self) -> Option<HistoryQuery> {
        let sensor_id = self.sensor_id.clone().filter(|id| !id.is_empty())?;
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
        Some(HistoryQuery {
            sensor_id,
            start_time: non_empty(&self.start_time),
            end_time: non_empty(&self.end_time),
            page: self.page,
            size: self.size,
        })
    }
}

async fn history_handler(
    State(dashboard): State<DashboardState>,
    Query(params): Query<HistoryParams>,
) -> crate::Result<Html<String>> {
    let store = &dashboard.store;
    if let Err(e) = store.fetch_sensors().await {
        tracing::debug!("Using cached sensors for history view: {}", e);
    }

    let query = params.to_query();
    if let Some(query) = &query {
        if let Err(e) = store.fetch_historical_data(query).await {
            tracing::debug!("Showing previous history page: {}", e);
        }
    }

    let mut state = store.state().write().await;
    let range_inputs = format!(
        r#" <input name="startTime" placeholder="start time" value="{}"> <input name="endTime" placeholder="end time" value="{}"> <input name="size" type="number" min="1" value="{}">"#,
        escape(params.start_time.as_deref().unwrap_or_default()),
        escape(params.end_time.as_deref().unwrap_or_default()),
        query
            .as_ref()
            .map(HistoryQuery::size)
            .unwrap_or(HistoryQuery::DEFAULT_SIZE),
    );
    let picker = sensor_picker(
        Route::History,
        &state.sensors,
        params.sensor_id.as_deref(),
        &range_inputs,
    );
    let results = match &query {
        None => "<p>Select a sensor and time range.</p>".to_string(),
        Some(query) => match state.history_for(query) {
            Some(readings) => format!(
                "{}{}",
                reading_table(readings),
                pager(query, readings.len())?
            ),
            None => "<p>No readings available.</p>".to_string(),
        },
    };
    let toasts = state.take_toasts();

    let body = format!("{picker}{results}");
    Ok(Html(page(Route::History, &toasts, &body)))
}

async fn management_handler(State(dashboard): State<DashboardState>) -> Html<String> {
    if let Err(e) = dashboard.store.fetch_sensors().await {
        tracing::debug!("Using cached sensors for management view: {}", e);
    }

    let mut state = dashboard.store.state().write().await;
    let rows: String = state.sensors.iter().map(management_row).collect();
    let toasts = state.take_toasts();

    let body = format!(
        r#"<h2>Sensors</h2>
    <table style="{TABLE}">
        <thead><tr>{head}</tr></thead>
        <tbody>{rows}</tbody>
    </table>
    <h2>Add Sensor</h2>
    <form method="post" action="/sensor-management/sensors">{fields}<button type="submit">Add</button></form>"#,
        TABLE = TABLE_STYLE,
        head = header_cells(&["ID", "Sensor", "Location", "Delete"]),
        rows = rows,
        fields = sensor_fields(&Sensor::default()),
    );
    Html(page(Route::SensorManagement, &toasts, &body))
}

/// Sensor fields as submitted by the management forms
///
/// Coordinates arrive as text so an empty input means "no location".
#[derive(Debug, Deserialize)]
struct SensorForm {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    sensor_type: String,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    longitude: String,
    #[serde(default)]
    status: Option<String>,
}

impl SensorForm {
    fn into_sensor(self, id: Option<String>) -> Sensor {
        Sensor {
            id,
            name: self.name.trim().to_string(),
            sensor_type: self.sensor_type.trim().to_string(),
            latitude: self.latitude.trim().parse().ok(),
            longitude: self.longitude.trim().parse().ok(),
            status: self.status.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationForm {
    latitude: f64,
    longitude: f64,
}

fn back_to_management() -> Redirect {
    Redirect::to(Route::SensorManagement.path())
}

async fn add_sensor_handler(
    State(dashboard): State<DashboardState>,
    Form(form): Form<SensorForm>,
) -> Redirect {
    let sensor = form.into_sensor(None);
    if let Err(e) = dashboard.store.add_sensor(&sensor).await {
        tracing::debug!("Add sensor '{}' failed: {}", sensor.name, e);
    }
    back_to_management()
}

async fn update_sensor_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<String>,
    Form(form): Form<SensorForm>,
) -> Redirect {
    let sensor = form.into_sensor(Some(id.clone()));
    if let Err(e) = dashboard.store.update_sensor(&sensor).await {
        tracing::debug!("Update sensor '{}' failed: {}", id, e);
    }
    back_to_management()
}

async fn delete_sensor_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<String>,
) -> Redirect {
    if let Err(e) = dashboard.store.delete_sensor(&id).await {
        tracing::debug!("Delete sensor '{}' failed: {}", id, e);
    }
    back_to_management()
}

async fn update_location_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<String>,
    Form(form): Form<LocationForm>,
) -> Redirect {
    let location = LocationUpdate {
        id,
        latitude: form.latitude,
        longitude: form.longitude,
    };
    if let Err(e) = dashboard.store.update_sensor_location(&location).await {
        tracing::debug!("Location update for '{}' failed: {}", location.id, e);
    }
    back_to_management()
}

async fn state_handler(
    State(dashboard): State<DashboardState>,
) -> crate::Result<axum::Json<serde_json::Value>> {
    let state = dashboard.store.state().read().await;
    Ok(axum::Json(serde_json::to_value(&*state)?))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

const TABLE_STYLE: &str = "width: 100%; border-collapse: collapse;";
const CELL_STYLE: &str = "padding: 0.5rem; text-align: left;";

fn cell(content: &str) -> String {
    format!(r#"<td style="{}">{}</td>"#, CELL_STYLE, content)
}

fn header_cells(titles: &[&str]) -> String {
    titles
        .iter()
        .map(|t| format!(r#"<th style="{}">{}</th>"#, CELL_STYLE, t))
        .collect()
}

fn badge(text: &str, color: &str, bg: &str) -> String {
    format!(
        r#"<span style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; color: {}; background-color: {};">{}</span>"#,
        color, bg, text
    )
}

fn status_badge(online: bool) -> String {
    if online {
        badge("online", "#155724", "#d4edda")
    } else {
        badge("offline", "#383d41", "#e2e3e5")
    }
}

fn toast_banner(toast: &Toast) -> String {
    let (color, bg) = match toast.level {
        ToastLevel::Success => ("#155724", "#d4edda"),
        ToastLevel::Error => ("#721c24", "#f8d7da"),
    };
    format!(
        r#"<div class="toast" style="padding: 0.5rem 1rem; margin-bottom: 0.5rem; border-radius: 0.25rem; color: {}; background-color: {};">{}</div>"#,
        color,
        bg,
        escape(&toast.message)
    )
}

fn page(active: Route, toasts: &[Toast], body: &str) -> String {
    let nav: String = ROUTES
        .iter()
        .map(|route| {
            let weight = if *route == active { "700" } else { "400" };
            format!(
                r#"<a href="{}" style="margin-right: 1rem; font-weight: {};">{}</a>"#,
                route.path(),
                weight,
                route.title()
            )
        })
        .collect();
    let toasts: String = toasts.iter().map(toast_banner).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} - Sensor Dashboard</title>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <h1>Sensor Dashboard</h1>
    <nav style="margin-bottom: 1rem;">{nav}</nav>
    {toasts}
    <main>
    {body}
    </main>
</body>
</html>"#,
        title = active.title(),
        nav = nav,
        toasts = toasts,
        body = body,
    )
}

fn sensor_picker(route: Route, sensors: &[Sensor], selected: Option<&str>, extra: &str) -> String {
    let options: String = sensors
        .iter()
        .filter_map(|s| s.id.as_deref().map(|id| (id, s)))
        .map(|(id, s)| {
            let mark = if Some(id) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(id),
                mark,
                escape(&s.name)
            )
        })
        .collect();
    format!(
        r#"<form method="get" action="{}"><select name="sensorId"><option value="">Select sensor</option>{}</select>{}<button type="submit">Show</button></form>"#,
        route.path(),
        options,
        extra
    )
}

fn reading_table(readings: &[Reading]) -> String {
    if readings.is_empty() {
        return "<p>No readings.</p>".to_string();
    }
    let rows: String = readings
        .iter()
        .map(|r| {
            let value = escape(&r.value_text());
            let ts = escape(&r.ts_text());
            let extra = if r.extra.is_empty() {
                String::new()
            } else {
                escape(&serde_json::Value::Object(r.extra.clone()).to_string())
            };
            format!("<tr>{}{}{}</tr>", cell(&ts), cell(&value), cell(&extra))
        })
        .collect();
    format!(
        r#"<table style="{}"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>"#,
        TABLE_STYLE,
        header_cells(&["Time", "Value", "Details"]),
        rows
    )
}

fn pager(query: &HistoryQuery, shown: usize) -> crate::Result<String> {
    let link = |page: u32, label: &str| -> crate::Result<String> {
        let mut next = query.clone();
        next.page = Some(page);
        Ok(format!(
            r#"<a href="{}" style="margin-right: 1rem;">{}</a>"#,
            escape(&history_href(&next)?),
            label
        ))
    };

    let page = query.page();
    let mut links = String::new();
    if let Some(previous) = page.checked_sub(1) {
        links.push_str(&link(previous, "Previous")?);
    }
    links.push_str(&format!("<span>Page {}</span> ", u64::from(page) + 1));
    if let Some(next) = page.checked_add(1) {
        if shown >= query.size() as usize {
            links.push_str(&link(next, "Next")?);
        }
    }
    Ok(format!("<p>{}</p>", links))
}

/// Relative link to the history view for `query`
fn history_href(query: &HistoryQuery) -> crate::Result<String> {
    let mut url = reqwest::Url::parse("http://localhost")
        .map_err(|e| DashboardError::Config(format!("Building history link: {}", e)))?;
    url.set_path(Route::History.path());
    url.query_pairs_mut().extend_pairs(query.to_params());
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

fn sensor_fields(sensor: &Sensor) -> String {
    let coord = |c: Option<f64>| c.map(|v| v.to_string()).unwrap_or_default();
    let checked = if sensor.status { " checked" } else { "" };
    format!(
        r#"<input name="name" placeholder="name" required value="{}"> <input name="type" placeholder="type" value="{}"> <input name="latitude" placeholder="latitude" value="{}"> <input name="longitude" placeholder="longitude" value="{}"> <label><input type="checkbox" name="status"{}> online</label> "#,
        escape(&sensor.name),
        escape(&sensor.sensor_type),
        coord(sensor.latitude),
        coord(sensor.longitude),
        checked
    )
}

fn management_row(sensor: &Sensor) -> String {
    let Some(id) = sensor.id.as_deref() else {
        return format!(
            "<tr>{}{}{}{}</tr>",
            cell("-"),
            cell(&escape(&sensor.name)),
            cell("-"),
            cell("-")
        );
    };
    let id = escape(id);
    let update = format!(
        r#"<form method="post" action="/sensor-management/sensors/{id}">{fields}<button type="submit">Save</button></form>"#,
        id = id,
        fields = sensor_fields(sensor),
    );
    let location = format!(
        r#"<form method="post" action="/sensor-management/sensors/{id}/location"><input name="latitude" type="number" step="any" required value="{lat}"> <input name="longitude" type="number" step="any" required value="{lng}"> <button type="submit">Move</button></form>"#,
        id = id,
        lat = sensor.latitude.map(|v| v.to_string()).unwrap_or_default(),
        lng = sensor.longitude.map(|v| v.to_string()).unwrap_or_default(),
    );
    let delete = format!(
        r#"<form method="post" action="/sensor-management/sensors/{}/delete"><button type="submit">Delete</button></form>"#,
        id
    );
    format!(
        "<tr>{}{}{}{}</tr>",
        cell(&id),
        cell(&update),
        cell(&location),
        cell(&delete)
    )
}
