//! BDD step definitions for the route table feature

use cucumber::{then, when};

use sensor_dashboard::routes::resolve;

use crate::world::DashboardWorld;

#[when(expr = "the path {string} is resolved")]
fn resolve_path(world: &mut DashboardWorld, path: String) {
    world.resolved_route = resolve(&path);
}

#[then(expr = "the view is {string}")]
fn view_is(world: &mut DashboardWorld, name: String) {
    let route = world.resolved_route.expect("path did not resolve");
    assert_eq!(route.name(), name);
}

#[then("no view matches")]
fn no_view(world: &mut DashboardWorld) {
    assert!(world.resolved_route.is_none());
}
