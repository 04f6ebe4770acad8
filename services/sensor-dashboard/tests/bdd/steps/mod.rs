//! BDD step definitions for the sensor dashboard

pub mod map_steps;
pub mod route_steps;
pub mod store_steps;
