//! Scene-level integration tests

mod collision_integration;
mod lifecycle_integration;
