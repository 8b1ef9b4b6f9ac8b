//! HTTP front end for bleedwatch.
//!
//! The binary in `main.rs` loads configuration, wires collaborators with
//! [`infra::startup::wire_app_state`] and serves [`routes::create_app`].

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
