//! bichon-admin: client library for the administration API of a Bichon
//! mail archive server.
//!
//! The binary in `main.rs` is a thin CLI over [`console::Console`]; the
//! modules are public so other front ends (and the tests in `tests/`) can
//! drive the same flows.

pub mod api;
pub mod cache;
pub mod config;
pub mod console;
pub mod errors;
pub mod forms;
pub mod i18n;
pub mod models;
pub mod mutation;
pub mod notification;
pub mod session;
