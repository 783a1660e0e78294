//! HTTP gateway: webhook intake, health probes, and server startup.

pub mod server;
pub mod state;
pub mod webhook;

pub use {
    server::{build_app, start_gateway},
    state::AppState,
};
