//! Configuration schema and loading.
//!
//! All credentials and tunables are read once at startup into an explicit
//! [`TeamlineConfig`] value that is passed into each component constructor.
//! Component logic never reads process environment directly; `${VAR}`
//! placeholders in the config file are the only bridge to the environment.

pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{
        BridgeConfig, DialogueConfig, ServerConfig, StorageConfig, TeamlineConfig, TwilioConfig,
    },
};
