//! The inbound message router and access-control core.
//!
//! One inbound webhook delivery is one turn: subscription gate → command
//! router → {join | admin broadcast | admin schedule | engine fallback} →
//! TwiML reply. Telemetry runs alongside and never affects the reply path.

pub mod access;
pub mod broadcast;
pub mod context;
pub mod gate;
pub mod router;
pub mod turn;
pub mod usage;

#[cfg(test)]
pub(crate) mod testutil;

pub use {
    access::{AdminCheck, WriteDenied},
    broadcast::BroadcastOutcome,
    gate::Gate,
    router::Intent,
    turn::Bridge,
};
