//! Icebox - Build-Time Freeze Store for Portable Dashboards
//!
//! Collects every producer call the dashboard's plugins declare, executes
//! each distinct call exactly once at build time, and persists the results
//! into a content-addressed store the deployed application reads instead
//! of recomputing.

pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod store;

pub use error::{IceboxError, IceboxResult};
pub use plugin::{App, DashboardPlugin, FrozenCall, FrozenDataRequirements};
pub use store::{
    ArgMap, CallSignature, Payload, ProducerRegistry, RegistrationLedger, StoreBuilder,
    StoreReader,
};
