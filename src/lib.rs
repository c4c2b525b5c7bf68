pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;

pub use adapters::{
    ActionResult, ChainResolver, LeadStore, LocalStorage, RemoteResolver, ServiceAreaStore,
    ZipTable,
};
pub use config::AppConfig;
pub use self::core::{
    distance::haversine_miles,
    gate::ProximityGate,
    intake::{IntakeOutcome, LeadIntake, RejectReason},
};
pub use domain::model::{
    ContactSubmission, Coordinate, DecisionReason, GateDecision, Lead, LeadAction, LeadFilter,
    LeadStats, LeadStatus, Radius, ServiceAreaConfig, ServiceAreaEntry, ZipCode,
};
pub use domain::ports::{CoordinateResolver, Storage};
pub use utils::error::{GateError, Result};
