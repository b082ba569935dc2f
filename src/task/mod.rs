//! Task lifecycle management.
//!
//! Tasks move between two stages, active and trash. While active, a task is
//! shown as overdue, pending or completed; that status is derived from the
//! completion flag, the deadline and the current instant at read time and is
//! never trusted from storage. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
