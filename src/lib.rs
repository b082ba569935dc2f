//! Taskkeeper: task lifecycle engine for personal to-do lists.
//!
//! Users own tasks that can be created, edited, completed, reopened, moved to
//! the trash, restored and permanently removed, one at a time or in bulk.
//!
//! # Architecture
//!
//! Taskkeeper follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Status derivation, listing order and lifecycle transitions
//! - [`config`]: Store configuration from environment variables

pub mod config;
pub mod task;
