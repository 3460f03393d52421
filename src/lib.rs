//! Modulith - Integration backbone for a modular monolith.
//!
//! Independent modules share one PostgreSQL database and react to each
//! other's state changes through an in-process event bus. Each module owns
//! its schema and migrations; work that must be atomic runs through the
//! transaction coordinator.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
