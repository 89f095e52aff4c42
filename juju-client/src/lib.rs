//! Client-side plumbing for juju assessments
//!
//! Everything an assessment needs from the tool under test goes through here:
//! - Fluent `juju` command builder with timeouts and `JUJU_DATA` isolation
//! - `Controller` trait so assessments can run against a fake
//! - Status polling for `wait_for_started`
//! - Charm synthesis for deploy tests
//! - Scoped bootstrap/teardown with log collection

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod charm;
pub mod config;
pub mod controller;
pub mod error;
pub mod juju_cmd;
pub mod output;
pub mod status;
pub mod version;

pub use bootstrap::{BootstrapManager, BootstrapOptions};
pub use charm::{CharmMetadata, make_charm, temp_charm};
pub use config::ClientConfig;
pub use controller::{Controller, DeployOutcome, JujuClient};
pub use error::ClientError;
pub use juju_cmd::JujuCommand;
pub use output::CommandOutput;
pub use status::Status;
pub use version::strip_build_suffix;
