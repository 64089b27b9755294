// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod error;
pub mod exit_signal;
pub mod links;
pub mod observability;
pub mod readiness;
pub mod topology;

pub use config::AllocatorConfig;
pub use error::*;
pub use exit_signal::ExitSignal;
pub use links::*;
pub use observability::*;
pub use readiness::ReadinessGate;
pub use topology::{ProcessorId, StaticTopology, TopologyView};
