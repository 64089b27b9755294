// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Strongly-typed link port address.

use std::borrow::Cow;

use crate::core::topology::ProcessorId;

/// Strongly-typed link port address combining processor ID and port name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkPortAddress {
    pub processor_id: ProcessorId,
    pub port_name: Cow<'static, str>,
}

impl LinkPortAddress {
    /// Create a new link port address.
    pub fn new(processor: impl Into<ProcessorId>, port: impl Into<Cow<'static, str>>) -> Self {
        Self {
            processor_id: processor.into(),
            port_name: port.into(),
        }
    }

    /// Get the full address as "processor_id.port_name".
    pub fn full_address(&self) -> String {
        format!("{}.{}", self.processor_id, self.port_name)
    }
}

impl std::fmt::Display for LinkPortAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.processor_id, self.port_name)
    }
}
