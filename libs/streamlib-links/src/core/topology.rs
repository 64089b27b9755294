// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Read-only view of the processor graph consulted when the allocator is built.

use serde::{Deserialize, Serialize};

/// Identifier of a processor (kernel) in the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessorId(String);

impl ProcessorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProcessorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProcessorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplier of the processor sets the allocator sizes itself from.
pub trait TopologyView {
    /// Processors that only produce (graph sources).
    fn source_processors(&self) -> Vec<ProcessorId>;

    /// Every processor in the graph.
    fn processors(&self) -> Vec<ProcessorId>;
}

/// Fixed topology, e.g. loaded from a graph description file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticTopology {
    #[serde(default)]
    pub sources: Vec<ProcessorId>,
    #[serde(default)]
    pub processors: Vec<ProcessorId>,
}

impl StaticTopology {
    pub fn new(
        sources: impl IntoIterator<Item = impl Into<ProcessorId>>,
        processors: impl IntoIterator<Item = impl Into<ProcessorId>>,
    ) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            processors: processors.into_iter().map(Into::into).collect(),
        }
    }
}

impl TopologyView for StaticTopology {
    fn source_processors(&self) -> Vec<ProcessorId> {
        self.sources.clone()
    }

    fn processors(&self) -> Vec<ProcessorId> {
        self.processors.clone()
    }
}
