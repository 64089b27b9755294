// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Point-in-time snapshot types for link observation.

use serde::{Deserialize, Serialize};

use crate::core::links::LinkId;

/// Point-in-time snapshot of a registered link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    /// Link identifier.
    pub id: LinkId,
    /// Current queue depth.
    pub queue_depth: usize,
    /// Queue capacity.
    pub capacity: usize,
    /// Whether a swap has retired this link and it is draining.
    pub sealed: bool,
}

/// Summary of everything the allocator currently tracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocatorSnapshot {
    pub ready: bool,
    pub links: Vec<LinkSnapshot>,
    /// Swaps that hit their drain timeout and await `resume_swap`.
    pub stalled_swaps: usize,
}

impl AllocatorSnapshot {
    /// Total items queued across all links.
    pub fn queued(&self) -> usize {
        self.links.iter().map(|l| l.queue_depth).sum()
    }
}
