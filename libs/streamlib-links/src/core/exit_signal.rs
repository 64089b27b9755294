// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Allocator exit request, raised by the runtime's shutdown path.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot exit flag shared between the runtime and the allocator.
///
/// Once raised, new swaps are refused and a swap blocked on a drain gives up
/// at its next poll, leaving the edge split but consistent.
#[derive(Debug, Default)]
pub struct ExitSignal {
    requested: AtomicBool,
}

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` only for the call that raised it.
    pub fn request(&self) -> bool {
        let first = !self.requested.swap(true, Ordering::AcqRel);
        if first {
            tracing::info!("Link allocator exit requested");
        }
        first
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
