// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! One-shot readiness signal published once initial link wiring is done.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Single-writer, multi-reader one-shot flag. There is no reset.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    ready: AtomicBool,
    lock: Mutex<()>,
    signal: Condvar,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish readiness. Returns `true` only for the call that flipped the gate.
    pub fn mark_ready(&self) -> bool {
        let _guard = self.lock.lock();
        let first = !self.ready.swap(true, Ordering::AcqRel);
        if first {
            tracing::debug!("Link wiring marked ready");
            self.signal.notify_all();
        }
        first
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Block until [`mark_ready`](Self::mark_ready) has been called.
    pub fn wait_until_ready(&self) {
        if self.is_ready() {
            return;
        }
        let mut guard = self.lock.lock();
        while !self.is_ready() {
            self.signal.wait(&mut guard);
        }
    }

    /// Bounded variant of [`wait_until_ready`](Self::wait_until_ready).
    /// Returns whether the gate was ready before `timeout` elapsed.
    pub fn wait_until_ready_timeout(&self, timeout: Duration) -> bool {
        if self.is_ready() {
            return true;
        }
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock();
        while !self.is_ready() {
            if self.signal.wait_until(&mut guard, deadline).timed_out() {
                return self.is_ready();
            }
        }
        true
    }
}
