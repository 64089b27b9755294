// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

/// Trait for types that can be sent through link ports.
///
/// Links are read in FIFO order only. A hot swap relies on every item queued
/// before the swap reaching the consumer, so there is no skip-to-latest mode.
pub trait LinkPortMessage: Send + 'static {}

impl<T: Send + 'static> LinkPortMessage for T {}
