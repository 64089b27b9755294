// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod allocator_config;

pub use allocator_config::{AllocatorConfig, DRAIN_TIMEOUT_ENV};
