// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod snapshots;

pub use snapshots::{AllocatorSnapshot, LinkSnapshot};
