// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link identity and port direction.

mod link_direction;
pub mod link_id;

pub use link_direction::LinkDirection;
pub use link_id::{LinkId, LinkIdError};

/// Default ring buffer capacity for links.
pub const DEFAULT_LINK_CAPACITY: usize = 16;
