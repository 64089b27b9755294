// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link infrastructure for processor communication.
//!
//! - **graph/**: Link identity and port direction
//! - **runtime/**: Actual data flow (LinkInstance, handles, ports)
//! - **traits/**: Shared traits (LinkPortMessage, LinkPortAddress)
//!
//! The `LinkAllocator` owns every live link and rebinds ports during hot swaps.

pub mod graph;
pub mod link_allocator;
pub mod runtime;
pub mod traits;

pub use graph::{DEFAULT_LINK_CAPACITY, LinkDirection, LinkId, LinkIdError};

pub use runtime::{
    AnyLinkInstance, BoxedLinkInstance, LinkInput, LinkInputDataReader, LinkInstance,
    LinkInstanceInner, LinkOutput, LinkOutputDataWriter, LinkPort, LinkPush,
};

pub use traits::{LinkPortAddress, LinkPortMessage};

pub use link_allocator::{LinkAllocator, RetiredLink, SwapOutcome};
