// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link allocation and live hot-swap for StreamLib processor graphs.
//!
//! Processors talk through bounded ring-buffer links attached to named
//! [`LinkOutput`]/[`LinkInput`] ports. The [`LinkAllocator`] binds a fresh link
//! when an edge is first wired, replaces a live link without stopping the
//! processors on either end, and releases everything at shutdown.
//!
//! ```no_run
//! use streamlib_links::{
//!     AllocatorConfig, LinkAllocator, LinkId, LinkInput, LinkInstance, LinkOutput,
//!     StaticTopology,
//! };
//!
//! # fn main() -> streamlib_links::Result<()> {
//! let topology = StaticTopology::new(["camera"], ["camera", "display"]);
//! let mut allocator = LinkAllocator::new(&topology, AllocatorConfig::default());
//!
//! let output = LinkOutput::<u64>::new("camera.video_out");
//! let input = LinkInput::<u64>::new("display.video_in");
//! allocator.bind(Some(&output), Some(&input), LinkInstance::new(LinkId::from_string("v0")?, 8))?;
//! allocator.mark_ready();
//!
//! // Later, from the control thread, while both processors keep running:
//! let outcome = allocator.swap(&output, Some(&input), LinkInstance::new(LinkId::from_string("v1")?, 32))?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use core::{
    AllocatorConfig, AllocatorSnapshot, ExitSignal, LinkAllocator, LinkDirection, LinkId,
    LinkIdError, LinkInput, LinkInputDataReader, LinkInstance, LinkOutput, LinkOutputDataWriter,
    LinkPortAddress, LinkSnapshot, PortSide, ProcessorId, ReadinessGate, Result, RetiredLink,
    StaticTopology, StreamError, SwapOutcome, TopologyView,
};
