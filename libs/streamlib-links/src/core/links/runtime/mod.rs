// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runtime link infrastructure for actual data flow.
//!
//! - `LinkInstance`: Owns the ring buffer
//! - `LinkOutputDataWriter`/`LinkInputDataReader`: Weak handles pinned to one link
//! - `LinkOutput`/`LinkInput`: Processor-facing ports, rebound by the allocator

pub mod link_input;
pub mod link_input_data_reader;
pub mod link_instance;
pub mod link_output;
pub mod link_output_data_writer;
pub mod link_port;

pub use link_input::LinkInput;
pub use link_input_data_reader::LinkInputDataReader;
pub use link_instance::{
    AnyLinkInstance, BoxedLinkInstance, LinkInstance, LinkInstanceInner, LinkPush,
};
pub use link_output::LinkOutput;
pub use link_output_data_writer::LinkOutputDataWriter;
pub use link_port::LinkPort;
