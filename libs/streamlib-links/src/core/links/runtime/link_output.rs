// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkOutput - Output port for a processor.

use std::ops::Deref;
use std::sync::Arc;

use super::link_instance::LinkPush;
use super::link_port::LinkPort;
use crate::core::links::graph::LinkDirection;
use crate::core::links::traits::{LinkPortAddress, LinkPortMessage};

/// Output link port for a processor (the source side of a link).
///
/// Cloning shares the same binding, so the producer thread and the graph
/// wiring code can each hold one. Writes always go to whatever link the port
/// is bound to at the time of the write, which is how a hot swap redirects
/// production without stopping the producer.
pub struct LinkOutput<T: LinkPortMessage> {
    inner: Arc<LinkPort<T>>,
}

impl<T: LinkPortMessage> Clone for LinkOutput<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: LinkPortMessage> LinkOutput<T> {
    /// Create a new, unbound output port.
    pub fn new(port_name: &str) -> Self {
        Self {
            inner: Arc::new(LinkPort::new(port_name, LinkDirection::Output)),
        }
    }

    /// Create an output port named after its full address.
    pub fn at(address: &LinkPortAddress) -> Self {
        Self::new(&address.full_address())
    }

    /// Write to the bound link.
    ///
    /// Returns `false` if the port is unbound or the buffer is full (data dropped).
    pub fn write(&self, value: T) -> bool {
        self.try_write(value).is_ok()
    }

    /// Write to the bound link, handing the value back if it could not be queued.
    ///
    /// A link sealed by an in-progress swap is skipped: the allocator repoints
    /// this port before sealing, so re-reading the binding yields the new link.
    pub fn try_write(&self, value: T) -> Result<(), T> {
        let mut value = value;
        loop {
            let Some(link) = self.inner.current() else {
                return Err(value);
            };
            match link.push(value) {
                LinkPush::Pushed => return Ok(()),
                LinkPush::Full(rejected) => return Err(rejected),
                LinkPush::Sealed(rejected) => {
                    let rebound = self
                        .inner
                        .current()
                        .is_some_and(|next| !Arc::ptr_eq(&next, &link));
                    if !rebound {
                        return Err(rejected);
                    }
                    value = rejected;
                }
            }
        }
    }
}

impl<T: LinkPortMessage> Deref for LinkOutput<T> {
    type Target = LinkPort<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
