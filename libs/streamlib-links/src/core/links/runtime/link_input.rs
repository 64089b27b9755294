// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkInput - Input port for a processor.

use std::ops::Deref;
use std::sync::Arc;

use super::link_port::LinkPort;
use crate::core::links::graph::LinkDirection;
use crate::core::links::traits::{LinkPortAddress, LinkPortMessage};

/// Input link port for a processor (the destination side of a link).
///
/// Supports a single link (1-to-1 at input). Every read re-reads the binding,
/// so after a swap repoints this port the next read already comes from the
/// new link. When no link is bound, reads return None.
pub struct LinkInput<T: LinkPortMessage> {
    inner: Arc<LinkPort<T>>,
}

impl<T: LinkPortMessage> Clone for LinkInput<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: LinkPortMessage> LinkInput<T> {
    /// Create a new, unbound input port.
    pub fn new(port_name: &str) -> Self {
        Self {
            inner: Arc::new(LinkPort::new(port_name, LinkDirection::Input)),
        }
    }

    /// Create an input port named after its full address.
    pub fn at(address: &LinkPortAddress) -> Self {
        Self::new(&address.full_address())
    }

    /// Read the next item in FIFO order.
    pub fn read(&self) -> Option<T> {
        self.inner.current().and_then(|link| link.pop())
    }

    /// Check if data is available.
    pub fn has_data(&self) -> bool {
        self.inner
            .current()
            .map(|link| link.has_data())
            .unwrap_or(false)
    }

    /// Number of items queued on the bound link.
    pub fn queued(&self) -> usize {
        self.inner.current().map(|link| link.len()).unwrap_or(0)
    }
}

impl<T: LinkPortMessage> Deref for LinkInput<T> {
    type Target = LinkPort<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::links::LinkOutput;
    use crate::core::links::graph::link_id::__private::new_unchecked;
    use crate::core::links::runtime::LinkInstance;

    #[test]
    fn test_ports_start_unbound() {
        let output = LinkOutput::<u32>::new("out");
        let input = LinkInput::<u32>::new("in");

        assert!(!output.is_bound());
        assert!(!input.is_bound());
        assert_eq!(output.direction(), LinkDirection::Output);
        assert_eq!(input.direction(), LinkDirection::Input);
        assert!(!output.write(1));
        assert!(input.read().is_none());
    }

    #[test]
    fn test_bound_ports_carry_data() {
        let output = LinkOutput::<u32>::new("out");
        let input = LinkInput::<u32>::new("in");
        let link = LinkInstance::new(new_unchecked("link"), 4);

        output.bind_to(&link);
        input.bind_to(&link);

        assert!(output.is_bound_to(&link));
        assert!(input.is_bound_to(&link));
        assert!(output.write(10));
        assert!(output.write(11));
        assert_eq!(input.queued(), 2);
        assert_eq!(input.read(), Some(10));
        assert_eq!(input.read(), Some(11));
        assert!(!input.has_data());
    }

    #[test]
    fn test_try_write_hands_back_on_full() {
        let output = LinkOutput::<u32>::new("out");
        let link = LinkInstance::new(new_unchecked("link"), 1);
        output.bind_to(&link);

        assert_eq!(output.try_write(1), Ok(()));
        assert_eq!(output.try_write(2), Err(2));
    }

    #[test]
    fn test_write_follows_rebinding_past_sealed_link() {
        let output = LinkOutput::<u32>::new("out");
        let old = LinkInstance::new(new_unchecked("old"), 4);
        let new = LinkInstance::new(new_unchecked("new"), 4);

        output.bind_to(&old);
        assert!(output.write(1));
        output.bind_to(&new);
        old.inner().seal();

        assert!(output.write(2));
        assert_eq!(old.len(), 1);
        assert_eq!(new.len(), 1);
    }

    #[test]
    fn test_sealed_link_still_bound_rejects_write() {
        let output = LinkOutput::<u32>::new("out");
        let link = LinkInstance::new(new_unchecked("link"), 4);
        output.bind_to(&link);
        link.inner().seal();

        assert_eq!(output.try_write(5), Err(5));
    }

    #[test]
    fn test_dropped_link_reads_as_unbound() {
        let input = LinkInput::<u32>::new("in");
        let link = LinkInstance::new(new_unchecked("link"), 4);
        input.bind_to(&link);
        assert!(input.is_bound());

        drop(link);
        assert!(!input.is_bound());
        assert!(input.link_id().is_none());
    }
}
