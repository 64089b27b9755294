// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkInputDataReader - consumer handle pinned to a single link.

use std::sync::{Arc, Weak};

use super::link_instance::LinkInstanceInner;
use crate::core::links::graph::LinkId;
use crate::core::links::traits::LinkPortMessage;

/// Consumer end of one link for code that is not a [`LinkInput`](super::LinkInput)
/// port, e.g. a network sink draining a sink-only edge.
///
/// The handle never follows a hot swap. Once the allocator destroys the link
/// every call degrades to `None`/`0`/`false`, which is how an external reader
/// learns it should move to the replacement link.
pub struct LinkInputDataReader<T: LinkPortMessage> {
    link: Weak<LinkInstanceInner<T>>,
}

impl<T: LinkPortMessage> LinkInputDataReader<T> {
    pub(super) fn new(link: Weak<LinkInstanceInner<T>>) -> Self {
        Self { link }
    }

    fn live(&self) -> Option<Arc<LinkInstanceInner<T>>> {
        self.link.upgrade()
    }

    /// Oldest queued item, if any.
    pub fn read(&self) -> Option<T> {
        self.live().and_then(|link| link.pop())
    }

    /// Move up to `max` queued items into `out`. Returns how many were moved.
    pub fn drain_into(&self, out: &mut Vec<T>, max: usize) -> usize {
        let Some(link) = self.live() else {
            return 0;
        };
        let before = out.len();
        while out.len() - before < max {
            match link.pop() {
                Some(item) => out.push(item),
                None => break,
            }
        }
        out.len() - before
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.link.strong_count() > 0
    }

    /// `true` once a swap has retired this link. Remaining items can still be read.
    pub fn is_sealed(&self) -> bool {
        self.live().is_some_and(|link| link.is_sealed())
    }

    pub fn has_data(&self) -> bool {
        self.live().is_some_and(|link| link.has_data())
    }

    pub fn queued(&self) -> usize {
        self.live().map_or(0, |link| link.len())
    }

    pub fn link_id(&self) -> Option<LinkId> {
        self.live().map(|link| link.link_id().clone())
    }
}

impl<T: LinkPortMessage> Clone for LinkInputDataReader<T> {
    fn clone(&self) -> Self {
        Self::new(Weak::clone(&self.link))
    }
}
