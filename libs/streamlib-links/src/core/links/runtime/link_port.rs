// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkPort - the rebindable link reference shared by input and output ports.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::link_instance::{LinkInstance, LinkInstanceInner};
use crate::core::links::graph::{LinkDirection, LinkId};
use crate::core::links::traits::LinkPortMessage;

/// A named port holding zero or one link reference.
///
/// The reference is `Weak`: the port never keeps a link alive, so a link that
/// has been destroyed reads as unbound. Only the allocator may rebind a port.
pub struct LinkPort<T: LinkPortMessage> {
    name: String,
    direction: LinkDirection,
    binding: RwLock<Option<Weak<LinkInstanceInner<T>>>>,
}

impl<T: LinkPortMessage> LinkPort<T> {
    pub(super) fn new(name: impl Into<String>, direction: LinkDirection) -> Self {
        Self {
            name: name.into(),
            direction,
            binding: RwLock::new(None),
        }
    }

    /// Port name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    /// The live link this port is bound to, if any.
    pub fn current(&self) -> Option<Arc<LinkInstanceInner<T>>> {
        self.binding.read().as_ref().and_then(Weak::upgrade)
    }

    pub fn is_bound(&self) -> bool {
        self.current().is_some()
    }

    /// Id of the bound link.
    pub fn link_id(&self) -> Option<LinkId> {
        self.current().map(|inner| inner.link_id().clone())
    }

    /// Whether this port references exactly `link` (identity, not value).
    pub fn is_bound_to(&self, link: &LinkInstance<T>) -> bool {
        self.binding
            .read()
            .as_ref()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(link.inner())))
    }

    /// Point this port at `link`. The write lock publishes the new binding to
    /// the next reader on any thread.
    pub(crate) fn bind_to(&self, link: &LinkInstance<T>) {
        *self.binding.write() = Some(Arc::downgrade(link.inner()));
    }
}

impl<T: LinkPortMessage> std::fmt::Debug for LinkPort<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkPort")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("link_id", &self.link_id())
            .finish()
    }
}
