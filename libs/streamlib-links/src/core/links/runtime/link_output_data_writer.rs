// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkOutputDataWriter - producer handle pinned to a single link.

use std::sync::Weak;

use super::link_instance::{LinkInstanceInner, LinkPush};
use crate::core::links::graph::LinkId;
use crate::core::links::traits::LinkPortMessage;

/// Producer end of one link.
///
/// Unlike a [`LinkOutput`](super::LinkOutput) port this handle does not follow
/// hot swaps: once the link is sealed or destroyed, writes are refused.
pub struct LinkOutputDataWriter<T: LinkPortMessage> {
    link: Weak<LinkInstanceInner<T>>,
}

impl<T: LinkPortMessage> LinkOutputDataWriter<T> {
    pub(super) fn new(link: Weak<LinkInstanceInner<T>>) -> Self {
        Self { link }
    }

    /// Write, dropping the value if it cannot be queued.
    pub fn write(&self, value: T) -> bool {
        self.try_write(value).is_ok()
    }

    /// Write, handing the value back if the link is full, sealed or gone.
    pub fn try_write(&self, value: T) -> Result<(), T> {
        let Some(link) = self.link.upgrade() else {
            return Err(value);
        };
        match link.push(value) {
            LinkPush::Pushed => Ok(()),
            LinkPush::Full(value) | LinkPush::Sealed(value) => Err(value),
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.link.strong_count() > 0
    }

    pub fn link_id(&self) -> Option<LinkId> {
        self.link.upgrade().map(|link| link.link_id().clone())
    }
}

impl<T: LinkPortMessage> Clone for LinkOutputDataWriter<T> {
    fn clone(&self) -> Self {
        Self::new(Weak::clone(&self.link))
    }
}
