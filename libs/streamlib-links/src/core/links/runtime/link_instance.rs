// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkInstance - the bounded ring buffer that carries data along one link.
//!
//! The owning [`LinkInstance`] lives in the [`LinkAllocator`] registry (or, after a
//! point-to-point swap, in the caller's [`RetiredLink`]). Ports, readers and
//! writers only hold `Weak` references, so dropping the owner destroys the
//! buffer and every handle degrades gracefully.
//!
//! [`LinkAllocator`]: crate::core::links::LinkAllocator
//! [`RetiredLink`]: crate::core::links::RetiredLink

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use rtrb::{Consumer, Producer, RingBuffer};

use super::link_input_data_reader::LinkInputDataReader;
use super::link_output_data_writer::LinkOutputDataWriter;
use crate::core::links::graph::LinkId;
use crate::core::links::traits::LinkPortMessage;

/// Result of pushing into a link.
#[derive(Debug)]
pub enum LinkPush<T> {
    Pushed,
    /// Ring buffer is full, the value is handed back.
    Full(T),
    /// The link was retired by a swap, the value is handed back.
    Sealed(T),
}

/// Inner state of a link instance, holding the ring buffer.
pub struct LinkInstanceInner<T: LinkPortMessage> {
    producer: Mutex<Producer<T>>,
    consumer: Mutex<Consumer<T>>,
    /// Items pushed but not yet popped. Incremented before the ring push and
    /// decremented after the ring pop, so zero means empty with no push in flight.
    pending: AtomicUsize,
    sealed: AtomicBool,
    drain_lock: Mutex<()>,
    drained: Condvar,
    capacity: usize,
    link_id: LinkId,
}

impl<T: LinkPortMessage> LinkInstanceInner<T> {
    fn new(link_id: LinkId, capacity: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(capacity);
        Self {
            producer: Mutex::new(producer),
            consumer: Mutex::new(consumer),
            pending: AtomicUsize::new(0),
            sealed: AtomicBool::new(false),
            drain_lock: Mutex::new(()),
            drained: Condvar::new(),
            capacity,
            link_id,
        }
    }

    /// Push a value into the ring buffer.
    pub fn push(&self, value: T) -> LinkPush<T> {
        let mut producer = self.producer.lock();
        if self.sealed.load(Ordering::Acquire) {
            return LinkPush::Sealed(value);
        }
        self.pending.fetch_add(1, Ordering::AcqRel);
        match producer.push(value) {
            Ok(()) => LinkPush::Pushed,
            Err(rtrb::PushError::Full(value)) => {
                self.release_slot();
                tracing::trace!("LinkInstance {}: buffer full", self.link_id);
                LinkPush::Full(value)
            }
        }
    }

    /// Pop the next value in FIFO order.
    pub fn pop(&self) -> Option<T> {
        let mut consumer = self.consumer.lock();
        let value = consumer.pop().ok()?;
        self.release_slot();
        Some(value)
    }

    fn release_slot(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _guard = self.drain_lock.lock();
            self.drained.notify_all();
        }
    }

    /// Refuse all further pushes.
    ///
    /// Taking the producer lock waits out a push that is already in progress, so
    /// once this returns `len()` can only go down.
    pub fn seal(&self) {
        let _producer = self.producer.lock();
        self.sealed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Block until the link holds no items.
    ///
    /// `None` waits without bound. Returns `false` if `timeout` expired first.
    pub fn wait_drained(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut guard = self.drain_lock.lock();
        while self.len() > 0 {
            match deadline {
                None => self.drained.wait(&mut guard),
                Some(deadline) => {
                    if self.drained.wait_until(&mut guard, deadline).timed_out() {
                        return self.len() == 0;
                    }
                }
            }
        }
        true
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.len() > 0
    }

    #[inline]
    pub fn link_id(&self) -> &LinkId {
        &self.link_id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Runtime instance of a link.
///
/// This is the owning handle. It is deliberately not `Clone`: exactly one owner
/// exists at a time, and dropping it destroys the ring buffer.
pub struct LinkInstance<T: LinkPortMessage> {
    inner: Arc<LinkInstanceInner<T>>,
}

impl<T: LinkPortMessage> LinkInstance<T> {
    /// Create a new LinkInstance with the given capacity.
    pub fn new(link_id: LinkId, capacity: usize) -> Self {
        Self {
            inner: Arc::new(LinkInstanceInner::new(link_id, capacity.max(1))),
        }
    }

    /// Create a data writer for producers outside the port model.
    pub fn writer(&self) -> LinkOutputDataWriter<T> {
        LinkOutputDataWriter::new(Arc::downgrade(&self.inner))
    }

    /// Create a data reader for consumers outside the port model, such as a
    /// network-backed sink.
    pub fn reader(&self) -> LinkInputDataReader<T> {
        LinkInputDataReader::new(Arc::downgrade(&self.inner))
    }

    pub(crate) fn inner(&self) -> &Arc<LinkInstanceInner<T>> {
        &self.inner
    }

    #[inline]
    pub fn link_id(&self) -> &LinkId {
        self.inner.link_id()
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.inner.has_data()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.inner.is_sealed()
    }
}

impl<T: LinkPortMessage> std::fmt::Debug for LinkInstance<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkInstance")
            .field("link_id", self.link_id())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

// ============================================================================
// Type-erased storage for LinkInstance
// ============================================================================

/// Type-erased LinkInstance for storage in the allocator registry.
pub trait AnyLinkInstance: Send + Sync {
    fn link_id(&self) -> &LinkId;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn capacity(&self) -> usize;
    fn is_sealed(&self) -> bool;
    fn seal(&self);
    fn wait_drained(&self, timeout: Option<Duration>) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: LinkPortMessage> AnyLinkInstance for LinkInstance<T> {
    fn link_id(&self) -> &LinkId {
        self.inner.link_id()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn is_sealed(&self) -> bool {
        self.inner.is_sealed()
    }

    fn seal(&self) {
        self.inner.seal()
    }

    fn wait_drained(&self, timeout: Option<Duration>) -> bool {
        self.inner.wait_drained(timeout)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Boxed type-erased LinkInstance.
pub type BoxedLinkInstance = Box<dyn AnyLinkInstance>;
