// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! LinkAllocator - binds links to ports and hot-swaps live links.
//!
//! The allocator is the single owner of every live [`LinkInstance`]. Ports hold
//! `Weak` references only, so the registry is the one place a link can be
//! destroyed from. Ownership leaves the registry in exactly two ways:
//!
//! - a point-to-point swap hands the drained old link back to the caller as a
//!   [`RetiredLink`], and the caller decides when to drop it;
//! - [`LinkAllocator::teardown`] drops everything still registered.
//!
//! All mutating calls take `&mut self`, so the control plane is serialized by
//! the borrow checker. Worker threads only ever touch ports and the
//! [`ReadinessGate`].

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::graph::LinkId;
use super::runtime::{
    AnyLinkInstance, BoxedLinkInstance, LinkInput, LinkInstance, LinkOutput, LinkPort,
};
use super::traits::LinkPortMessage;
use crate::core::config::AllocatorConfig;
use crate::core::exit_signal::ExitSignal;
use crate::core::observability::{AllocatorSnapshot, LinkSnapshot};
use crate::core::readiness::ReadinessGate;
use crate::core::topology::{ProcessorId, TopologyView};
use crate::core::{Result, StreamError};

/// A drained link removed from the registry by a point-to-point swap.
///
/// The destination processor may still hold an iteration over it, so the
/// allocator does not destroy it. Dropping this value destroys the link.
#[derive(Debug)]
pub struct RetiredLink<T: LinkPortMessage> {
    link: LinkInstance<T>,
}

impl<T: LinkPortMessage> RetiredLink<T> {
    pub fn into_inner(self) -> LinkInstance<T> {
        self.link
    }
}

impl<T: LinkPortMessage> Deref for RetiredLink<T> {
    type Target = LinkInstance<T>;

    fn deref(&self) -> &Self::Target {
        &self.link
    }
}

/// How a completed swap disposed of the old link.
#[derive(Debug)]
pub enum SwapOutcome<T: LinkPortMessage> {
    /// Point-to-point edge: the old link is handed to the caller.
    HandedOff(RetiredLink<T>),
    /// Sink-only edge: the old link was drained and destroyed.
    Destroyed(LinkId),
}

impl<T: LinkPortMessage> SwapOutcome<T> {
    /// Id of the link that was replaced.
    pub fn old_link_id(&self) -> &LinkId {
        match self {
            Self::HandedOff(retired) => retired.link_id(),
            Self::Destroyed(id) => id,
        }
    }
}

/// How often a drain wait re-checks the exit signal.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A swap whose drain wait timed out or was cancelled, keyed by its
/// replacement link id.
#[derive(Debug, Clone)]
struct StalledSwap {
    retiring: LinkId,
    has_destination: bool,
}

enum DrainWait {
    Drained,
    TimedOut,
    Cancelled,
}

fn ensure_unbound<T: LinkPortMessage>(port: &LinkPort<T>) -> Result<()> {
    if port.is_bound() {
        return Err(StreamError::DoubleInitialize {
            side: port.direction().side(),
            port: port.name().to_string(),
        });
    }
    Ok(())
}

fn not_wired<T: LinkPortMessage>(port: &LinkPort<T>) -> StreamError {
    StreamError::LinkNotWired {
        side: port.direction().side(),
        port: port.name().to_string(),
    }
}

/// Owns every live link and performs initial binding, hot swap and teardown.
pub struct LinkAllocator {
    config: AllocatorConfig,
    source_processors: Vec<ProcessorId>,
    processors: Vec<ProcessorId>,
    /// Registry of live links.
    links: HashMap<LinkId, BoxedLinkInstance>,
    stalled_swaps: HashMap<LinkId, StalledSwap>,
    readiness: Arc<ReadinessGate>,
    exit: Arc<ExitSignal>,
}

impl LinkAllocator {
    pub fn new(topology: &impl TopologyView, config: AllocatorConfig) -> Self {
        let source_processors = topology.source_processors();
        let processors = topology.processors();

        tracing::debug!(
            "Link allocator sized for {} processors ({} sources)",
            processors.len(),
            source_processors.len()
        );

        Self {
            config,
            links: HashMap::with_capacity(processors.len()),
            source_processors,
            processors,
            stalled_swaps: HashMap::new(),
            readiness: Arc::new(ReadinessGate::new()),
            exit: Arc::new(ExitSignal::new()),
        }
    }

    /// Use an exit flag owned by the runtime instead of a private one.
    pub fn with_exit_signal(mut self, exit: Arc<ExitSignal>) -> Self {
        self.exit = exit;
        self
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn source_processors(&self) -> &[ProcessorId] {
        &self.source_processors
    }

    pub fn processors(&self) -> &[ProcessorId] {
        &self.processors
    }

    /// Fresh link sized by [`AllocatorConfig::default_capacity`].
    pub fn new_link<T: LinkPortMessage>(&self, link_id: LinkId) -> LinkInstance<T> {
        LinkInstance::new(link_id, self.config.default_capacity)
    }

    // ------------------------------------------------------------------------
    // Initial binding
    // ------------------------------------------------------------------------

    /// Bind a fresh link to one or two ports and register it.
    ///
    /// # Errors
    /// - [`StreamError::DoubleInitialize`] if either supplied port is already
    ///   bound. Nothing is mutated in that case.
    /// - [`StreamError::LinkAlreadyExists`] if a link with the same id is registered.
    pub fn bind<T: LinkPortMessage>(
        &mut self,
        source: Option<&LinkOutput<T>>,
        destination: Option<&LinkInput<T>>,
        link: LinkInstance<T>,
    ) -> Result<()> {
        if let Some(source) = source {
            ensure_unbound(source)?;
        }
        if let Some(destination) = destination {
            ensure_unbound(destination)?;
        }
        if self.links.contains_key(link.link_id()) {
            return Err(StreamError::LinkAlreadyExists(link.link_id().to_string()));
        }

        if let Some(source) = source {
            source.bind_to(&link);
        }
        if let Some(destination) = destination {
            destination.bind_to(&link);
        }

        tracing::info!(
            "Bound link {} ({} → {})",
            link.link_id(),
            source.map(|p| p.name()).unwrap_or("-"),
            destination.map(|p| p.name()).unwrap_or("-")
        );

        self.links.insert(link.link_id().clone(), Box::new(link));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Hot swap
    // ------------------------------------------------------------------------

    /// Replace the live link on an edge while its producer and consumer keep
    /// running.
    ///
    /// With a `destination`, the old link is the one the destination reads from.
    /// The source is repointed at `new_link` first, the old link is sealed so
    /// no late write can land in it, and once the consumer has drained it the
    /// destination is repointed too. The drained old link is handed back in
    /// [`SwapOutcome::HandedOff`].
    ///
    /// Without a `destination` (the far end is outside this process), the old
    /// link is the one the source writes to. It is sealed, drained by its
    /// external reader, then destroyed: [`SwapOutcome::Destroyed`].
    ///
    /// Blocks until the old link drains, bounded by
    /// [`AllocatorConfig::drain_timeout_ms`] when set.
    ///
    /// # Errors
    /// - [`StreamError::LinkNotWired`] if the port holding the old link is unbound.
    /// - [`StreamError::LinkAlreadyExists`] if `new_link`'s id is already registered.
    /// - [`StreamError::SwapStalled`] if an earlier swap on this edge stalled
    ///   and has not been resumed.
    /// - [`StreamError::ExitRequested`] if the exit signal is raised, before
    ///   anything is touched.
    /// - [`StreamError::DrainTimeout`] if the drain wait timed out. The edge is
    ///   left split (source on the new link, destination still on the old one,
    ///   both registered); call [`resume_swap`](Self::resume_swap) to finish it.
    ///   An exit request during the wait leaves the same state and returns
    ///   [`StreamError::ExitRequested`].
    pub fn swap<T: LinkPortMessage>(
        &mut self,
        source: &LinkOutput<T>,
        destination: Option<&LinkInput<T>>,
        new_link: LinkInstance<T>,
    ) -> Result<SwapOutcome<T>> {
        if self.exit.is_requested() {
            return Err(StreamError::ExitRequested(format!(
                "swap on {} refused",
                source.name()
            )));
        }
        if let Some(current) = source.link_id() {
            if let Some(stalled) = self.stalled_swaps.get(&current) {
                return Err(StreamError::SwapStalled {
                    pending: current.to_string(),
                    retiring: stalled.retiring.to_string(),
                });
            }
        }

        let old_id = match destination {
            Some(destination) => {
                if !source.is_bound() {
                    return Err(not_wired(source));
                }
                destination.link_id().ok_or_else(|| not_wired(destination))?
            }
            None => source.link_id().ok_or_else(|| not_wired(source))?,
        };
        let new_id = new_link.link_id().clone();

        if let Some((pending, _)) = self
            .stalled_swaps
            .iter()
            .find(|(_, stalled)| stalled.retiring == old_id)
        {
            return Err(StreamError::SwapStalled {
                pending: pending.to_string(),
                retiring: old_id.to_string(),
            });
        }
        if self.links.contains_key(&new_id) {
            return Err(StreamError::LinkAlreadyExists(new_id.to_string()));
        }
        self.typed::<T>(&old_id)?;

        if let Some(source_link) = source.link_id() {
            if source_link != old_id {
                tracing::warn!(
                    "Swap on {}: source is on {} but destination reads {}",
                    source.name(),
                    source_link,
                    old_id
                );
            }
        }

        tracing::info!(
            "Swapping link {} → {} on {}",
            old_id,
            new_id,
            source.name()
        );

        source.bind_to(&new_link);
        self.links.insert(new_id.clone(), Box::new(new_link));

        if let Some(old) = self.links.get(&old_id) {
            old.seal();
        }

        self.finish_swap(destination, old_id, new_id)
    }

    /// Finish a swap whose drain wait previously timed out or was cancelled.
    ///
    /// `source` must still be bound to the replacement link passed to
    /// [`swap`](Self::swap). `destination` must be the same port that was
    /// passed to it: `None` for a sink-only edge, otherwise the input still
    /// reading the old link.
    ///
    /// # Errors
    /// - [`StreamError::LinkNotFound`] if no swap onto the source's link stalled.
    /// - [`StreamError::ResumeMismatch`] if `destination` does not match the
    ///   stalled edge. The stall record is kept.
    pub fn resume_swap<T: LinkPortMessage>(
        &mut self,
        source: &LinkOutput<T>,
        destination: Option<&LinkInput<T>>,
    ) -> Result<SwapOutcome<T>> {
        let new_id = source.link_id().ok_or_else(|| not_wired(source))?;
        let StalledSwap {
            retiring: old_id,
            has_destination,
        } = self.stalled_swaps.get(&new_id).cloned().ok_or_else(|| {
            StreamError::LinkNotFound(format!("no stalled swap onto {}", new_id))
        })?;

        let mismatch = match (has_destination, destination) {
            (true, None) => Some(format!(
                "point-to-point edge needs the destination still reading {}",
                old_id
            )),
            (false, Some(destination)) => Some(format!(
                "sink-only edge has no destination, got {}",
                destination.name()
            )),
            (true, Some(destination)) if destination.link_id().as_ref() != Some(&old_id) => {
                Some(format!("{} is not bound to {}", destination.name(), old_id))
            }
            _ => None,
        };
        if let Some(reason) = mismatch {
            return Err(StreamError::ResumeMismatch {
                link: new_id.to_string(),
                reason,
            });
        }

        self.stalled_swaps.remove(&new_id);
        tracing::info!("Resuming swap {} → {}", old_id, new_id);
        self.finish_swap(destination, old_id, new_id)
    }

    /// Wait for `old` to drain in slices so an exit request is noticed.
    fn wait_for_drain(&self, old: &dyn AnyLinkInstance) -> DrainWait {
        let deadline = self.config.drain_timeout().map(|t| Instant::now() + t);
        loop {
            let slice = match deadline {
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .min(EXIT_POLL_INTERVAL),
                None => EXIT_POLL_INTERVAL,
            };
            if old.wait_drained(Some(slice)) {
                return DrainWait::Drained;
            }
            if self.exit.is_requested() {
                return DrainWait::Cancelled;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return DrainWait::TimedOut;
            }
        }
    }

    fn finish_swap<T: LinkPortMessage>(
        &mut self,
        destination: Option<&LinkInput<T>>,
        old_id: LinkId,
        new_id: LinkId,
    ) -> Result<SwapOutcome<T>> {
        let old = self
            .links
            .get(&old_id)
            .ok_or_else(|| StreamError::LinkNotFound(old_id.to_string()))?;

        tracing::debug!("Waiting for link {} to drain ({} queued)", old_id, old.len());
        let waited = self.wait_for_drain(&**old);
        if !matches!(waited, DrainWait::Drained) {
            let queued = old.len();
            tracing::warn!(
                "Link {} still has {} queued, swap to {} stalled",
                old_id,
                queued,
                new_id
            );
            self.stalled_swaps.insert(
                new_id.clone(),
                StalledSwap {
                    retiring: old_id.clone(),
                    has_destination: destination.is_some(),
                },
            );
            return Err(match waited {
                DrainWait::Cancelled => StreamError::ExitRequested(format!(
                    "link {} still has {} queued, swap to {} stalled",
                    old_id, queued, new_id
                )),
                _ => StreamError::DrainTimeout {
                    link: old_id.to_string(),
                    queued,
                },
            });
        }

        if let Some(destination) = destination {
            destination.bind_to(self.typed::<T>(&new_id)?);
        }

        let old = self
            .links
            .remove(&old_id)
            .ok_or_else(|| StreamError::LinkNotFound(old_id.to_string()))?;

        match destination {
            Some(_) => {
                let link = old.into_any().downcast::<LinkInstance<T>>().map_err(|_| {
                    StreamError::Other(anyhow::anyhow!(
                        "link {} does not carry {}",
                        old_id,
                        std::any::type_name::<T>()
                    ))
                })?;
                tracing::info!("Swap complete: {} → {}, old link handed off", old_id, new_id);
                Ok(SwapOutcome::HandedOff(RetiredLink { link: *link }))
            }
            None => {
                drop(old);
                tracing::info!("Swap complete: {} → {}, old link destroyed", old_id, new_id);
                Ok(SwapOutcome::Destroyed(old_id))
            }
        }
    }

    fn typed<T: LinkPortMessage>(&self, id: &LinkId) -> Result<&LinkInstance<T>> {
        self.links
            .get(id)
            .and_then(|link| link.as_any().downcast_ref::<LinkInstance<T>>())
            .ok_or_else(|| StreamError::LinkNotFound(id.to_string()))
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Destroy every registered link. Returns how many were released.
    ///
    /// Links already handed off by a point-to-point swap are not touched. Meant
    /// to run after all processor threads have stopped.
    pub fn teardown(&mut self) -> usize {
        self.stalled_swaps.clear();
        let released = self.links.len();
        for (id, link) in self.links.drain() {
            tracing::trace!("Releasing link {} ({} queued)", id, link.len());
        }
        if released > 0 {
            tracing::info!("Released {} links", released);
        }
        released
    }

    // ------------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------------

    /// Shared handle to the readiness gate, for threads that must not start
    /// processing before initial wiring is done.
    pub fn readiness(&self) -> Arc<ReadinessGate> {
        Arc::clone(&self.readiness)
    }

    pub fn mark_ready(&self) -> bool {
        let first = self.readiness.mark_ready();
        if first {
            tracing::info!("Link wiring ready ({} links)", self.links.len());
        }
        first
    }

    pub fn wait_until_ready(&self) {
        self.readiness.wait_until_ready()
    }

    // ------------------------------------------------------------------------
    // Exit
    // ------------------------------------------------------------------------

    pub fn exit_signal(&self) -> Arc<ExitSignal> {
        Arc::clone(&self.exit)
    }

    /// Refuse further swaps and cancel any drain wait in progress.
    pub fn request_exit(&self) -> bool {
        self.exit.request()
    }

    // ------------------------------------------------------------------------
    // Monitoring
    // ------------------------------------------------------------------------

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_registered(&self, id: &LinkId) -> bool {
        self.links.contains_key(id)
    }

    /// All registered link ids, sorted.
    pub fn all_links(&self) -> Vec<LinkId> {
        let mut ids: Vec<LinkId> = self.links.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Per-link queue depth, sorted by link id.
    pub fn link_snapshots(&self) -> Vec<LinkSnapshot> {
        let mut snapshots: Vec<LinkSnapshot> = self
            .links
            .values()
            .map(|link| LinkSnapshot {
                id: link.link_id().clone(),
                queue_depth: link.len(),
                capacity: link.capacity(),
                sealed: link.is_sealed(),
            })
            .collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    pub fn snapshot(&self) -> AllocatorSnapshot {
        AllocatorSnapshot {
            ready: self.readiness.is_ready(),
            links: self.link_snapshots(),
            stalled_swaps: self.stalled_swaps.len(),
        }
    }
}

impl Drop for LinkAllocator {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PortSide;
    use crate::core::links::graph::link_id::__private::new_unchecked;
    use crate::core::topology::StaticTopology;

    fn allocator() -> LinkAllocator {
        let topology = StaticTopology::new(["camera"], ["camera", "display"]);
        LinkAllocator::new(&topology, AllocatorConfig::default())
    }

    fn link(id: &str) -> LinkInstance<u32> {
        LinkInstance::new(new_unchecked(id), 8)
    }

    #[test]
    fn test_new_captures_topology() {
        let alloc = allocator();
        assert_eq!(alloc.source_processors(), &[ProcessorId::from("camera")]);
        assert_eq!(alloc.processors().len(), 2);
        assert_eq!(alloc.link_count(), 0);
    }

    #[test]
    fn test_bind_point_to_point() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        let c1 = link("c1");
        let reader = c1.reader();

        alloc.bind(Some(&output), Some(&input), c1).unwrap();

        assert_eq!(alloc.all_links(), vec![new_unchecked("c1")]);
        assert_eq!(output.link_id(), Some(new_unchecked("c1")));
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));
        assert!(reader.is_connected());
    }

    #[test]
    fn test_bind_rejects_bound_source_without_mutation() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), None, link("c1")).unwrap();

        let err = alloc
            .bind(Some(&output), Some(&input), link("c2"))
            .unwrap_err();

        match err {
            StreamError::DoubleInitialize { side, port } => {
                assert_eq!(side, PortSide::Source);
                assert_eq!(port, "camera.out");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(output.link_id(), Some(new_unchecked("c1")));
        assert!(!input.is_bound());
        assert_eq!(alloc.link_count(), 1);
    }

    #[test]
    fn test_bind_rejects_bound_destination() {
        let mut alloc = allocator();
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(None, Some(&input), link("c1")).unwrap();

        let err = alloc.bind(None, Some(&input), link("c2")).unwrap_err();
        assert!(matches!(
            err,
            StreamError::DoubleInitialize {
                side: PortSide::Destination,
                ..
            }
        ));
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));
    }

    #[test]
    fn test_bind_without_ports_registers_link() {
        let mut alloc = allocator();
        alloc.bind::<u32>(None, None, link("orphan")).unwrap();
        assert!(alloc.is_registered(&new_unchecked("orphan")));
    }

    #[test]
    fn test_bind_rejects_duplicate_id() {
        let mut alloc = allocator();
        alloc.bind::<u32>(None, None, link("dup")).unwrap();
        let err = alloc.bind::<u32>(None, None, link("dup")).unwrap_err();
        assert!(matches!(err, StreamError::LinkAlreadyExists(_)));
    }

    #[test]
    fn test_swap_unbound_source_fails() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let err = alloc.swap(&output, None, link("c2")).unwrap_err();
        assert!(matches!(
            err,
            StreamError::LinkNotWired {
                side: PortSide::Source,
                ..
            }
        ));
        assert_eq!(alloc.link_count(), 0);
    }

    #[test]
    fn test_swap_point_to_point_when_already_empty() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();

        let outcome = alloc.swap(&output, Some(&input), link("c2")).unwrap();

        let SwapOutcome::HandedOff(retired) = outcome else {
            panic!("point-to-point swap must hand off the old link");
        };
        assert_eq!(retired.link_id(), &new_unchecked("c1"));
        assert!(retired.is_sealed());
        let c1 = retired.into_inner();
        assert!(c1.is_empty());
        assert_eq!(alloc.all_links(), vec![new_unchecked("c2")]);
        assert_eq!(output.link_id(), Some(new_unchecked("c2")));
        assert_eq!(input.link_id(), Some(new_unchecked("c2")));
    }

    #[test]
    fn test_swap_sink_only_destroys_old_link() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let c1 = link("c1");
        let reader = c1.reader();
        alloc.bind(Some(&output), None, c1).unwrap();

        let outcome = alloc.swap(&output, None, link("c2")).unwrap();

        assert!(matches!(outcome, SwapOutcome::Destroyed(ref id) if id.as_str() == "c1"));
        assert!(!reader.is_connected());
        assert_eq!(alloc.all_links(), vec![new_unchecked("c2")]);
    }

    #[test]
    fn test_swap_timeout_then_resume() {
        let topology = StaticTopology::default();
        let config = AllocatorConfig {
            drain_timeout_ms: Some(10),
            ..AllocatorConfig::default()
        };
        let mut alloc = LinkAllocator::new(&topology, config);
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();
        assert!(output.write(1));

        let err = alloc.swap(&output, Some(&input), link("c2")).unwrap_err();
        assert!(matches!(err, StreamError::DrainTimeout { queued: 1, .. }));

        // Split but consistent: both registered, each port on its own link.
        assert_eq!(alloc.link_count(), 2);
        assert_eq!(output.link_id(), Some(new_unchecked("c2")));
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));
        assert_eq!(alloc.snapshot().stalled_swaps, 1);

        assert_eq!(input.read(), Some(1));
        let outcome = alloc.resume_swap(&output, Some(&input)).unwrap();
        assert_eq!(outcome.old_link_id(), &new_unchecked("c1"));
        assert_eq!(input.link_id(), Some(new_unchecked("c2")));
        assert_eq!(alloc.snapshot().stalled_swaps, 0);
    }

    fn stalling_allocator() -> LinkAllocator {
        let config = AllocatorConfig {
            drain_timeout_ms: Some(10),
            ..AllocatorConfig::default()
        };
        LinkAllocator::new(&StaticTopology::default(), config)
    }

    #[test]
    fn test_swap_refused_while_stalled() {
        let mut alloc = stalling_allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();
        assert!(output.write(1));

        let err = alloc.swap(&output, Some(&input), link("c2")).unwrap_err();
        assert!(matches!(err, StreamError::DrainTimeout { .. }));
        // Lands in c2 while the destination still reads c1.
        assert!(output.write(2));
        assert_eq!(input.read(), Some(1));

        let err = alloc.swap(&output, Some(&input), link("c3")).unwrap_err();
        match err {
            StreamError::SwapStalled { pending, retiring } => {
                assert_eq!(pending, "c2");
                assert_eq!(retiring, "c1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(alloc.all_links(), vec![new_unchecked("c1"), new_unchecked("c2")]);
        assert_eq!(output.link_id(), Some(new_unchecked("c2")));
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));

        alloc.resume_swap(&output, Some(&input)).unwrap();
        assert_eq!(input.read(), Some(2));

        alloc.swap(&output, Some(&input), link("c3")).unwrap();
        assert!(output.write(3));
        assert_eq!(input.read(), Some(3));
        assert_eq!(alloc.all_links(), vec![new_unchecked("c3")]);
        assert_eq!(alloc.snapshot().stalled_swaps, 0);
    }

    #[test]
    fn test_swap_refused_when_destination_link_is_retiring() {
        let mut alloc = stalling_allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();
        output.write(1);
        alloc.swap(&output, Some(&input), link("c2")).unwrap_err();

        // A second source wired onto the same destination.
        let other = LinkOutput::<u32>::new("mic.out");
        alloc.bind(Some(&other), None, link("m1")).unwrap();
        let err = alloc.swap(&other, Some(&input), link("m2")).unwrap_err();
        assert!(matches!(err, StreamError::SwapStalled { ref retiring, .. } if retiring == "c1"));
        assert!(!alloc.is_registered(&new_unchecked("m2")));
    }

    #[test]
    fn test_resume_point_to_point_without_destination_rejected() {
        let mut alloc = stalling_allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();
        output.write(1);
        alloc.swap(&output, Some(&input), link("c2")).unwrap_err();
        assert_eq!(input.read(), Some(1));

        let err = alloc.resume_swap(&output, None).unwrap_err();
        assert!(matches!(err, StreamError::ResumeMismatch { ref link, .. } if link == "c2"));
        // Nothing destroyed, the destination keeps its binding.
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));
        assert_eq!(alloc.link_count(), 2);
        assert_eq!(alloc.snapshot().stalled_swaps, 1);

        alloc.resume_swap(&output, Some(&input)).unwrap();
        assert!(output.write(2));
        assert_eq!(input.read(), Some(2));
    }

    #[test]
    fn test_resume_rejects_destination_on_other_link() {
        let mut alloc = stalling_allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        let stranger = LinkInput::<u32>::new("mixer.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();
        alloc.bind(None, Some(&stranger), link("x1")).unwrap();
        output.write(1);
        alloc.swap(&output, Some(&input), link("c2")).unwrap_err();
        input.read();

        let err = alloc.resume_swap(&output, Some(&stranger)).unwrap_err();
        assert!(matches!(err, StreamError::ResumeMismatch { .. }));
        assert_eq!(stranger.link_id(), Some(new_unchecked("x1")));
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));
    }

    #[test]
    fn test_resume_sink_only_with_destination_rejected() {
        let mut alloc = stalling_allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let c1 = link("c1");
        let reader = c1.reader();
        alloc.bind(Some(&output), None, c1).unwrap();
        output.write(1);
        alloc.swap(&output, None, link("c2")).unwrap_err();

        let input = LinkInput::<u32>::new("display.in");
        let err = alloc.resume_swap(&output, Some(&input)).unwrap_err();
        assert!(matches!(err, StreamError::ResumeMismatch { .. }));
        assert!(!input.is_bound());

        assert_eq!(reader.read(), Some(1));
        let outcome = alloc.resume_swap(&output, None).unwrap();
        assert!(matches!(outcome, SwapOutcome::Destroyed(ref id) if id.as_str() == "c1"));
        assert!(!reader.is_connected());
    }

    #[test]
    fn test_exit_request_cancels_unbounded_drain() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        let input = LinkInput::<u32>::new("display.in");
        alloc.bind(Some(&output), Some(&input), link("c1")).unwrap();
        output.write(1);

        let exit = alloc.exit_signal();
        let requester = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            exit.request()
        });

        let err = alloc.swap(&output, Some(&input), link("c2")).unwrap_err();
        assert!(requester.join().unwrap());
        assert!(matches!(err, StreamError::ExitRequested(_)));
        assert_eq!(output.link_id(), Some(new_unchecked("c2")));
        assert_eq!(input.link_id(), Some(new_unchecked("c1")));
        assert_eq!(alloc.snapshot().stalled_swaps, 1);

        // No new swaps once exit is requested.
        let err = alloc.swap(&output, Some(&input), link("c3")).unwrap_err();
        assert!(matches!(err, StreamError::ExitRequested(_)));
        assert!(!alloc.is_registered(&new_unchecked("c3")));
    }

    #[test]
    fn test_shared_exit_signal() {
        let exit = Arc::new(ExitSignal::new());
        let alloc = allocator().with_exit_signal(Arc::clone(&exit));
        assert!(alloc.request_exit());
        assert!(exit.is_requested());
    }

    #[test]
    fn test_new_link_uses_configured_capacity() {
        let config = AllocatorConfig {
            default_capacity: 3,
            ..AllocatorConfig::default()
        };
        let alloc = LinkAllocator::new(&StaticTopology::default(), config);
        let link = alloc.new_link::<u32>(new_unchecked("sized"));
        assert_eq!(link.capacity(), 3);
    }

    #[test]
    fn test_resume_without_stall_fails() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        alloc.bind(Some(&output), None, link("c1")).unwrap();
        let err = alloc.resume_swap(&output, None).unwrap_err();
        assert!(matches!(err, StreamError::LinkNotFound(_)));
    }

    #[test]
    fn test_teardown_releases_once() {
        let mut alloc = allocator();
        let a = link("a");
        let b = link("b");
        let (ra, rb) = (a.reader(), b.reader());
        alloc.bind::<u32>(None, None, a).unwrap();
        alloc.bind::<u32>(None, None, b).unwrap();

        assert_eq!(alloc.teardown(), 2);
        assert!(!ra.is_connected());
        assert!(!rb.is_connected());
        assert_eq!(alloc.teardown(), 0);
    }

    #[test]
    fn test_snapshot_reports_queue_depth() {
        let mut alloc = allocator();
        let output = LinkOutput::<u32>::new("camera.out");
        alloc.bind(Some(&output), None, link("c1")).unwrap();
        output.write(1);
        output.write(2);

        let snapshot = alloc.snapshot();
        assert!(!snapshot.ready);
        assert_eq!(snapshot.queued(), 2);
        assert_eq!(
            snapshot.links,
            vec![LinkSnapshot {
                id: new_unchecked("c1"),
                queue_depth: 2,
                capacity: 8,
                sealed: false,
            }]
        );
    }

    #[test]
    fn test_mark_ready_once() {
        let alloc = allocator();
        let gate = alloc.readiness();
        assert!(!gate.is_ready());
        assert!(alloc.mark_ready());
        assert!(!alloc.mark_ready());
        alloc.wait_until_ready();
        assert!(gate.is_ready());
    }
}
