//! The discrete-event engine.
//!
//! A [`Simulator`] owns the simulated world `W`, the simulated clock and the
//! queue of pending events. Every event is a handler closure receiving the
//! [`Simulator`] itself so that it can read or mutate the world and schedule
//! further events.
//!
//! Events are executed strictly in non-decreasing simulated time. Events
//! scheduled for the same instant are executed in the order they were
//! scheduled.
//!
//! ```
//! use manet_core::{scheduler::Simulator, time::SimTime};
//! use std::time::Duration;
//!
//! let mut sim = Simulator::new(Vec::<SimTime>::new());
//! sim.schedule_in(Duration::from_secs(1), |sim| {
//!     let now = sim.now();
//!     sim.world_mut().push(now);
//!     Ok(())
//! });
//! sim.stop_at(SimTime::from_secs(10));
//! sim.run().unwrap();
//!
//! assert_eq!(sim.world(), &[SimTime::from_secs(1)]);
//! ```

use crate::time::SimTime;
use core::cmp::Reverse;
use std::{
    collections::{BinaryHeap, HashSet},
    fmt,
    time::Duration,
};
use thiserror::Error;

/// An event handler.
///
/// Handlers are called once, at the simulated time they were scheduled for.
/// Returning an error aborts [`Simulator::run`].
pub type Handler<W> = Box<dyn FnOnce(&mut Simulator<W>) -> anyhow::Result<()>>;

/// Identifier of a scheduled event, used to [cancel](Simulator::cancel) it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot schedule an event at {time}s: the simulation is already at {now}s")]
    InThePast { now: SimTime, time: SimTime },
    #[error("event handler failed at {time}s")]
    Handler {
        time: SimTime,
        #[source]
        source: anyhow::Error,
    },
}

/// Key used to order the events in the queue.
///
/// Events are ordered by:
/// 1. Time (earlier first)
/// 2. Sequence number (FIFO for the same time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    time: SimTime,
    sequence: u64,
}

struct Scheduled<W> {
    key: EventKey,
    handler: Handler<W>,
}

impl<W> PartialEq for Scheduled<W> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<W> Eq for Scheduled<W> {}

impl<W> PartialOrd for Scheduled<W> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<W> Ord for Scheduled<W> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

pub struct Simulator<W> {
    world: W,

    now: SimTime,

    /// the sequence number of the next scheduled event, also used as
    /// the event identifier
    next_sequence: u64,

    queue: BinaryHeap<Reverse<Scheduled<W>>>,

    /// events cancelled but still present in the queue
    cancelled: HashSet<EventId>,

    /// events scheduled strictly after this instant are never executed
    horizon: Option<SimTime>,

    executed: u64,
}

impl<W> Simulator<W> {
    /// Create a new simulator at [`SimTime::ZERO`] with an empty event queue.
    pub fn new(world: W) -> Self {
        Self {
            world,
            now: SimTime::ZERO,
            next_sequence: 0,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            horizon: None,
            executed: 0,
        }
    }

    /// The current simulated time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[inline]
    pub fn world(&self) -> &W {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Number of events still waiting in the queue (cancelled events
    /// excluded).
    pub fn pending(&self) -> usize {
        self.queue.len() - self.cancelled.len()
    }

    /// Number of handlers executed so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn horizon(&self) -> Option<SimTime> {
        self.horizon
    }

    /// Stop the simulation at `horizon`.
    ///
    /// Events scheduled exactly at the horizon are still executed. Events
    /// scheduled after the horizon remain in the queue and are discarded
    /// when the [`Simulator`] is dropped.
    pub fn stop_at(&mut self, horizon: SimTime) {
        self.horizon = Some(horizon);
    }

    /// Schedule `handler` to run at `time`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InThePast`] if `time` is before [`Simulator::now`].
    pub fn schedule_at<F>(&mut self, time: SimTime, handler: F) -> Result<EventId, EngineError>
    where
        F: FnOnce(&mut Simulator<W>) -> anyhow::Result<()> + 'static,
    {
        if time < self.now {
            return Err(EngineError::InThePast {
                now: self.now,
                time,
            });
        }

        Ok(self.push(time, Box::new(handler)))
    }

    /// Schedule `handler` to run `delay` after the current simulated time.
    pub fn schedule_in<F>(&mut self, delay: Duration, handler: F) -> EventId
    where
        F: FnOnce(&mut Simulator<W>) -> anyhow::Result<()> + 'static,
    {
        let time = self.now + delay;
        self.push(time, Box::new(handler))
    }

    /// Schedule `handler` at the current simulated time, after every
    /// event already scheduled for this instant.
    pub fn schedule_now<F>(&mut self, handler: F) -> EventId
    where
        F: FnOnce(&mut Simulator<W>) -> anyhow::Result<()> + 'static,
    {
        self.schedule_in(Duration::ZERO, handler)
    }

    /// Cancel a pending event. Cancelling an event that already ran, or
    /// that was already cancelled, has no effect.
    pub fn cancel(&mut self, id: EventId) {
        let EventId(sequence) = id;
        let still_queued = self
            .queue
            .iter()
            .any(|Reverse(event)| event.key.sequence == sequence);
        if still_queued {
            self.cancelled.insert(id);
        }
    }

    /// Execute the events in order until the queue is empty or the next
    /// event is beyond the horizon.
    ///
    /// When a horizon is set the clock is left at the horizon.
    ///
    /// # Errors
    ///
    /// [`EngineError::Handler`] as soon as one handler fails. The failing
    /// event is consumed, the remaining events stay in the queue.
    pub fn run(&mut self) -> Result<(), EngineError> {
        while let Some(event) = self.pop_due() {
            if self.cancelled.remove(&EventId(event.key.sequence)) {
                continue;
            }

            self.now = event.key.time;
            self.executed += 1;

            (event.handler)(self).map_err(|source| EngineError::Handler {
                time: self.now,
                source,
            })?;
        }

        if let Some(horizon) = self.horizon {
            self.now = self.now.max(horizon);
        }

        Ok(())
    }

    fn push(&mut self, time: SimTime, handler: Handler<W>) -> EventId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let key = EventKey { time, sequence };
        self.queue.push(Reverse(Scheduled { key, handler }));

        EventId(sequence)
    }

    fn pop_due(&mut self) -> Option<Scheduled<W>> {
        let due = match (self.queue.peek(), self.horizon) {
            (None, _) => false,
            (Some(Reverse(next)), Some(horizon)) => next.key.time <= horizon,
            (Some(_), None) => true,
        };

        if due {
            self.queue.pop().map(|Reverse(event)| event)
        } else {
            None
        }
    }
}

impl<W> Drop for Simulator<W> {
    fn drop(&mut self) {
        let discarded = self.pending();
        if discarded > 0 {
            log::debug!(
                "simulation torn down at {now}s, discarding {discarded} pending events",
                now = self.now
            );
        }
    }
}

impl<W> fmt::Debug for Simulator<W>
where
    W: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("world", &self.world)
            .field("now", &self.now)
            .field("pending", &self.pending())
            .field("executed", &self.executed)
            .field("horizon", &self.horizon)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn record(label: &'static str) -> impl FnOnce(&mut Simulator<Vec<(SimTime, &'static str)>>) -> anyhow::Result<()> {
        move |sim| {
            let now = sim.now();
            sim.world_mut().push((now, label));
            Ok(())
        }
    }

    #[test]
    fn empty() {
        let mut sim = Simulator::new(());

        assert_eq!(sim.pending(), 0);
        sim.run().unwrap();
        assert_eq!(sim.now(), SimTime::ZERO);
        assert_eq!(sim.executed(), 0);
    }

    #[test]
    fn ordered_by_time() {
        let mut sim = Simulator::new(Vec::new());

        sim.schedule_in(Duration::from_secs(3), record("c"));
        sim.schedule_in(Duration::from_secs(1), record("a"));
        sim.schedule_in(Duration::from_secs(2), record("b"));
        sim.run().unwrap();

        assert_eq!(
            sim.world(),
            &[
                (SimTime::from_secs(1), "a"),
                (SimTime::from_secs(2), "b"),
                (SimTime::from_secs(3), "c"),
            ]
        );
    }

    #[test]
    fn same_instant_is_fifo() {
        let mut sim = Simulator::new(Vec::new());

        for label in ["first", "second", "third"] {
            sim.schedule_at(SimTime::from_secs(5), record(label)).unwrap();
        }
        sim.run().unwrap();

        let labels: Vec<_> = sim.world().iter().map(|(_, label)| *label).collect();
        assert_eq!(labels, ["first", "second", "third"]);
    }

    #[test]
    fn horizon_is_inclusive() {
        let mut sim = Simulator::new(Vec::new());

        sim.schedule_at(SimTime::from_secs(10), record("at horizon"))
            .unwrap();
        sim.schedule_at(SimTime::from_secs(11), record("after horizon"))
            .unwrap();
        sim.stop_at(SimTime::from_secs(10));
        sim.run().unwrap();

        assert_eq!(sim.world(), &[(SimTime::from_secs(10), "at horizon")]);
        assert_eq!(sim.pending(), 1);
        assert_eq!(sim.now(), SimTime::from_secs(10));
    }

    #[test]
    fn clock_reaches_horizon_when_idle() {
        let mut sim = Simulator::new(());
        sim.stop_at(SimTime::from_secs(200));
        sim.run().unwrap();

        assert_eq!(sim.now(), SimTime::from_secs(200));
    }

    #[test]
    fn self_rescheduling_ticks() {
        fn tick(sim: &mut Simulator<Vec<SimTime>>) -> anyhow::Result<()> {
            let now = sim.now();
            sim.world_mut().push(now);
            sim.schedule_in(Duration::from_secs(1), tick);
            Ok(())
        }

        let mut sim = Simulator::new(Vec::new());
        sim.schedule_in(Duration::from_secs(1), tick);
        sim.stop_at(SimTime::from_secs(200));
        sim.run().unwrap();

        let expected: Vec<_> = (1..=200).map(SimTime::from_secs).collect();
        assert_eq!(sim.world(), &expected);
        // the tick due at 201s is discarded
        assert_eq!(sim.pending(), 1);
    }

    #[test]
    fn cancel() {
        let mut sim = Simulator::new(Vec::new());

        let cancelled = sim.schedule_in(Duration::from_secs(1), record("cancelled"));
        sim.schedule_in(Duration::from_secs(2), record("kept"));
        sim.cancel(cancelled);
        assert_eq!(sim.pending(), 1);

        sim.run().unwrap();

        assert_eq!(sim.world(), &[(SimTime::from_secs(2), "kept")]);
        assert_eq!(sim.executed(), 1);
    }

    #[test]
    fn cancel_after_execution_is_noop() {
        let mut sim = Simulator::new(Vec::new());

        let id = sim.schedule_in(Duration::from_secs(1), record("ran"));
        sim.run().unwrap();
        sim.cancel(id);

        assert_eq!(sim.pending(), 0);
    }

    #[test]
    fn schedule_in_the_past() {
        let mut sim = Simulator::new(());
        sim.schedule_in(Duration::from_secs(5), |sim| {
            sim.schedule_at(SimTime::from_secs(1), |_| Ok(()))?;
            Ok(())
        });

        let error = sim.run().unwrap_err();
        assert!(
            matches!(error, EngineError::Handler { time, .. } if time == SimTime::from_secs(5)),
            "expected a handler failure, got {error:?}"
        );
    }

    #[test]
    fn handler_error_aborts_the_run() {
        let mut sim = Simulator::new(Vec::new());

        sim.schedule_in(Duration::from_secs(1), |_| bail!("broken handler"));
        sim.schedule_in(Duration::from_secs(2), record("never"));

        let error = sim.run().unwrap_err();
        assert_eq!(error.to_string(), "event handler failed at 1s");
        assert!(sim.world().is_empty());
        assert_eq!(sim.pending(), 1);
    }
}
