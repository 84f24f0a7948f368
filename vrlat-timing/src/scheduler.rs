use crate::jitter::JitterRange;
use crate::timer::Timer;
use rand::Rng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Scheduled<E> {
    due: Instant,
    event: E,
}

/// One-shot event queue driving the trial loop.
///
/// Events carry an identity; at most one instance per identity is pending and
/// re-scheduling an identity supersedes the stale entry. `wait_next` sleeps
/// until the earliest due entry and hands its identity back. The caller runs
/// one handler to completion before asking for the next event, so handlers
/// never observe each other mid-transition.
pub struct TrialScheduler<E, T, R> {
    pending: Vec<Scheduled<E>>,
    timer: T,
    rng: R,
}

impl<E, T, R> TrialScheduler<E, T, R>
where
    E: Copy + Eq + std::fmt::Debug,
    T: Timer,
    R: Rng,
{
    pub fn new(timer: T, rng: R) -> Self {
        Self {
            pending: Vec::new(),
            timer,
            rng,
        }
    }

    /// Schedules `event` to fire after `delay`, superseding any pending
    /// entry with the same identity.
    pub fn schedule_once(&mut self, delay: Duration, event: E) {
        self.pending.retain(|s| s.event != event);
        self.pending.push(Scheduled {
            due: Instant::now() + delay,
            event,
        });
        log::trace!("scheduled {:?} in {:.3} ms", event, delay.as_secs_f64() * 1e3);
    }

    /// Draws the delay uniformly from `range` now and schedules `event` with
    /// it. Returns the drawn delay.
    pub fn schedule_jittered(&mut self, range: &JitterRange, event: E) -> Duration {
        let delay = range.sample(&mut self.rng);
        self.schedule_once(delay, event);
        delay
    }

    /// Removes a pending event. Returns whether anything was pending under
    /// that identity.
    pub fn cancel(&mut self, event: E) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.event != event);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sleeps until the earliest pending entry is due, removes it and
    /// returns its identity. `None` when nothing is pending.
    pub fn wait_next(&mut self) -> Option<E> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.due)
            .map(|(i, _)| i)?;
        let entry = self.pending.swap_remove(idx);

        let now = Instant::now();
        if entry.due > now {
            self.timer.sleep(entry.due - now);
        }
        Some(entry.event)
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
