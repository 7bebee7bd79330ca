//! Deterministic timer queue
//!
//! Every timer the game needs is an entry here instead of a platform
//! callback. The host passes the current time into each frame; due timers
//! come out in (due time, scheduling order) and the caller dispatches them to
//! named transitions. Cancelling a handle guarantees its event never fires.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use super::state::EntityId;

/// Opaque handle returned when scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// What a timer means when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// 1 s survival tick
    SurvivalTick,
    /// 1 s spawn-interval decay
    SpawnDecay,
    /// 5 s difficulty ramp
    DifficultyTick,
    /// Respawn delay elapsed
    RespawnDelay,
    /// Invincibility window elapsed
    InvincibilityEnd,
    /// ~60 Hz obstacle drain while the player is down
    ClearSweep,
    /// Explosion visual lifetime elapsed
    ExplosionExpired(EntityId),
}

#[derive(Debug, Clone)]
struct Timer {
    event: TimerEvent,
    /// Re-arm period for repeating timers
    interval_ms: Option<u64>,
}

/// Timer queue with a simulated clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    /// (due, sequence, handle); sequence keeps same-time timers in scheduling order
    queue: BinaryHeap<Reverse<(u64, u64, TimerHandle)>>,
    timers: BTreeMap<TimerHandle, Timer>,
    next_seq: u64,
    next_handle: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn schedule_once(&mut self, delay_ms: u64, event: TimerEvent) -> TimerHandle {
        self.insert(delay_ms, event, None)
    }

    /// Repeating timer; a zero interval is treated as 1 ms
    pub fn schedule_repeating(&mut self, interval_ms: u64, event: TimerEvent) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.insert(interval_ms, event, Some(interval_ms))
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    /// Cancel everything
    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    /// Pop the next timer due at or before `until_ms`, advancing the clock to
    /// its due time. Repeating timers are re-armed relative to their due time
    /// so they never drift.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerEvent)> {
        loop {
            let Reverse((due, _, handle)) = *self.queue.peek()?;
            if due > until_ms {
                return None;
            }
            self.queue.pop();

            // Lazily skip cancelled entries
            let Some(timer) = self.timers.get(&handle) else {
                continue;
            };
            let event = timer.event;
            match timer.interval_ms {
                Some(interval) => {
                    let seq = self.bump_seq();
                    self.queue.push(Reverse((due + interval, seq, handle)));
                }
                None => {
                    self.timers.remove(&handle);
                }
            }

            self.now_ms = self.now_ms.max(due);
            return Some((handle, event));
        }
    }

    fn insert(&mut self, delay_ms: u64, event: TimerEvent, interval_ms: Option<u64>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.queue.push(Reverse((self.now_ms + delay_ms, seq, handle)));
        self.timers.insert(handle, Timer { event, interval_ms });
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
