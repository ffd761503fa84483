/// Timer scheduling — the engine's only notion of time.
///
/// The engine never blocks a thread; everything timed is expressed as
/// "deliver this event after N milliseconds" against a host-owned scheduler.

/// Handle to a pending timer. Handles are unique for the life of a scheduler
/// and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a timer firing means to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Advance the active reveal by one step.
    Tick,
    /// The post-reveal dramatic pause has elapsed.
    Beat,
    /// The safety backstop for the active reveal expired.
    Safety,
}

/// A due timer, delivered back to the engine by the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub handle: TimerHandle,
    pub event: TimerEvent,
}

/// The "run callback after N time units / cancel it" collaborator.
///
/// Cancelling a timer that already fired or was never scheduled is a no-op,
/// never an error.
pub trait TimerScheduler {
    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug)]
struct PendingTimer {
    handle: TimerHandle,
    due_ms: u64,
    event: TimerEvent,
}

/// Deterministic single-threaded scheduler driven by explicit clock advances.
///
/// Due timers fire ordered by `(due time, schedule order)`, so timers
/// scheduled by the same reveal fire strictly in the order they were
/// scheduled. Used by the test suites, the demos, and (with real sleeping
/// between steps) the terminal player.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl ManualScheduler {
    pub fn new() -> ManualScheduler {
        ManualScheduler::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Milliseconds until the next pending timer comes due, if any.
    pub fn next_due_in(&self) -> Option<u64> {
        self.pending
            .iter()
            .map(|timer| timer.due_ms.saturating_sub(self.now_ms))
            .min()
    }

    /// Advance the clock by `delta_ms`, returning every timer that came due,
    /// in firing order.
    pub fn advance(&mut self, delta_ms: u64) -> Vec<TimerFired> {
        self.now_ms += delta_ms;
        let now = self.now_ms;
        let mut due: Vec<PendingTimer> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|timer| (timer.due_ms, timer.handle.0));
        due.into_iter()
            .map(|timer| TimerFired {
                handle: timer.handle,
                event: timer.event,
            })
            .collect()
    }

    /// Jump the clock to the next due timer and fire it. Returns `None` when
    /// nothing is pending.
    pub fn step(&mut self) -> Option<TimerFired> {
        let next = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, timer)| (timer.due_ms, timer.handle.0))
            .map(|(i, _)| i)?;
        let timer = self.pending.remove(next);
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some(TimerFired {
            handle: timer.handle,
            event: timer.event,
        })
    }
}

impl TimerScheduler for ManualScheduler {
    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(PendingTimer {
            handle,
            due_ms: self.now_ms + delay_ms,
            event,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|timer| timer.handle != handle);
    }
}
