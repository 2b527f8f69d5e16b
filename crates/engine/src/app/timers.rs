/// Handle for a scheduled timer. Passing it to [`TimerQueue::cancel`] guarantees the event never
/// fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct PendingTimer<E> {
    id: TimerId,
    due_at: f64,
    event: E,
}

/// Single-threaded queue of future events keyed by simulation time.
///
/// The owner advances it with [`TimerQueue::pop_due`] up to a horizon and then settles the clock
/// with [`TimerQueue::advance_to`]. While an event is being handled, [`TimerQueue::now`] reports
/// that event's due time, so anything scheduled from a handler is timed from the moment the event
/// was due rather than from the end of the frame. Events due at the same instant fire in
/// scheduling order.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: f64,
    next_id: u64,
    pending: Vec<PendingTimer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Simulation time `dt_seconds` from now, for use as a `pop_due` horizon.
    pub fn horizon_after(&self, dt_seconds: f32) -> f64 {
        self.now + f64::from(dt_seconds.max(0.0))
    }

    pub fn schedule(&mut self, delay_seconds: f32, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let delay = if delay_seconds.is_finite() {
            f64::from(delay_seconds.max(0.0))
        } else {
            0.0
        };
        self.pending.push(PendingTimer {
            id,
            due_at: self.now + delay,
            event,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        before != self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Seconds until `id` fires, or `None` if it is no longer pending.
    pub fn remaining(&self, id: TimerId) -> Option<f64> {
        self.pending
            .iter()
            .find(|timer| timer.id == id)
            .map(|timer| (timer.due_at - self.now).max(0.0))
    }

    /// Removes and returns the earliest event due at or before `horizon`, moving the clock to its
    /// due time.
    pub fn pop_due(&mut self, horizon: f64) -> Option<E> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_at <= horizon)
            .min_by(|(_, a), (_, b)| {
                a.due_at
                    .total_cmp(&b.due_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|(index, _)| index)?;
        let timer = self.pending.remove(index);
        if timer.due_at > self.now {
            self.now = timer.due_at;
        }
        Some(timer.event)
    }

    pub fn advance_to(&mut self, horizon: f64) {
        if horizon > self.now {
            self.now = horizon;
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
