//! Cancellable deferred callbacks driven by an external clock.
//!
//! Nothing here owns a real timer. Callers schedule a payload for a deadline,
//! keep the returned [`TimerHandle`] to cancel it, and call
//! [`TimerQueue::pop_expired`] with the current time to collect what fired.

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: SmallVec<[(TimerHandle, f64, T); 2]>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: SmallVec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline_ms: f64, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push((handle, deadline_ms, payload));
        handle
    }

    /// Returns `false` if the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|(h, _, _)| *h == handle) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|(h, _, _)| *h == handle)
    }

    /// Removes and returns the earliest timer whose deadline is `<= now_ms`.
    pub fn pop_expired(&mut self, now_ms: f64) -> Option<(TimerHandle, T)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline, _))| *deadline <= now_ms)
            .min_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
            .map(|(i, _)| i)?;
        let (handle, _, payload) = self.pending.remove(idx);
        Some((handle, payload))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
