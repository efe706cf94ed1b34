// Host-side tests for the cancellable timer queue.

use pano_core::TimerQueue;

#[test]
fn timers_fire_in_deadline_order_once() {
    let mut q = TimerQueue::new();
    q.schedule(300.0, "late");
    q.schedule(100.0, "early");
    assert_eq!(q.pop_expired(50.0), None);
    assert_eq!(q.pop_expired(500.0).map(|(_, p)| p), Some("early"));
    assert_eq!(q.pop_expired(500.0).map(|(_, p)| p), Some("late"));
    assert_eq!(q.pop_expired(500.0), None);
    assert!(q.is_empty());
}

#[test]
fn cancelled_timer_never_fires() {
    let mut q = TimerQueue::new();
    let h = q.schedule(100.0, 1u8);
    assert!(q.is_pending(h));
    assert!(q.cancel(h));
    assert!(!q.cancel(h));
    assert_eq!(q.pop_expired(1000.0), None);
}
