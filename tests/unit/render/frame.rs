use super::*;

#[test]
fn advance_fires_pending_once() {
    let mut clock = ManualFrameClock::default();
    assert_eq!(clock.advance(16.0), None);

    let token = clock.request_frame();
    let due = clock.advance(16.0).unwrap();
    assert_eq!(due.token, token);
    assert_eq!(due.time_ms, 32.0);
    assert_eq!(clock.advance(16.0), None);
}

#[test]
fn cancel_only_matches_the_pending_token() {
    let mut clock = ManualFrameClock::starting_at(100.0);
    let first = clock.request_frame();
    let second = clock.request_frame();
    clock.cancel_frame(first);
    assert!(clock.has_pending());

    clock.cancel_frame(second);
    assert!(!clock.has_pending());
    assert_eq!(clock.advance(10.0), None);
    assert_eq!(clock.now_ms(), 110.0);
    assert_eq!(clock.requested(), 2);
}

#[test]
fn tokens_are_unique() {
    let mut clock = ManualFrameClock::default();
    let a = clock.request_frame();
    let b = clock.request_frame();
    assert_ne!(a, b);
}
