use eventide_types::HybridTimestamp;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn now_has_zero_logical() {
    let ts = HybridTimestamp::now();
    assert_eq!(ts.logical(), 0);
    assert!(ts.wall_time() > 0);
}

#[test]
fn new_from_components() {
    let ts = HybridTimestamp::new(42, 7);
    assert_eq!(ts.wall_time(), 42);
    assert_eq!(ts.logical(), 7);
}

#[test]
fn end_of_millisecond_bounds_every_logical_tick() {
    let bound = HybridTimestamp::end_of_millisecond(500);
    assert!(HybridTimestamp::new(500, 0) <= bound);
    assert!(HybridTimestamp::new(500, 1_000_000) <= bound);
    assert!(HybridTimestamp::new(501, 0) > bound);
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn wall_time_dominates_logical() {
    let a = HybridTimestamp::new(100, 9);
    let b = HybridTimestamp::new(200, 0);
    assert!(a < b);
    assert!(b > a);
}

#[test]
fn logical_breaks_ties() {
    let a = HybridTimestamp::new(100, 0);
    let b = HybridTimestamp::new(100, 1);
    assert!(a < b);
}

#[test]
fn equal_timestamps_compare_equal() {
    let a = HybridTimestamp::new(5, 5);
    let b = HybridTimestamp::new(5, 5);
    assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
}

// ── tick ─────────────────────────────────────────────────────────

#[test]
fn tick_is_strictly_monotonic() {
    let mut last = HybridTimestamp::now();
    for _ in 0..1000 {
        let next = last.tick();
        assert!(next > last);
        last = next;
    }
}

#[test]
fn tick_increments_logical_when_clock_is_behind() {
    // A far-future wall time keeps `now()` behind the stamp.
    let ts = HybridTimestamp::new(u64::MAX / 2, 3);
    let ticked = ts.tick();
    assert_eq!(ticked.wall_time(), ts.wall_time());
    assert_eq!(ticked.logical(), 4);
}

#[test]
fn tick_resets_logical_when_clock_advances() {
    let ts = HybridTimestamp::new(1, 99);
    let ticked = ts.tick();
    assert!(ticked.wall_time() > 1);
    assert_eq!(ticked.logical(), 0);
}

#[test]
fn tick_carries_when_logical_is_exhausted() {
    let ts = HybridTimestamp::end_of_millisecond(u64::MAX / 2);
    let ticked = ts.tick();
    assert!(ticked > ts);
    assert_eq!(ticked.wall_time(), u64::MAX / 2 + 1);
    assert_eq!(ticked.logical(), 0);
}

// ── Display / serde ──────────────────────────────────────────────

#[test]
fn display_is_wall_colon_logical() {
    assert_eq!(HybridTimestamp::new(1700, 3).to_string(), "1700:3");
}

#[test]
fn serde_keeps_both_components() {
    let ts = HybridTimestamp::new(1_234_567_890, 42);
    let json = serde_json::to_value(ts).unwrap();
    assert_eq!(json["wall_time"], 1_234_567_890u64);
    assert_eq!(json["logical"], 42);
    let parsed: HybridTimestamp = serde_json::from_value(json).unwrap();
    assert_eq!(ts, parsed);
}
