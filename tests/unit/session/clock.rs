use super::*;

#[test]
fn unpaced_clock_counts_ticks_and_resets() {
    let mut c = UnpacedClock::new();
    c.wait_next_frame();
    c.wait_next_frame();
    assert_eq!(c.ticks(), 2);
    c.start();
    assert_eq!(c.ticks(), 0);
}

#[test]
fn realtime_clock_paces_at_fps() {
    let fps = Fps::new(100, 1).unwrap();
    let mut c = RealtimeClock::new(fps);
    assert_eq!(c.frame_duration(), Duration::from_millis(10));

    let t0 = Instant::now();
    c.start();
    for _ in 0..5 {
        c.wait_next_frame();
    }
    assert!(t0.elapsed() >= Duration::from_millis(50));
}

#[test]
fn realtime_clock_does_not_burst_after_overrun() {
    let mut c = RealtimeClock::new(Fps::new(100, 1).unwrap());
    c.start();
    std::thread::sleep(Duration::from_millis(60));
    c.wait_next_frame();

    let t0 = Instant::now();
    c.wait_next_frame();
    assert!(t0.elapsed() >= Duration::from_millis(5));
}

#[test]
fn pacing_defaults_to_realtime() {
    assert_eq!(Pacing::default(), Pacing::Realtime);
    let p: Pacing = serde_json::from_str("\"unpaced\"").unwrap();
    assert_eq!(p, Pacing::Unpaced);
}
