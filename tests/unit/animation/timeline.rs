use super::*;

#[test]
fn title_is_settled_from_twenty_percent() {
    let settled = FrameState::at(1.0, 0).title;
    for p in [0.2, 0.35, 0.5, 0.8, 0.99, 1.0] {
        assert_eq!(FrameState::at(p, 0).title, settled, "p={p}");
    }
    assert_eq!(settled.scale, 1.0);
    assert_eq!(settled.offset_y, 0.0);
}

#[test]
fn title_starts_small_low_and_transparent() {
    let t = FrameState::at(0.0, 0).title;
    assert_eq!(t.scale, 0.5);
    assert_eq!(t.offset_y, TITLE_RISE_PX);
    assert_eq!(t.opacity, 0.0);
    let mid = FrameState::at(0.1, 0).title;
    assert!(mid.scale > 0.5);
    assert!(mid.opacity > 0.0);
}

#[test]
fn bullet_reveal_is_monotonic() {
    for count in [1usize, 3, 5, 12] {
        let mut last = 0usize;
        for i in 0..=1000 {
            let visible = FrameState::at(i as f64 / 1000.0, count).visible_bullets();
            assert!(visible >= last, "count={count} i={i}");
            last = visible;
        }
        assert_eq!(last, count);
    }
}

#[test]
fn bullets_follow_stagger_schedule() {
    // Three bullets start at 0.3, 0.5333 and 0.7667.
    assert_eq!(FrameState::at(0.3, 3).visible_bullets(), 0);
    assert_eq!(FrameState::at(0.31, 3).visible_bullets(), 1);
    assert_eq!(FrameState::at(0.54, 3).visible_bullets(), 2);
    assert_eq!(FrameState::at(0.77, 3).visible_bullets(), 3);
    assert!((bullet_start(1, 3) - (0.3 + 0.7 / 3.0)).abs() < 1e-12);
}

#[test]
fn bullets_slide_in_from_left() {
    let s = FrameState::at(0.32, 1);
    let b = s.bullets[0];
    assert!(b.opacity > 0.0 && b.opacity < 1.0);
    assert!(b.offset_x < 0.0);
    let done = FrameState::at(0.6, 1).bullets[0];
    assert_eq!(done.opacity, 1.0);
    assert_eq!(done.offset_x, 0.0);
}

#[test]
fn empty_bullet_list_has_no_states() {
    let s = FrameState::at(0.7, 0);
    assert!(s.bullets.is_empty());
    assert_eq!(s.visible_bullets(), 0);
}

#[test]
fn panel_fades_in_and_reveals_lines_in_order() {
    assert_eq!(FrameState::at(0.1, 0).panel.opacity, 0.0);
    assert_eq!(FrameState::at(0.5, 0).panel.opacity, 1.0);

    let s = FrameState::at(0.45, 0);
    // 4 lines start at 0.2, 0.35, 0.5, 0.65.
    assert_eq!(s.panel_line_opacity(0, 4), 1.0);
    assert!((s.panel_line_opacity(1, 4) - 1.0).abs() < 1e-9);
    assert_eq!(s.panel_line_opacity(2, 4), 0.0);
    assert_eq!(s.panel_line_opacity(3, 4), 0.0);
    assert_eq!(s.panel_line_opacity(4, 4), 0.0);
    assert_eq!(FrameState::at(0.9, 0).panel_line_opacity(3, 4), 1.0);
}

#[test]
fn frame_fades_out_over_last_tenth() {
    assert_eq!(FrameState::at(0.5, 0).frame_opacity, 1.0);
    assert_eq!(FrameState::at(0.9, 0).frame_opacity, 1.0);
    let f = FrameState::at(0.95, 0).frame_opacity;
    assert!((f - 0.5).abs() < 1e-9);
    assert_eq!(FrameState::at(1.0, 0).frame_opacity, 0.0);
}

#[test]
fn progress_is_sanitized() {
    assert_eq!(FrameState::at(f64::NAN, 0).progress, 0.0);
    assert_eq!(FrameState::at(-1.0, 0).progress, 0.0);
    assert_eq!(FrameState::at(2.0, 0).progress, 1.0);
}
