use super::*;

fn scene() -> Scene {
    Scene::new("Workplace Safety", 3)
        .with_visual("Personal protective equipment keeps every worker safe on site.")
        .with_bullets(["Wear a helmet", "Know the exits", "Report hazards"])
}

fn renderer() -> SceneRenderer {
    SceneRenderer::new(&RenderOptions::default().with_size(160, 90)).unwrap()
}

#[test]
fn same_inputs_produce_identical_pixels() {
    let mut r = renderer();
    let mut target = RenderTarget::new(160, 90).unwrap();
    let s = scene();
    for p in [0.0, 0.1, 0.45, 0.75, 0.95] {
        let a = r.render_frame(&mut target, &s, p).unwrap();
        let b = r.render_frame(&mut target, &s, p).unwrap();
        assert_eq!(a.data, b.data, "p={p}");
    }

    // A fresh renderer and target agree too.
    let mut r2 = renderer();
    let mut t2 = RenderTarget::new(160, 90).unwrap();
    let a = r.render_frame(&mut target, &s, 0.5).unwrap();
    let b = r2.render_frame(&mut t2, &s, 0.5).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn frame_matches_target_size() {
    let mut r = renderer();
    let mut target = RenderTarget::new(64, 48).unwrap();
    let f = r.render_frame(&mut target, &scene(), 0.5).unwrap();
    assert_eq!((f.width, f.height), (64, 48));
    assert_eq!(f.data.len(), 64 * 48 * 4);
    assert!(f.premultiplied);
}

#[test]
fn last_instant_is_faded_to_black() {
    let mut r = renderer();
    let mut target = RenderTarget::new(160, 90).unwrap();
    let f = r.render_frame(&mut target, &scene(), 1.0).unwrap();
    assert!(f.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn mid_scene_shows_background() {
    let mut r = renderer();
    let mut target = RenderTarget::new(160, 90).unwrap();
    let f = r.render_frame(&mut target, &scene(), 0.5).unwrap();
    assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));
    assert!(f.data.chunks_exact(4).any(|px| px[..3] != [0, 0, 0]));
}

#[test]
fn fade_out_darkens_the_frame() {
    let mut r = renderer();
    let mut target = RenderTarget::new(160, 90).unwrap();
    let s = Scene::new("", 1);
    let bright = r.render_frame(&mut target, &s, 0.5).unwrap();
    let dim = r.render_frame(&mut target, &s, 0.97).unwrap();
    let sum = |f: &FrameRGBA| f.data.iter().map(|&b| u64::from(b)).sum::<u64>();
    assert!(sum(&dim) < sum(&bright));
}

#[test]
fn bullets_change_pixels_once_revealed() {
    let mut r = renderer();
    let mut target = RenderTarget::new(160, 90).unwrap();
    let with = scene();
    let without = Scene {
        on_screen_text: Vec::new(),
        ..scene()
    };
    // Before 0.3 no bullet is drawn.
    let a = r.render_frame(&mut target, &with, 0.25).unwrap();
    let b = r.render_frame(&mut target, &without, 0.25).unwrap();
    assert_eq!(a.data, b.data);
    // After 0.6 the first marker is drawn.
    let c = r.render_frame(&mut target, &with, 0.6).unwrap();
    let d = r.render_frame(&mut target, &without, 0.6).unwrap();
    assert_ne!(c.data, d.data);
}

#[test]
fn degenerate_text_never_fails() {
    let mut r = renderer();
    let mut target = RenderTarget::new(160, 90).unwrap();
    let s = Scene::new("x".repeat(300), 1)
        .with_visual("y".repeat(2_000))
        .with_bullets(["", "z".repeat(500).as_str()]);
    for p in [0.0, 0.5, 0.9, f64::NAN, -1.0, 3.0] {
        assert!(r.render(&mut target, &s, p).is_ok());
    }
}

#[test]
fn layout_scales_with_target() {
    let full = SceneLayout::for_size(1920, 1080);
    let half = SceneLayout::for_size(960, 540);
    assert_eq!(full.scale, 1.0);
    assert_eq!(half.scale, 0.5);
    assert_eq!(half.panel.x0 * 2.0, full.panel.x0);
    assert!(full.bullets_origin.x > full.panel.x1);
}
