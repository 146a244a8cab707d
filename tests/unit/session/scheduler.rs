use super::*;
use crate::encode::sink::{InMemorySink, SinkConfig};
use crate::render::backend::FrameRGBA;
use crate::scene::options::RenderOptions;
use crate::session::clock::UnpacedClock;

const W: u32 = 32;
const H: u32 = 18;

fn fps() -> Fps {
    Fps::new(10, 1).unwrap()
}

fn setup() -> (SceneRenderer, RenderTarget) {
    let opts = RenderOptions::default().with_size(W, H).with_fps(fps());
    (
        SceneRenderer::new(&opts).unwrap(),
        RenderTarget::new(W, H).unwrap(),
    )
}

fn begun_sink() -> InMemorySink {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: W,
        height: H,
        fps: fps(),
        total_frames: 10,
    })
    .unwrap();
    sink
}

/// Accepts `limit` frames, then reports closed.
struct ClosingSink {
    limit: usize,
    pushed: Vec<u64>,
}

impl FrameSink for ClosingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> TrainreelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> TrainreelResult<()> {
        if self.pushed.len() >= self.limit {
            return Err(TrainreelError::sink_closed("recorder stopped"));
        }
        self.pushed.push(idx.0);
        Ok(())
    }

    fn end(&mut self) -> TrainreelResult<()> {
        Ok(())
    }
}

#[test]
fn progress_is_strictly_increasing_below_one() {
    let p: Vec<f64> = (0..150).map(|f| frame_progress(f, 150)).collect();
    assert_eq!(p[0], 0.0);
    assert!(p.windows(2).all(|w| w[0] < w[1]));
    assert!(p.iter().all(|&x| (0.0..1.0).contains(&x)));
    assert_eq!(frame_progress(0, 0), 0.0);
}

#[test]
fn pushed_frames_are_rendered_at_frame_over_total() {
    let (mut r, mut t) = setup();
    let mut sink = begun_sink();
    let mut clock = UnpacedClock::new();
    let scene = Scene::new("Checklist", 1).with_bullets(["Lock out", "Tag out", "Verify"]);

    render_scene(&mut r, &mut t, &scene, fps(), FrameIndex(0), &mut sink, &mut clock, None)
        .unwrap();
    assert_eq!(sink.frames().len(), 10);

    let (mut fresh, mut fresh_target) = setup();
    for (f, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, f as u64);
        let expected = fresh
            .render_frame(&mut fresh_target, &scene, f as f64 / 10.0)
            .unwrap();
        assert_eq!(frame.fingerprint(), expected.fingerprint(), "frame {f}");
    }
    // The title is still settling between frames 0 and 1.
    assert_ne!(sink.frames()[0].1.fingerprint(), sink.frames()[1].1.fingerprint());
}

#[test]
fn renders_one_frame_per_tick() {
    let (mut r, mut t) = setup();
    let mut sink = begun_sink();
    let mut clock = UnpacedClock::new();
    let scene = Scene::new("Intro", 1).with_bullets(["a", "b"]);

    let out = render_scene(
        &mut r,
        &mut t,
        &scene,
        fps(),
        FrameIndex(5),
        &mut sink,
        &mut clock,
        None,
    )
    .unwrap();

    assert_eq!(out, SceneOutcome { frames: 10, stopped_early: false });
    assert_eq!(clock.ticks(), 10);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (5..15).collect::<Vec<_>>());
}

#[test]
fn zero_duration_scene_yields_no_frames() {
    let (mut r, mut t) = setup();
    let mut sink = begun_sink();
    let mut clock = UnpacedClock::new();
    let out = render_scene(
        &mut r,
        &mut t,
        &Scene::new("Empty", 0),
        fps(),
        FrameIndex(0),
        &mut sink,
        &mut clock,
        None,
    )
    .unwrap();
    assert_eq!(out, SceneOutcome::default());
    assert!(sink.frames().is_empty());
    assert_eq!(clock.ticks(), 0);
}

#[test]
fn closed_sink_ends_scene_and_keeps_frames() {
    let (mut r, mut t) = setup();
    let mut sink = ClosingSink {
        limit: 4,
        pushed: Vec::new(),
    };
    let mut clock = UnpacedClock::new();
    let out = render_scene(
        &mut r,
        &mut t,
        &Scene::new("Intro", 1),
        fps(),
        FrameIndex(0),
        &mut sink,
        &mut clock,
        None,
    )
    .unwrap();
    assert_eq!(out, SceneOutcome { frames: 4, stopped_early: true });
    assert_eq!(sink.pushed, vec![0, 1, 2, 3]);
}

#[test]
fn other_sink_errors_propagate() {
    let (mut r, mut t) = setup();
    // An index ahead of the scene makes the sink reject frame 0 as out of order.
    let mut sink = begun_sink();
    sink.push_frame(FrameIndex(100), &r.render_frame(&mut t, &Scene::new("x", 1), 0.0).unwrap())
        .unwrap();
    let err = render_scene(
        &mut r,
        &mut t,
        &Scene::new("Intro", 1),
        fps(),
        FrameIndex(0),
        &mut sink,
        &mut UnpacedClock::new(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, TrainreelError::Encoding(_)));
}

#[test]
fn stop_request_halts_before_next_frame() {
    let (mut r, mut t) = setup();
    let mut sink = begun_sink();
    let control = SessionControl::new();
    control.request_stop();
    let out = render_scene(
        &mut r,
        &mut t,
        &Scene::new("Intro", 1),
        fps(),
        FrameIndex(0),
        &mut sink,
        &mut UnpacedClock::new(),
        Some(&control),
    )
    .unwrap();
    assert!(out.stopped_early);
    assert_eq!(out.frames, 0);
    assert!(!control.is_aborted());
}
