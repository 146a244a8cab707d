use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        total_frames: 3,
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![v; 16],
        premultiplied: true,
    }
}

#[test]
fn captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &frame(i as u8)).unwrap();
    }
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    assert_eq!(sink.frames()[2].1.data[0], 2);
}

#[test]
fn rejects_frames_before_begin_and_after_end() {
    let mut sink = InMemorySink::new();
    let err = sink.push_frame(FrameIndex(0), &frame(0)).unwrap_err();
    assert!(matches!(err, TrainreelError::SinkClosed(_)));

    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(0)).unwrap();
    sink.end().unwrap();
    let err = sink.push_frame(FrameIndex(1), &frame(1)).unwrap_err();
    assert!(matches!(err, TrainreelError::SinkClosed(_)));
    assert_eq!(sink.frames().len(), 1);
}

#[test]
fn rejects_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(1), &frame(0)).unwrap();
    let err = sink.push_frame(FrameIndex(1), &frame(0)).unwrap_err();
    assert!(matches!(err, TrainreelError::Encoding(_)));
}

#[test]
fn abort_discards_and_is_repeatable() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(0)).unwrap();
    sink.abort();
    sink.abort();
    assert!(sink.frames().is_empty());
    assert!(sink.is_ended());
}

#[test]
fn begin_resets_previous_run() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(0)).unwrap();
    sink.end().unwrap();

    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
    sink.push_frame(FrameIndex(0), &frame(9)).unwrap();
}
