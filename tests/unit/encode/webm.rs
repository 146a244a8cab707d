use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
        total_frames: 2,
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn flatten_premul_over_background() {
    let src = [0u8, 0, 0, 0, 128, 0, 0, 128, 10, 20, 30, 255];
    let mut dst = [0u8; 12];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [255, 255, 255, 255]).unwrap();

    assert_eq!(&dst[0..4], &[255, 255, 255, 255]);
    assert_eq!(dst[3 + 4], 255);
    assert_eq!(dst[4], 255);
    assert!((126..=128).contains(&dst[5]));
    assert_eq!(&dst[8..12], &[10, 20, 30, 255]);
}

#[test]
fn flatten_straight_alpha_blends() {
    let src = [200u8, 100, 0, 0];
    let mut dst = [0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, [10, 20, 30, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = [0u8; 4];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 8], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut sink = WebmSink::new(WebmSinkOpts::default().with_ffmpeg("/nonexistent/ffmpeg"));
    let err = sink.begin(cfg(3, 2)).unwrap_err();
    assert!(matches!(err, TrainreelError::Validation(_)));
    assert!(!sink.is_active());
}

#[test]
fn frame_size_must_be_even_and_non_zero() {
    assert!(check_frame_size(64, 36).is_ok());
    assert!(check_frame_size(64, 35).is_err());
    assert!(check_frame_size(0, 36).is_err());
}

#[test]
fn missing_ffmpeg_is_encoding_unavailable() {
    let mut sink = WebmSink::new(WebmSinkOpts::default().with_ffmpeg("/nonexistent/ffmpeg"));
    let err = sink.begin(cfg(4, 2)).unwrap_err();
    assert!(matches!(err, TrainreelError::EncodingUnavailable(_)));
}

#[test]
fn push_before_begin_is_sink_closed() {
    let mut sink = WebmSink::new(WebmSinkOpts::default());
    let err = sink
        .push_frame(FrameIndex(0), &solid(2, 2, [0, 0, 0, 255]))
        .unwrap_err();
    assert!(matches!(err, TrainreelError::SinkClosed(_)));
}

#[test]
fn abort_without_begin_is_noop() {
    let mut sink = WebmSink::new(WebmSinkOpts::default());
    sink.abort();
    sink.abort();
    assert!(sink.take_blob().is_none());
}

#[test]
fn temp_paths_are_unique() {
    let a = temp_output_path("webm");
    let b = temp_output_path("webm");
    assert_ne!(a, b);
    assert_eq!(a.extension().and_then(|e| e.to_str()), Some("webm"));
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let root = temp_output_path("dir");
    let file = root.join("a").join("b").join("out.webm");
    ensure_parent_dir(&file).unwrap();
    assert!(file.parent().unwrap().is_dir());
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn encodes_two_frames_when_vp9_is_available() {
    let opts = WebmSinkOpts::default().with_bitrate_kbps(500);
    if !ffmpeg_has_encoder(&opts.ffmpeg, "libvpx-vp9") {
        return;
    }
    let mut sink = WebmSink::new(opts);
    sink.begin(cfg(16, 16)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(16, 16, [255, 0, 0, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid(16, 16, [0, 0, 255, 255]))
        .unwrap();
    sink.end().unwrap();

    let blob = sink.take_blob().unwrap();
    assert_eq!(blob.mime_type, "video/webm");
    // EBML magic.
    assert_eq!(&blob.bytes[..4], &[0x1a, 0x45, 0xdf, 0xa3]);
}
