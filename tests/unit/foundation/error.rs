use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TrainreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(TrainreelError::render("x").to_string().contains("render error:"));
    assert!(
        TrainreelError::encoding_unavailable("x")
            .to_string()
            .contains("encoding unavailable:")
    );
    assert!(
        TrainreelError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(TrainreelError::speech("x").to_string().contains("speech error:"));
    assert!(
        TrainreelError::sink_closed("x")
            .to_string()
            .contains("sink closed:")
    );
    assert!(
        TrainreelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn timeout_mentions_subject_and_duration() {
    let err = TrainreelError::timeout("ffmpeg finalize", Duration::from_millis(250));
    let s = err.to_string();
    assert!(s.contains("ffmpeg finalize"));
    assert!(s.contains("250ms"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TrainreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
