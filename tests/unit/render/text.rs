use super::*;

fn engine() -> TextLayoutEngine {
    TextLayoutEngine::new(&FontSource::System).unwrap()
}

#[test]
fn identical_requests_share_a_layout() {
    let mut e = engine();
    let style = TextStyle {
        size_px: 24.0,
        bold: false,
        max_width_px: Some(200.0),
    };
    let a = e.layout("Fire exits", style).unwrap();
    let b = e.layout("Fire exits", style).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let bold = e
        .layout("Fire exits", TextStyle { bold: true, ..style })
        .unwrap();
    assert!(!Arc::ptr_eq(&a, &bold));
}

#[test]
fn invalid_size_is_rejected() {
    let mut e = engine();
    let err = e
        .layout(
            "x",
            TextStyle {
                size_px: 0.0,
                bold: false,
                max_width_px: None,
            },
        )
        .err()
        .unwrap();
    assert!(err.to_string().contains("size_px"));
}

#[test]
fn unbreakable_word_does_not_fail() {
    let mut e = engine();
    let word = "x".repeat(400);
    assert!(
        e.layout(
            &word,
            TextStyle {
                size_px: 30.0,
                bold: false,
                max_width_px: Some(10.0),
            },
        )
        .is_ok()
    );
}

#[test]
fn missing_font_file_is_a_validation_error() {
    let err = match TextLayoutEngine::new(&FontSource::File("no/such/font.ttf".into())) {
        Ok(_) => panic!("expected error"),
        Err(e) => e,
    };
    assert!(matches!(err, TrainreelError::Validation(_)));
}
