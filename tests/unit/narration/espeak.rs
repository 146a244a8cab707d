use super::*;

const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en              --/M      English_(Great_Britain) gmw/en      (en 2)
 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
";

#[test]
fn parses_voice_table() {
    let voices = parse_voice_list(LISTING);
    assert_eq!(voices.len(), 3);
    assert_eq!(voices[0], Voice::new("Afrikaans", "af"));
    assert_eq!(voices[1].name, "English (Great Britain)");
    assert_eq!(voices[2].lang, "en-us");
    // The table does not mark a default voice.
    assert!(voices.iter().all(|v| !v.default));
}

#[test]
fn parses_empty_and_header_only_output() {
    assert!(parse_voice_list("").is_empty());
    assert!(parse_voice_list("Pty Language Age/Gender VoiceName File\n").is_empty());
}

#[test]
fn parameter_mapping_is_bounded() {
    assert_eq!(rate_to_wpm(1.0), 175);
    assert_eq!(rate_to_wpm(0.1), 80);
    assert_eq!(rate_to_wpm(10.0), 450);
    assert_eq!(pitch_to_espeak(1.0), 50);
    assert_eq!(pitch_to_espeak(2.0), 99);
    assert_eq!(volume_to_amplitude(1.0), 100);
    assert_eq!(volume_to_amplitude(0.0), 0);
}

#[test]
fn args_prefer_selected_voice_language() {
    let mut u = Utterance {
        text: "hi".to_owned(),
        lang: "de-DE".to_owned(),
        voice: Some(Voice::new("English (America)", "en-us")),
        rate: 1.0,
        pitch: 1.0,
        volume: 1.0,
    };
    let args = CommandSpeechEngine::args(&u);
    assert_eq!(&args[..2], &["-v".to_owned(), "en-us".to_owned()]);
    assert_eq!(args.last().map(String::as_str), Some("--stdin"));

    u.voice = None;
    let args = CommandSpeechEngine::args(&u);
    assert_eq!(args[1], "de-de");
}

#[test]
fn missing_binary_is_a_speech_error() {
    let engine = CommandSpeechEngine::new("/nonexistent/espeak-ng");
    assert!(!engine.is_available());
    assert!(matches!(engine.voices(), Err(TrainreelError::Speech(_))));

    let (tx, _rx) = std::sync::mpsc::channel();
    let u = Utterance {
        text: "hi".to_owned(),
        lang: "en".to_owned(),
        voice: None,
        rate: 1.0,
        pitch: 1.0,
        volume: 1.0,
    };
    assert!(matches!(engine.speak(&u, tx), Err(TrainreelError::Speech(_))));
    // Idle controls are no-ops.
    engine.pause();
    engine.resume();
    engine.stop();
}
