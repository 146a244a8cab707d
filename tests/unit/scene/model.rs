use super::*;

#[test]
fn frame_count_matches_duration_times_fps() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(Scene::new("a", 5).frame_count(fps), 150);
    assert_eq!(Scene::new("a", 0).frame_count(fps), 0);
}

#[test]
fn total_frames_sums_scenes() {
    let fps = Fps::new(30, 1).unwrap();
    let scenes = vec![Scene::new("a", 3), Scene::new("b", 2)];
    assert_eq!(total_frames(&scenes, fps), 150);
}

#[test]
fn camel_case_bullets_are_accepted() {
    let s: Scene = serde_json::from_str(
        r#"{"title":"Intro","duration":3,"onScreenText":["one","two"]}"#,
    )
    .unwrap();
    assert_eq!(s.on_screen_text, vec!["one", "two"]);
    assert!(s.narration.is_empty());
    assert!(s.visual.is_empty());
}

#[test]
fn builders_fill_fields() {
    let s = Scene::new("Safety", 4)
        .with_narration("Welcome")
        .with_visual("Hard hats")
        .with_bullets(["PPE", "Exits"]);
    assert_eq!(s.narration, "Welcome");
    assert_eq!(s.visual, "Hard hats");
    assert_eq!(s.on_screen_text.len(), 2);
}
