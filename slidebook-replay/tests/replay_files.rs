//! Replay Integration Tests
//!
//! Loads decks, scripts and viewer configs from disk the way the binary does.

use std::fs;
use std::path::Path;

use slidebook_replay::{run, DeckSource, ReplayConfig};

/// Write `contents` to `dir/name` and return the path.
fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

const MANIFEST: &str = r#"[
    {"index": 0, "imageLocator": "slide-1.png", "altText": "Cover"},
    {"index": 1, "imageLocator": "slide-2.png", "altText": "Agenda"},
    {"index": 2, "imageLocator": "slide-3.png", "altText": "Results"}
]"#;

const NEXT_NEXT_NEXT: &str = r#"{"steps": [
    {"at_ms": 100, "event": {"type": "Button", "data": "next"}},
    {"at_ms": 600, "event": {"type": "Key", "data": "ArrowRight"}},
    {"at_ms": 1100, "event": {"type": "Key", "data": "ArrowRight"}}
]}"#;

#[test]
fn test_manifest_replay_reports_pages_and_bounce() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deck = write(dir.path(), "deck.json", MANIFEST);
    let script = write(dir.path(), "script.json", NEXT_NEXT_NEXT);
    for image in ["slide-1.png", "slide-2.png", "slide-3.png"] {
        write(dir.path(), image, "png");
    }

    let mut config = ReplayConfig::new(1, script);
    config.deck = DeckSource::Manifest(deck);

    let mut frames = 0;
    let report = run(&config, |_| frames += 1).expect("replay");

    assert_eq!(report.slides, 3);
    assert_eq!(report.pages_visited, vec![0, 1, 2]);
    assert_eq!(report.final_display_number, 3);
    assert_eq!(report.stats.edge_bounces, 1);
    assert_eq!(report.preload.failed, 0);
    assert_eq!(report.frames, frames);
}

#[test]
fn test_missing_images_count_as_preload_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deck = write(dir.path(), "deck.json", MANIFEST);
    let script = write(dir.path(), "script.json", NEXT_NEXT_NEXT);

    let mut config = ReplayConfig::new(1, script);
    config.deck = DeckSource::Manifest(deck);

    let report = run(&config, |_| {}).expect("replay");
    assert_eq!(report.final_page, 2, "navigation continues without images");
    assert_eq!(report.preload.requested, 3);
    assert_eq!(report.preload.failed, 3);
}

#[test]
fn test_viewer_config_file_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write(
        dir.path(),
        "script.json",
        r#"{"steps": [{"at_ms": 0, "event": {"type": "Button", "data": "prev"}}]}"#,
    );
    let tuning = write(
        dir.path(),
        "viewer.json",
        r#"{"feedback": {"bounce_distance_px": 40.0}}"#,
    );

    let deepest_bounce = |config: &ReplayConfig| {
        let mut min_x = 0.0_f32;
        run(config, |frame| min_x = min_x.min(frame.current.translate_x)).expect("replay");
        min_x
    };

    let mut config = ReplayConfig::new(3, script);
    let default_bounce = deepest_bounce(&config);
    config.viewer_config = Some(tuning);
    let tuned_bounce = deepest_bounce(&config);

    assert!(default_bounce < 0.0);
    assert!(
        tuned_bounce < default_bounce * 2.0,
        "tuned {tuned_bounce}, default {default_bounce}"
    );
}

#[test]
fn test_invalid_viewer_config_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write(dir.path(), "script.json", r#"{"steps": []}"#);
    let tuning = write(dir.path(), "viewer.json", r#"{"zoom": {"max_scale": 0.8}}"#);

    let mut config = ReplayConfig::new(3, script);
    config.viewer_config = Some(tuning);
    assert!(run(&config, |_| {}).is_err());
}

#[test]
fn test_missing_script_is_an_error() {
    let config = ReplayConfig::new(3, "/nonexistent/script.json");
    let error = run(&config, |_| {}).expect_err("missing script");
    assert!(error.to_string().contains("script"));
}
