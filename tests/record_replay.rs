//! Cassette recording and replay through the public adapters.
//!
//! Replayed sessions still run a real receiver on a free loopback port; only
//! the Customer's Canvas and download ports come from the cassette.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use canvas_save::adapters::recording::result_fetcher::RecordingResultFetcher;
use canvas_save::adapters::replaying::result_fetcher::ReplayingResultFetcher;
use canvas_save::app::{run_session, SessionPlan};
use canvas_save::cassette::config::load_cassette;
use canvas_save::cassette::recorder::CassetteRecorder;
use canvas_save::config::Config;
use canvas_save::context::ServiceContext;
use canvas_save::ports::{BrowserLauncher, FetchedResource, ResultFetcher};
use canvas_save::receiver::CallbackReceiver;
use canvas_save::session::EditorMode;
use canvas_save::SaveError;
use reqwest::blocking::Client;
use url::Url;

const REPLAYED_SESSION: &str = r#"
name: replayed-template-session
recorded_at: 2026-01-15T10:30:00Z
commit: 0123abcd
interactions:
  - seq: 0
    port: canvas_api
    method: editor_session
    input: { user_id: alice }
    output:
      Ok: { editor_url: "https://editor.example", token_id: de-token }
  - seq: 1
    port: canvas_api
    method: render_design
    input: { state_id: s1, user_id: alice, format: Pdf, color_space: Cmyk, dpi: 300 }
    output:
      Ok: { name: resultfile_s1, data: "JVBERi0=" }
"#;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("canvas_save_replay_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_cassette(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("session.cassette.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

/// Plays the editor page: posts a saved state ID to the callback URL.
struct SavesState;

impl BrowserLauncher for SavesState {
    fn launch(&self, url: &str) -> Result<(), SaveError> {
        let callback = Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "callbackUrl")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        thread::spawn(move || {
            Client::new()
                .post(callback)
                .json(&serde_json::json!({ "stateId": "s1", "userId": "alice" }))
                .send()
                .map(|r| r.status().as_u16())
        });
        Ok(())
    }
}

#[test]
fn replayed_session_renders_saved_state() {
    let dir = scratch("render");
    let cassette = write_cassette(&dir, REPLAYED_SESSION);

    let mut ctx = ServiceContext::replaying(&cassette, &Config::default(), true).unwrap();
    ctx.launcher = Box::new(SavesState);

    let mode = EditorMode::Template { design_id: "T123".into() };
    let plan = SessionPlan {
        output: dir.join(mode.output_file_name()),
        mode,
        user_id: "alice".into(),
        launch_base: None,
        format: "Pdf".into(),
        color_space: "Cmyk".into(),
        dpi: 300,
    };

    let receiver = CallbackReceiver::bind("127.0.0.1", 0).unwrap();
    let saved = run_session(&plan, &ctx, receiver).unwrap();

    assert_eq!(saved.path, dir.join("template-design.pdf"));
    assert_eq!(std::fs::read(&saved.path).unwrap(), b"%PDF-");
    assert_eq!(saved.reference, "s1");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn exhausted_cassette_is_a_fetch_error() {
    let dir = scratch("exhausted");
    let cassette = write_cassette(
        &dir,
        r#"
name: one-fetch
recorded_at: 2026-01-15T10:30:00Z
commit: unknown
interactions:
  - seq: 0
    port: result_fetcher
    method: fetch
    input: { url: "http://127.0.0.1:9/design.pdf" }
    output:
      Ok: { data: "AQID", content_type: application/pdf }
"#,
    );

    let ctx = ServiceContext::replaying(&cassette, &Config::default(), true).unwrap();
    let first = ctx.fetcher.fetch("http://127.0.0.1:9/design.pdf").unwrap();
    assert_eq!(first.data, vec![1, 2, 3]);
    assert_eq!(first.content_type.as_deref(), Some("application/pdf"));

    let err = ctx.fetcher.fetch("http://127.0.0.1:9/design.pdf").unwrap_err();
    assert!(matches!(err, SaveError::Fetch { .. }), "got {err:?}");

    let _ = std::fs::remove_dir_all(&dir);
}

/// Fetcher that answers from memory, failing for one URL.
struct MemoryFetcher;

impl ResultFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource, SaveError> {
        if url.ends_with("missing.pdf") {
            return Err(SaveError::Fetch { url: url.to_string(), message: "HTTP 404 Not Found".into() });
        }
        Ok(FetchedResource { data: b"design bytes".to_vec(), content_type: None })
    }
}

#[test]
fn recorded_fetches_replay_in_order() {
    let dir = scratch("record");
    let path = dir.join("session.cassette.yaml");

    let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "recorded", "deadbeef")));
    let fetcher = RecordingResultFetcher::new(Box::new(MemoryFetcher), Arc::clone(&recorder));
    assert!(fetcher.fetch("http://host/design.pdf").is_ok());
    assert!(fetcher.fetch("http://host/missing.pdf").is_err());
    drop(fetcher);

    let written = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap().finish().unwrap();
    assert_eq!(written, path);

    let replayer = Arc::new(Mutex::new(load_cassette(&path).unwrap()));
    let replaying = ReplayingResultFetcher::new(replayer);
    assert_eq!(replaying.fetch("http://host/design.pdf").unwrap().data, b"design bytes");
    match replaying.fetch("http://host/missing.pdf").unwrap_err() {
        SaveError::Fetch { message, .. } => assert!(message.contains("404"), "got {message}"),
        other => panic!("expected Fetch error, got {other:?}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}
