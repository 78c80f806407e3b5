//! Live Customer's Canvas adapter against a local mock of the tenant APIs.

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use canvas_save::adapters::live::customers_canvas::{
    CanvasSettings, Credentials, CustomersCanvasApi,
};
use canvas_save::ports::{CanvasApi, RenderRequest};
use canvas_save::SaveError;
use tiny_http::{Header, Request, Response, Server};

/// How the mock answers processing-result checks.
#[derive(Clone, Copy)]
enum Pipeline {
    /// Pending on the first check, completed afterwards.
    CompletesOnSecondCheck,
    Fails,
    NeverFinishes,
}

#[derive(Default)]
struct Counters {
    token_requests: AtomicUsize,
    result_checks: AtomicUsize,
}

fn header(request: &Request, name: &'static str) -> Option<String> {
    request.headers().iter().find(|h| h.field.equiv(name)).map(|h| h.value.as_str().to_string())
}

fn json(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_header("Content-Type: application/json".parse::<Header>().unwrap())
}

/// Start a mock tenant and return its base URL.
fn start_tenant(pipeline: Pipeline, counters: Arc<Counters>) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://127.0.0.1:{}", server.server_addr().to_ip().unwrap().port());
    let file_url = format!("{base}/files/resultfile_s1.pdf");
    let editor_url = format!("{base}/de");

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let url = request.url().to_string();
            let bearer = header(&request, "Authorization");
            let authorized = bearer.as_deref() == Some("Bearer tok-1");

            let response = if url == "/connect/token" {
                counters.token_requests.fetch_add(1, Ordering::SeqCst);
                if body.contains("grant_type=client_credentials") && body.contains("client_id=app") {
                    json(r#"{"access_token":"tok-1","expires_in":3600}"#)
                } else {
                    json(r#"{"error":"invalid_client"}"#).with_status_code(400)
                }
            } else if !url.starts_with("/de/") && !authorized {
                json(r#"{"error":"unauthorized"}"#).with_status_code(401)
            } else if url == "/api/storefront/v1/tenant-info/applications" {
                json(&format!(r#"{{"designEditorUrl":"{editor_url}/","designEditorApiKey":"de-key"}}"#))
            } else if url == "/de/api/Auth/Users/alice/Tokens" {
                if header(&request, "X-CustomersCanvasAPIKey").as_deref() == Some("de-key") {
                    json(r#"{"tokenId":"de-token"}"#)
                } else {
                    json("{}").with_status_code(403)
                }
            } else if url.starts_with("/api/storefront/v1/projects/by-scenario/render-hires") {
                assert!(url.ends_with("storefrontId=4242"), "storefront missing: {url}");
                let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(payload["ownerId"], "alice");
                assert_eq!(payload["scenario"]["designId"], "s1");
                assert_eq!(payload["scenario"]["format"], "Pdf");
                assert_eq!(payload["scenario"]["colorSpace"], "Cmyk");
                assert_eq!(payload["scenario"]["dpi"], 300);
                json(r#"{"id":77}"#)
            } else if url == "/api/storefront/v1/projects/77/processing-results" {
                let check = counters.result_checks.fetch_add(1, Ordering::SeqCst);
                match pipeline {
                    Pipeline::CompletesOnSecondCheck if check >= 1 => json(&format!(
                        r#"{{"status":"Completed","outputFileDetails":[{{"url":"{file_url}","name":"resultfile_s1"}}]}}"#
                    )),
                    Pipeline::Fails => {
                        json(r#"{"status":"Failed","statusDescription":"Font 'Roboto' is missing"}"#)
                    }
                    _ => json(r#"{"status":"Pending"}"#),
                }
            } else if url == "/files/resultfile_s1.pdf" {
                Response::from_data(b"%PDF-1.7 rendered output".to_vec())
            } else {
                json("{}").with_status_code(404)
            };
            let _ = request.respond(response);
        }
    });

    base
}

fn api(base: &str, max_polls: u32) -> CustomersCanvasApi {
    CustomersCanvasApi::new(CanvasSettings {
        auth_url: format!("{base}/connect/token"),
        api_url: base.to_string(),
        storefront_id: Some(4242),
        credentials: Some(Credentials { client_id: "app".into(), client_secret: "shh".into() }),
        design_editor_url: None,
        poll_interval: Duration::ZERO,
        max_polls,
    })
}

fn render_request() -> RenderRequest {
    RenderRequest {
        state_id: "s1".into(),
        user_id: "alice".into(),
        format: "Pdf".into(),
        color_space: "Cmyk".into(),
        dpi: 300,
    }
}

#[test]
fn render_polls_until_completed_and_downloads() {
    let counters = Arc::new(Counters::default());
    let base = start_tenant(Pipeline::CompletesOnSecondCheck, Arc::clone(&counters));

    let rendered = api(&base, 5).render_design(&render_request()).unwrap();

    assert_eq!(rendered.name, "resultfile_s1");
    assert_eq!(rendered.data, b"%PDF-1.7 rendered output");
    assert_eq!(counters.result_checks.load(Ordering::SeqCst), 2);
    assert_eq!(counters.token_requests.load(Ordering::SeqCst), 1, "token is cached for the run");
}

#[test]
fn failed_pipeline_reports_description() {
    let counters = Arc::new(Counters::default());
    let base = start_tenant(Pipeline::Fails, Arc::clone(&counters));

    let err = api(&base, 5).render_design(&render_request()).unwrap_err();
    match err {
        SaveError::Render(message) => assert!(message.contains("Roboto"), "got {message}"),
        other => panic!("expected Render error, got {other:?}"),
    }
    assert_eq!(counters.result_checks.load(Ordering::SeqCst), 1);
}

#[test]
fn pending_pipeline_gives_up_after_limit() {
    let counters = Arc::new(Counters::default());
    let base = start_tenant(Pipeline::NeverFinishes, Arc::clone(&counters));

    let err = api(&base, 3).render_design(&render_request()).unwrap_err();
    assert!(err.to_string().contains("still pending after 3 checks"), "got {err}");
    assert_eq!(counters.result_checks.load(Ordering::SeqCst), 3);
}

#[test]
fn editor_session_resolves_editor_and_user_token() {
    let counters = Arc::new(Counters::default());
    let base = start_tenant(Pipeline::NeverFinishes, Arc::clone(&counters));

    let session = api(&base, 1).editor_session("alice").unwrap();

    assert_eq!(session.editor_url, format!("{base}/de"));
    assert_eq!(session.token_id.as_deref(), Some("de-token"));
}

#[test]
fn rejected_credentials_surface_as_api_error() {
    let counters = Arc::new(Counters::default());
    let base = start_tenant(Pipeline::NeverFinishes, Arc::clone(&counters));

    let api = CustomersCanvasApi::new(CanvasSettings {
        auth_url: format!("{base}/connect/token"),
        api_url: base.clone(),
        storefront_id: Some(4242),
        credentials: Some(Credentials { client_id: "intruder".into(), client_secret: "x".into() }),
        design_editor_url: None,
        poll_interval: Duration::ZERO,
        max_polls: 1,
    });

    let err = api.render_design(&render_request()).unwrap_err();
    assert!(matches!(err, SaveError::Api { status: 400, .. }), "got {err:?}");
}
