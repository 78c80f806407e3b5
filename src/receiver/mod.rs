//! Callback receiver: a single-threaded HTTP listener that accepts exactly one
//! save callback, persists the result and stops.
//!
//! Requests for the editor page, CORS preflights, `HEAD` probes and unknown
//! paths are answered without ending the session. The first request on
//! [`CALLBACK_PATH`] is the only one handled; the listener is dropped as soon
//! as it has been answered.

pub mod page;
pub mod payload;

use std::fmt;
use std::io::{Cursor, Read};
use std::net::SocketAddr;

use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

use crate::error::SaveError;
pub use payload::{parse_callback, CallbackPayload, CallbackRequest};

/// Host the receiver binds to.
pub const DEFAULT_HOST: &str = "localhost";

/// Port the receiver binds to.
pub const DEFAULT_PORT: u16 = 8000;

/// Path the remote editor calls back on.
pub const CALLBACK_PATH: &str = "/callback";

/// Where the receiver is in its single-shot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Bound, waiting for the callback.
    Idle,
    /// Parsing the callback and obtaining the design bytes.
    Handling,
    /// Writing the design to disk.
    Persisting,
    /// Answered; no further requests are served.
    Terminal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Handling => "handling",
            Self::Persisting => "persisting",
            Self::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// Blocking listener for one save callback.
pub struct CallbackReceiver {
    server: Server,
    host: String,
    port: u16,
    page: Option<String>,
}

impl CallbackReceiver {
    /// Bind to `host:port`. Port `0` picks a free port.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Server`] if the address cannot be bound.
    pub fn bind(host: &str, port: u16) -> Result<Self, SaveError> {
        let server = Server::http((host, port))
            .map_err(|e| SaveError::Server(format!("{host}:{port}: {e}")))?;
        let port = server.server_addr().to_ip().map_or(port, |addr| addr.port());
        info!(%host, port, phase = %Phase::Idle, "callback receiver listening");
        Ok(Self { server, host: host.to_string(), port, page: None })
    }

    /// Serve `html` on `GET /` until the callback arrives.
    #[must_use]
    pub fn with_page(mut self, html: String) -> Self {
        self.page = Some(html);
        self
    }

    /// Socket address actually bound.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Root URL of the receiver, where the editor page is served.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    /// URL the remote editor must call with the save result.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("http://{}:{}{CALLBACK_PATH}", self.host, self.port)
    }

    /// Block until the callback arrives, then handle it and stop listening.
    ///
    /// `resolve` turns the parsed payload into design bytes; `persist`
    /// writes them. The caller of the callback URL gets 200 on success or
    /// the error's status otherwise.
    ///
    /// # Errors
    ///
    /// Returns the first error from parsing, `resolve` or `persist`, or
    /// [`SaveError::Server`] if the listener fails.
    pub fn serve_once<R, T>(
        self,
        resolve: impl FnOnce(CallbackPayload) -> Result<R, SaveError>,
        persist: impl FnOnce(R) -> Result<T, SaveError>,
    ) -> Result<T, SaveError> {
        let mut request = self.next_callback()?;
        info!(method = %request.method(), url = %request.url(), phase = %Phase::Handling, "callback received");

        let mut body = Vec::new();
        let outcome = request
            .as_reader()
            .read_to_end(&mut body)
            .map_err(|e| SaveError::MalformedCallback(format!("could not read body: {e}")))
            .and_then(|_| {
                let method = request.method().to_string().to_ascii_uppercase();
                let content_type = header_value(&request, "Content-Type");
                parse_callback(&CallbackRequest {
                    method: &method,
                    url: request.url(),
                    content_type: content_type.as_deref(),
                    body: &body,
                })
            })
            .and_then(|payload| {
                debug!(?payload, "callback parsed");
                resolve(payload)
            })
            .and_then(|result| {
                debug!(phase = %Phase::Persisting, "writing design");
                persist(result)
            });

        let response = match outcome {
            Ok(_) => text_response(200, "Successfully saved a file."),
            Err(ref e) => {
                error!(error = %e, "callback failed");
                text_response(e.callback_status(), &e.to_string())
            }
        };
        if let Err(e) = request.respond(response) {
            warn!(error = %e, "could not answer callback");
        }

        info!(phase = %Phase::Terminal, "callback receiver stopped");
        outcome
    }

    /// Answer incidental requests until one arrives on the callback path.
    fn next_callback(&self) -> Result<Request, SaveError> {
        loop {
            let request = self.server.recv().map_err(|e| SaveError::Server(e.to_string()))?;
            let path = request.url().split('?').next().unwrap_or_default().to_string();

            if path == CALLBACK_PATH && !matches!(request.method(), Method::Options | Method::Head) {
                return Ok(request);
            }

            let response = match (request.method(), path.as_str(), &self.page) {
                (Method::Options, _, _) => text_response(204, ""),
                (Method::Get | Method::Head, "/" | "/index.html", Some(html)) => {
                    with_header(text_response(200, html), "Content-Type", "text/html; charset=utf-8")
                }
                // Prefetches probe the callback URL without delivering anything.
                (Method::Head, CALLBACK_PATH, _) => text_response(200, ""),
                _ => text_response(404, "Not found"),
            };
            debug!(method = %request.method(), %path, "answered incidental request");
            if let Err(e) = request.respond(response) {
                warn!(error = %e, %path, "could not answer request");
            }
        }
    }
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

fn text_response(status: u16, body: &str) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_string(body).with_status_code(status);
    // The callback may come from the remote editor's origin.
    let response = with_header(response, "Access-Control-Allow-Origin", "*");
    let response = with_header(response, "Access-Control-Allow-Methods", "GET, POST, OPTIONS");
    with_header(response, "Access-Control-Allow-Headers", "Content-Type")
}

fn with_header(
    mut response: Response<Cursor<Vec<u8>>>,
    name: &str,
    value: &str,
) -> Response<Cursor<Vec<u8>>> {
    if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        response.add_header(header);
    }
    response
}
