//! Parsing of the callback request into a save-result payload.
//!
//! The remote editor may deliver the result three ways: the file bytes
//! themselves, a URL to download them from, or the ID of a saved design
//! (state file) that still has to be rendered.

use base64::Engine;
use serde::Deserialize;
use url::{form_urlencoded, Url};

use crate::error::SaveError;

/// What the callback carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackPayload {
    /// The body is the design file.
    Inline {
        /// Design identifier, or `"inline"` when none was given.
        reference: String,
        /// File bytes.
        data: Vec<u8>,
    },
    /// The design file must be downloaded.
    Download {
        /// Absolute `http`/`https` URL.
        url: String,
    },
    /// A saved design that must be rendered by the remote service.
    State {
        /// Private design (state file) ID.
        state_id: String,
        /// Owner reported by the editor.
        user_id: Option<String>,
    },
}

/// The parts of an HTTP request the parser looks at.
#[derive(Debug, Clone, Copy)]
pub struct CallbackRequest<'a> {
    /// HTTP method, upper case.
    pub method: &'a str,
    /// Request target including the query string.
    pub url: &'a str,
    /// `Content-Type` header, if present.
    pub content_type: Option<&'a str>,
    /// Request body.
    pub body: &'a [u8],
}

/// Recognized callback fields, from the query string, a form or a JSON body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fields {
    state_id: Option<String>,
    user_id: Option<String>,
    design_id: Option<String>,
    url: Option<String>,
    download_url: Option<String>,
    /// Base64 file content.
    data: Option<String>,
}

impl Fields {
    fn from_pairs(input: &[u8]) -> Self {
        let mut fields = Self::default();
        for (key, value) in form_urlencoded::parse(input) {
            let slot = match key.as_ref() {
                "stateId" => &mut fields.state_id,
                "userId" => &mut fields.user_id,
                "designId" => &mut fields.design_id,
                "url" => &mut fields.url,
                "downloadUrl" => &mut fields.download_url,
                "data" => &mut fields.data,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        fields
    }

    /// Fill gaps in `self` from `fallback`; blank values count as missing.
    fn or(self, fallback: Self) -> Self {
        fn pick(a: Option<String>, b: Option<String>) -> Option<String> {
            a.filter(|v| !v.trim().is_empty()).or(b.filter(|v| !v.trim().is_empty()))
        }
        Self {
            state_id: pick(self.state_id, fallback.state_id),
            user_id: pick(self.user_id, fallback.user_id),
            design_id: pick(self.design_id, fallback.design_id),
            url: pick(self.url, fallback.url),
            download_url: pick(self.download_url, fallback.download_url),
            data: pick(self.data, fallback.data),
        }
    }

    fn reference(&self) -> String {
        self.design_id
            .clone()
            .or_else(|| self.state_id.clone())
            .unwrap_or_else(|| "inline".to_string())
    }

    fn into_payload(self) -> Result<CallbackPayload, SaveError> {
        if let Some(ref encoded) = self.data {
            let data = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| SaveError::MalformedCallback(format!("data is not base64: {e}")))?;
            return Ok(CallbackPayload::Inline { reference: self.reference(), data });
        }

        if let Some(url) = self.url.or(self.download_url) {
            let parsed = Url::parse(&url)
                .map_err(|e| SaveError::MalformedCallback(format!("invalid url '{url}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SaveError::MalformedCallback(format!(
                    "unsupported url scheme '{}'",
                    parsed.scheme()
                )));
            }
            return Ok(CallbackPayload::Download { url });
        }

        if let Some(state_id) = self.state_id {
            return Ok(CallbackPayload::State { state_id, user_id: self.user_id });
        }

        Err(SaveError::MalformedCallback(
            "expected one of stateId, url, downloadUrl or data".to_string(),
        ))
    }
}

/// Parse a callback request.
///
/// `GET` (and `POST` with an empty body) read the query string. A JSON or
/// form body is read for fields, falling back to the query string; any other
/// body is the design file itself.
///
/// # Errors
///
/// Returns [`SaveError::MalformedCallback`] if no save result can be found.
pub fn parse_callback(request: &CallbackRequest<'_>) -> Result<CallbackPayload, SaveError> {
    let query = request.url.split_once('?').map_or("", |(_, q)| q);
    let query_fields = Fields::from_pairs(query.as_bytes());

    match request.method {
        "GET" => query_fields.or(Fields::default()).into_payload(),
        "POST" if request.body.is_empty() => query_fields.or(Fields::default()).into_payload(),
        "POST" => match media_type(request.content_type).as_deref() {
            Some(t) if t == "application/json" || t.ends_with("+json") => {
                let body: Fields = serde_json::from_slice(request.body).map_err(|e| {
                    SaveError::MalformedCallback(format!("invalid JSON body: {e}"))
                })?;
                body.or(query_fields).into_payload()
            }
            Some("application/x-www-form-urlencoded") => {
                Fields::from_pairs(request.body).or(query_fields).into_payload()
            }
            _ => {
                let fields = query_fields.or(Fields::default());
                Ok(CallbackPayload::Inline { reference: fields.reference(), data: request.body.to_vec() })
            }
        },
        other => Err(SaveError::MalformedCallback(format!("unsupported method {other}"))),
    }
}

/// `text/html; charset=utf-8` → `text/html`
fn media_type(content_type: Option<&str>) -> Option<String> {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
}
