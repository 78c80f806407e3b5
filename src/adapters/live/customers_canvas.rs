//! Live adapter for the Customer's Canvas API gateway and Design Editor.

use std::cell::OnceCell;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SaveError;
use crate::ports::canvas_api::{CanvasApi, EditorSession, RenderRequest, RenderedDesign};

const TOKEN_SCOPE: &str = "Projects_full Tenants_read Artifacts_read";

/// Client credentials for the identity server.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// External app client ID.
    pub client_id: String,
    /// External app secret.
    pub client_secret: String,
}

/// Everything the live adapter needs to reach a tenant.
#[derive(Debug, Clone)]
pub struct CanvasSettings {
    /// Identity server token endpoint.
    pub auth_url: String,
    /// API gateway base address.
    pub api_url: String,
    /// Storefront the render projects are created in.
    pub storefront_id: Option<u64>,
    /// Client credentials; API calls fail with `MissingCredentials` without them.
    pub credentials: Option<Credentials>,
    /// Design Editor address override.
    pub design_editor_url: Option<String>,
    /// Delay between processing-result checks.
    pub poll_interval: Duration,
    /// Number of processing-result checks before giving up.
    pub max_polls: u32,
}

impl CanvasSettings {
    /// Collect settings from the loaded config and environment.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let credentials = match (config.client_id(), config.client_secret()) {
            (Some(client_id), Some(client_secret)) => Some(Credentials { client_id, client_secret }),
            _ => None,
        };
        Self {
            auth_url: config.canvas.auth_url.clone(),
            api_url: config.canvas.api_url.trim_end_matches('/').to_string(),
            storefront_id: config.canvas.storefront_id,
            credentials,
            design_editor_url: config
                .canvas
                .design_editor_url
                .as_deref()
                .map(|u| u.trim_end_matches('/').to_string()),
            poll_interval: config.render.poll_interval(),
            max_polls: config.render.max_polls,
        }
    }
}

/// Live Customer's Canvas client using the client credentials flow.
pub struct CustomersCanvasApi {
    client: Client,
    settings: CanvasSettings,
    access_token: OnceCell<String>,
}

impl CustomersCanvasApi {
    /// Create a client for the given tenant settings.
    #[must_use]
    pub fn new(settings: CanvasSettings) -> Self {
        Self { client: Client::new(), settings, access_token: OnceCell::new() }
    }

    fn credentials(&self) -> Result<&Credentials, SaveError> {
        self.settings.credentials.as_ref().ok_or_else(|| SaveError::MissingCredentials {
            what: "client ID and secret".into(),
            env_var: "CANVAS_SAVE_CLIENT_ID/CANVAS_SAVE_CLIENT_SECRET".into(),
        })
    }

    /// Bearer token for the API gateway, requested once per run.
    fn access_token(&self) -> Result<&str, SaveError> {
        if let Some(token) = self.access_token.get() {
            return Ok(token.as_str());
        }
        let credentials = self.credentials()?;
        let response = self
            .client
            .post(&self.settings.auth_url)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("scope", TOKEN_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()?;
        let token: TokenResponse = read_json(response)?;
        debug!("access token issued");
        Ok(self.access_token.get_or_init(|| token.access_token).as_str())
    }

    fn tenant_applications(&self) -> Result<TenantApplications, SaveError> {
        let url = format!("{}/api/storefront/v1/tenant-info/applications", self.settings.api_url);
        let response = self.client.get(url).bearer_auth(self.access_token()?).send()?;
        read_json(response)
    }

    fn create_project(&self, request: &RenderRequest) -> Result<String, SaveError> {
        let storefront_id = self.settings.storefront_id.ok_or_else(|| {
            SaveError::Config("canvas.storefront_id is required to render saved designs".into())
        })?;
        let url = format!(
            "{}/api/storefront/v1/projects/by-scenario/render-hires?storefrontId={storefront_id}",
            self.settings.api_url
        );
        let state = &request.state_id;
        let body = serde_json::json!({
            "ownerId": request.user_id,
            "name": format!("PROJ-{state}"),
            "description": format!("Project for state {state}"),
            "scenario": {
                "designId": state,
                "name": format!("resultfile_{state}"),
                "dpi": request.dpi,
                "format": request.format,
                "colorSpace": request.color_space,
                "flipMode": "None",
                "allowAnonymous": false,
            }
        });

        let response = self.client.post(url).bearer_auth(self.access_token()?).json(&body).send()?;
        let project: ProjectResponse = read_json(response)?;
        Ok(match project.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }

    fn processing_results(&self, project_id: &str) -> Result<ProcessingResults, SaveError> {
        let url = format!(
            "{}/api/storefront/v1/projects/{project_id}/processing-results",
            self.settings.api_url
        );
        let response = self.client.get(url).bearer_auth(self.access_token()?).send()?;
        read_json(response)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, SaveError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token()?)
            .send()
            .map_err(|e| SaveError::Fetch { url: url.to_string(), message: e.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SaveError::Fetch { url: url.to_string(), message: format!("HTTP {status}") });
        }
        let bytes = response
            .bytes()
            .map_err(|e| SaveError::Fetch { url: url.to_string(), message: e.to_string() })?;
        Ok(bytes.to_vec())
    }
}

impl CanvasApi for CustomersCanvasApi {
    fn editor_session(&self, user_id: &str) -> Result<EditorSession, SaveError> {
        if self.settings.credentials.is_none() {
            if let Some(ref editor_url) = self.settings.design_editor_url {
                warn!("no client credentials; editor page will load without a user token");
                return Ok(EditorSession { editor_url: editor_url.clone(), token_id: None });
            }
        }

        let applications = self.tenant_applications()?;
        let editor_url = self.settings.design_editor_url.clone().unwrap_or_else(|| {
            applications.design_editor_url.trim_end_matches('/').to_string()
        });

        let response = self
            .client
            .post(format!("{editor_url}/api/Auth/Users/{user_id}/Tokens"))
            .header("X-CustomersCanvasAPIKey", &applications.design_editor_api_key)
            .send()?;
        let token: EditorTokenResponse = read_json(response)?;

        Ok(EditorSession { editor_url, token_id: Some(token.token_id) })
    }

    fn render_design(&self, request: &RenderRequest) -> Result<RenderedDesign, SaveError> {
        let project_id = self.create_project(request)?;
        info!(%project_id, state_id = %request.state_id, "render project created");

        for attempt in 1..=self.settings.max_polls {
            std::thread::sleep(self.settings.poll_interval);

            let results = self.processing_results(&project_id)?;
            debug!(attempt, status = %results.status, "processing results");

            match results.status.as_str() {
                "Completed" => {
                    let mut outputs = results.output_file_details.into_iter();
                    let first = outputs.next().ok_or_else(|| {
                        SaveError::Render(format!("project {project_id} completed without output files"))
                    })?;
                    let skipped = outputs.count();
                    if skipped > 0 {
                        warn!(skipped, "pipeline produced several files; keeping the first");
                    }
                    let data = self.download(&first.url)?;
                    return Ok(RenderedDesign { name: first.name, data });
                }
                "Failed" => {
                    return Err(SaveError::Render(
                        results.status_description.unwrap_or_else(|| "no details".to_string()),
                    ));
                }
                // Pending or InProgress
                _ => {}
            }
        }

        Err(SaveError::Render(format!(
            "project {project_id} still pending after {} checks",
            self.settings.max_polls
        )))
    }
}

/// Read a JSON body, turning non-success statuses into [`SaveError::Api`].
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SaveError> {
    let status = response.status();
    let text = response.text()?;

    if !status.is_success() {
        return Err(SaveError::Api { status: status.as_u16(), message: text });
    }

    serde_json::from_str(&text).map_err(|e| SaveError::Api {
        status: status.as_u16(),
        message: format!("Failed to parse response: {e}"),
    })
}

// --- Customer's Canvas response types ---

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantApplications {
    design_editor_url: String,
    design_editor_api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditorTokenResponse {
    token_id: String,
}

#[derive(Deserialize)]
struct ProjectResponse {
    id: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessingResults {
    status: String,
    #[serde(default)]
    status_description: Option<String>,
    #[serde(default)]
    output_file_details: Vec<OutputFileDetails>,
}

#[derive(Deserialize)]
struct OutputFileDetails {
    url: String,
    name: String,
}
