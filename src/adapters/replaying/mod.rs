//! Replaying adapters that serve recorded interactions from cassettes.

pub mod canvas_api;
pub mod result_fetcher;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Retrieve the next recorded output for a given port and method.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().map_err(|e| format!("replayer lock poisoned: {e}"))?;
    guard.next_interaction(port, method).map(|i| i.output.clone())
}

/// Deserialize a replayed output as `Result<T, String>`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, String> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        return Err(err_val.as_str().unwrap_or("replayed error").to_string());
    }
    let value = match output.get("Ok").or_else(|| output.get("ok")) {
        Some(ok_val) => ok_val.clone(),
        None => output,
    };
    serde_json::from_value(value).map_err(|e| format!("Failed to decode replayed output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::EditorSession;
    use serde_json::json;

    #[test]
    fn ok_output_is_decoded() {
        let session: EditorSession =
            replay_result(json!({"Ok": {"editor_url": "https://editor.example", "token_id": "t"}}))
                .unwrap();
        assert_eq!(session.token_id.as_deref(), Some("t"));
    }

    #[test]
    fn err_output_is_returned_as_message() {
        let err = replay_result::<EditorSession>(json!({"Err": "API error (401): denied"}))
            .unwrap_err();
        assert_eq!(err, "API error (401): denied");
    }

    #[test]
    fn bare_output_is_decoded() {
        let session: EditorSession =
            replay_result(json!({"editor_url": "https://editor.example"})).unwrap();
        assert!(session.token_id.is_none());
    }
}
