//! Slack Web API transport.
//!
//! Setup:
//! 1. Create a Slack App at https://api.slack.com/apps
//! 2. Add Bot Token Scopes: chat:write, files:write, reactions:write
//! 3. Install the app to the workspace and invite it to the target channels
//! 4. Export the Bot User OAuth Token as `CHARTSWORTH_SLACK_TOKEN`
//!
//! Uploads use the external upload flow (`files.getUploadURLExternal`, a raw
//! POST of the bytes, then `files.completeUploadExternal`). Slack resolves
//! the upload target by channel ID, so uploads addressed by channel *name*
//! can be rejected even when plain messages to that name succeed.

use crate::config::ChartsworthConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Operations Chartsworth needs from the chat platform.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Post `text` to `channel`, as a reply when `thread_ts` is set. Returns the new message's `ts`.
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<String>;

    /// Attach a file to the thread started by `thread_ts`.
    async fn upload_file(
        &self,
        channel: &str,
        thread_ts: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<()>;

    /// React with emoji `name` to the message at `timestamp`.
    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> Result<()>;
}

#[async_trait]
impl<A: SlackApi + ?Sized> SlackApi for Arc<A> {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<String> {
        (**self).post_message(channel, text, thread_ts).await
    }

    async fn upload_file(
        &self,
        channel: &str,
        thread_ts: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<()> {
        (**self).upload_file(channel, thread_ts, bytes, filename).await
    }

    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> Result<()> {
        (**self).add_reaction(channel, timestamp, name).await
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ts: String,
}

#[derive(Debug, Deserialize)]
struct UploadUrlResponse {
    upload_url: String,
    file_id: String,
}

/// Unpack a Slack envelope: `{"ok": bool, "error"?: string, ...payload}`.
fn unwrap_envelope<T: DeserializeOwned>(method: &str, body: Value) -> Result<T> {
    let ok = body.get("ok").and_then(Value::as_bool).unwrap_or(false);
    if !ok {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(Error::remote(method, error));
    }

    serde_json::from_value(body)
        .map_err(|e| Error::Transport(format!("unexpected {} response: {}", method, e)))
}

/// Slack accepts reaction names without the surrounding colons.
fn reaction_name(name: &str) -> &str {
    name.trim().trim_matches(':')
}

/// reqwest-backed [`SlackApi`].
#[derive(Clone)]
pub struct SlackWebClient {
    http: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for SlackWebClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackWebClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SlackWebClient {
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Build from a validated config.
    pub fn from_config(config: &ChartsworthConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.token(),
            config.api_base_url.as_str(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call_json<T: DeserializeOwned>(&self, method: &str, params: &Value) -> Result<T> {
        tracing::debug!(method, "calling Slack API");
        let body: Value = self
            .http
            .post(self.method_url(method))
            .bearer_auth(&self.token)
            .json(params)
            .send()
            .await?
            .json()
            .await?;
        unwrap_envelope(method, body)
    }

    async fn call_form<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!(method, "calling Slack API");
        let body: Value = self
            .http
            .post(self.method_url(method))
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .await?
            .json()
            .await?;
        unwrap_envelope(method, body)
    }

    async fn send_upload_bytes(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(upload_url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "file upload failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SlackApi for SlackWebClient {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let mut params = json!({
            "channel": channel,
            "text": text,
        });
        if let Some(ts) = thread_ts {
            params["thread_ts"] = Value::String(ts.to_string());
        }

        let resp: PostMessageResponse = self.call_json("chat.postMessage", &params).await?;
        Ok(resp.ts)
    }

    async fn upload_file(
        &self,
        channel: &str,
        thread_ts: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<()> {
        let target: UploadUrlResponse = self
            .call_form(
                "files.getUploadURLExternal",
                &[
                    ("filename", filename.to_string()),
                    ("length", bytes.len().to_string()),
                ],
            )
            .await?;

        tracing::debug!(file_id = %target.file_id, size = bytes.len(), "uploading file bytes");
        self.send_upload_bytes(&target.upload_url, bytes, filename)
            .await?;

        let files = json!([{ "id": target.file_id, "title": filename }]);
        let _: Value = self
            .call_form(
                "files.completeUploadExternal",
                &[
                    ("files", files.to_string()),
                    ("channel_id", channel.to_string()),
                    ("thread_ts", thread_ts.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> Result<()> {
        let params = json!({
            "channel": channel,
            "timestamp": timestamp,
            "name": reaction_name(name),
        });
        let _: Value = self.call_json("reactions.add", &params).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let resp: PostMessageResponse = unwrap_envelope(
            "chat.postMessage",
            json!({"ok": true, "channel": "C1", "ts": "1700000000.000200"}),
        )
        .unwrap();
        assert_eq!(resp.ts, "1700000000.000200");
    }

    #[test]
    fn test_envelope_error() {
        let err = unwrap_envelope::<Value>(
            "chat.postMessage",
            json!({"ok": false, "error": "not_in_channel"}),
        )
        .unwrap_err();
        match err {
            Error::RemoteApi { method, error } => {
                assert_eq!(method, "chat.postMessage");
                assert_eq!(error, "not_in_channel");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_missing_ok_is_failure() {
        let err = unwrap_envelope::<Value>("reactions.add", json!({})).unwrap_err();
        assert!(matches!(err, Error::RemoteApi { .. }));
    }

    #[test]
    fn test_envelope_missing_payload_field() {
        let err = unwrap_envelope::<PostMessageResponse>("chat.postMessage", json!({"ok": true}))
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_reaction_name_strips_colons() {
        assert_eq!(reaction_name(":tada:"), "tada");
        assert_eq!(reaction_name("thumbsup"), "thumbsup");
    }

    #[test]
    fn test_from_config_requires_token() {
        let err = SlackWebClient::from_config(&ChartsworthConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client =
            SlackWebClient::new("xoxb-1", "http://localhost:1/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.method_url("auth.test"), "http://localhost:1/api/auth.test");
    }
}
