use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::error::{Result, TelegramError};
use crate::types::ApiResponse;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct TelegramClient {
    api_base: String,
    bot_token: String,
    chat_id: String,
    client: Client,
}

impl TelegramClient {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(API_BASE, bot_token, chat_id)
    }

    /// Point the client at a different API host. Exists for tests.
    pub fn with_api_base(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client: Client::new(),
        }
    }

    pub async fn send_message(&self, text: &str) -> Result<()> {
        debug!(chars = text.len(), "Sending message");

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(REQUEST_TIMEOUT)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await?;

        handle_response(response).await
    }

    pub async fn send_photo(&self, filename: &str, bytes: Vec<u8>, caption: &str) -> Result<()> {
        debug!(filename, size = bytes.len(), "Sending photo");

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", Part::bytes(bytes).file_name(filename.to_string()));

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await?;

        handle_response(response).await
    }

    pub async fn send_document(&self, filename: &str, bytes: Vec<u8>, caption: &str) -> Result<()> {
        debug!(filename, size = bytes.len(), "Sending document");

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part(
                "document",
                Part::bytes(bytes).file_name(filename.to_string()),
            );

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await?;

        handle_response(response).await
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

async fn handle_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TelegramError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let body: ApiResponse = response.json().await?;
    if !body.ok {
        return Err(TelegramError::Api(body.error_description().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_message_form_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot12:abc/sendMessage"))
            .and(body_string_contains("chat_id=-100"))
            .and(body_string_contains("text=build+done"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::with_api_base(server.uri(), "12:abc", "-100");
        client.send_message("build done").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_level_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "description": "chat not found" })),
            )
            .mount(&server)
            .await;

        let client = TelegramClient::with_api_base(server.uri(), "12:abc", "-100");
        let err = client.send_message("hello").await.unwrap_err();
        assert!(matches!(err, TelegramError::Api(_)));
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn test_http_level_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = TelegramClient::with_api_base(server.uri(), "12:abc", "-100");
        let err = client.send_message("hello").await.unwrap_err();
        assert!(matches!(err, TelegramError::Http { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_send_document_is_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot12:abc/sendDocument"))
            .and(body_string_contains("name=\"document\""))
            .and(body_string_contains("filename=\"report.csv\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::with_api_base(server.uri(), "12:abc", "-100");
        client
            .send_document("report.csv", b"a,b\n1,2\n".to_vec(), "daily export")
            .await
            .unwrap();
    }
}
