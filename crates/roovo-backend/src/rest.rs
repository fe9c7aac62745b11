//! REST client for the chat API.
//!
//! Every call is a single request with no retries. Any transport error or
//! non-2xx status is a failure; callers only distinguish success from
//! failure.

use reqwest::{Client as HttpClient, Response};
use roovo_chat::{
    Conversation, ConversationId, MessageRecord, RecordError, SendMessageRequest, UserId,
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{BackendConfig, BackendError};

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: HttpClient,
    base: Url,
}

impl RestClient {
    /// Build a client from `config`.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = HttpClient::builder().timeout(config.request_timeout).build()?;
        let mut base = config.api_base()?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    /// API base URL (always ends in `/`).
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `POST /api/chat/messages`. The response body is ignored; the
    /// persisted record arrives through the push subscription.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<(), BackendError> {
        let url = self.endpoint("api/chat/messages")?;
        let response = self.http.post(url.clone()).json(request).send().await?;
        check_status(&url, response).await.map(drop)
    }

    /// `GET /api/chat/messages/{id}`: history, oldest first.
    pub async fn history(&self, id: ConversationId) -> Result<Vec<MessageRecord>, BackendError> {
        self.get_json(&format!("api/chat/messages/{id}")).await
    }

    /// `GET /api/chat/conversation/{id}`.
    pub async fn conversation(&self, id: ConversationId) -> Result<Conversation, BackendError> {
        self.get_json(&format!("api/chat/conversation/{id}")).await
    }

    /// `GET /api/chat/conversations/guest/{user}`: the user's inbox.
    pub async fn guest_conversations(
        &self,
        user: &UserId,
    ) -> Result<Vec<Conversation>, BackendError> {
        self.get_json(&format!("api/chat/conversations/guest/{user}")).await
    }

    /// Resolve `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url.clone()).send().await?;
        let body = check_status(&url, response).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(RecordError::from(e)))
    }
}

async fn check_status(url: &Url, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    tracing::debug!(%url, %status, "request rejected");
    Err(BackendError::Status { status: status.as_u16(), url: url.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(&BackendConfig { api_base_url: base.into(), ..BackendConfig::default() })
            .unwrap()
    }

    #[test]
    fn endpoints_keep_base_path() {
        let rest = client("http://api.test/v2");
        assert_eq!(
            rest.endpoint("api/chat/messages/42").unwrap().as_str(),
            "http://api.test/v2/api/chat/messages/42"
        );

        let rest = client("http://localhost:3002");
        assert_eq!(
            rest.endpoint("api/chat/conversations/guest/u-1").unwrap().as_str(),
            "http://localhost:3002/api/chat/conversations/guest/u-1"
        );
    }

    #[test]
    fn rejects_bad_base() {
        let result =
            RestClient::new(&BackendConfig { api_base_url: "not a url".into(), ..BackendConfig::default() });
        assert!(matches!(result, Err(BackendError::InvalidUrl(_))));
    }
}
