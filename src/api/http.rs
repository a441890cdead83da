use super::{ ApiError, ChatBackend };
use crate::models::chat::{
    decode_history,
    RenameRequest,
    RenameResponse,
    SendMessageRequest,
    SendMessageResponse,
};
use crate::models::{ Conversation, StoredMessage };
use crate::session::SessionProvider;
use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, RequestBuilder, Response };
use serde_json::Value as JsonValue;
use std::sync::Arc;
use url::Url;

pub struct HttpBackend {
    http: HttpClient,
    base_url: Url,
    session: Arc<dyn SessionProvider>,
}

impl HttpBackend {
    pub fn new(base_url: Url, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
            session,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // A missing token still goes out as an empty bearer; the backend decides.
    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(self.session.access_token().unwrap_or_default())
    }

    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let url = self.endpoint(&["api", "bot-chat", "conversations"])?;
        debug!("GET {}", url);
        let resp = self.authorized(self.http.get(url)).send().await?;
        Ok(Self::check(resp).await?.json::<Vec<Conversation>>().await?)
    }

    async fn rename_conversation(&self, id: &str, new_title: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["api", "bot-chat", "conversations", id, "title"])?;
        debug!("PATCH {}", url);
        let resp = self
            .authorized(self.http.patch(url))
            .json(&(RenameRequest { new_title }))
            .send().await?;
        let data = Self::check(resp).await?.json::<RenameResponse>().await?;
        Ok(data.title)
    }

    async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>, ApiError> {
        let url = self.endpoint(&["api", "bot-chat", "conversation", conversation_id, "messages"])?;
        debug!("GET {}", url);
        let resp = self.authorized(self.http.get(url)).send().await?;
        let rows = Self::check(resp).await?.json::<Vec<JsonValue>>().await?;
        Ok(decode_history(rows))
    }

    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>
    ) -> Result<JsonValue, ApiError> {
        let url = self.endpoint(&["api", "bot-chat", "chat"])?;
        debug!("POST {} (conversation {:?})", url, conversation_id);
        let resp = self
            .authorized(self.http.post(url))
            .json(&(SendMessageRequest { message, conversation_id }))
            .send().await?;
        let data = Self::check(resp).await?.json::<SendMessageResponse>().await?;
        Ok(data.reply)
    }
}
