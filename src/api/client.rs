use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::api::models::{ErrorBody, Group, GroupPayload, GroupSummaries, Target};
use crate::app::AppSettings;
use crate::error::ApiError;

/// The group endpoints the editor talks to.
#[async_trait]
pub trait GroupsApi: Send + Sync {
    async fn summaries(&self) -> Result<GroupSummaries, ApiError>;
    async fn group(&self, id: i64) -> Result<Group, ApiError>;
    async fn create_group(&self, payload: &GroupPayload) -> Result<Group, ApiError>;
    async fn update_group(&self, id: i64, payload: &GroupPayload) -> Result<Group, ApiError>;
    async fn delete_group(&self, id: i64) -> Result<(), ApiError>;
    /// Uploads a CSV file and returns the targets the server parsed from it.
    async fn import_group(&self, file_name: &str, contents: Vec<u8>) -> Result<Vec<Target>, ApiError>;
}

pub struct ApiClient {
    pub http: HttpClient,
    base: Url,
    api_key: String,
}

impl ApiClient {
    pub fn from_settings(settings: &AppSettings) -> Result<Self, ApiError> {
        if settings.api_key.is_empty() {
            return Err(ApiError::Config("missing API key".into()));
        }
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self {
            http,
            base: Self::base_api(&settings.base_url)?,
            api_key: settings.api_key.clone(),
        })
    }

    fn base_api(base_url: &str) -> Result<Url, ApiError> {
        let trimmed = base_url.trim_end_matches('/');
        let api = if trimmed.ends_with("/api") { format!("{}/", trimmed) } else { format!("{}/api/", trimmed) };
        Url::parse(&api).map_err(|e| ApiError::Config(format!("bad server URL {:?}: {}", base_url, e)))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Config(format!("bad endpoint {:?}: {}", path, e)))
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Maps non-2xx responses to `ApiError::Server`, preferring the body's `message`.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        log::warn!("Request failed with {}: {}", status, message);
        Err(ApiError::Server { status: status.as_u16(), message })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = Self::check(self.with_auth(req).send().await?).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl GroupsApi for ApiClient {
    async fn summaries(&self) -> Result<GroupSummaries, ApiError> {
        let url = self.endpoint("groups/summary")?;
        log::debug!("GET {}", url);
        self.send_json(self.http.get(url)).await
    }

    async fn group(&self, id: i64) -> Result<Group, ApiError> {
        let url = self.endpoint(&format!("groups/{}", id))?;
        log::debug!("GET {}", url);
        self.send_json(self.http.get(url)).await
    }

    async fn create_group(&self, payload: &GroupPayload) -> Result<Group, ApiError> {
        let url = self.endpoint("groups/")?;
        log::debug!("POST {} ({} targets)", url, payload.targets.len());
        self.send_json(self.http.post(url).json(payload)).await
    }

    async fn update_group(&self, id: i64, payload: &GroupPayload) -> Result<Group, ApiError> {
        let url = self.endpoint(&format!("groups/{}", id))?;
        log::debug!("PUT {} ({} targets)", url, payload.targets.len());
        self.send_json(self.http.put(url).json(payload)).await
    }

    async fn delete_group(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("groups/{}", id))?;
        log::debug!("DELETE {}", url);
        Self::check(self.with_auth(self.http.delete(url)).send().await?).await?;
        Ok(())
    }

    async fn import_group(&self, file_name: &str, contents: Vec<u8>) -> Result<Vec<Target>, ApiError> {
        let url = self.endpoint("import/group")?;
        log::debug!("POST {} ({}, {} bytes)", url, file_name, contents.len());
        let part = multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);
        self.send_json(self.http.post(url).multipart(form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        let settings = AppSettings {
            base_url: base_url.into(),
            api_key: "secret".into(),
            ..AppSettings::default()
        };
        ApiClient::from_settings(&settings).unwrap()
    }

    #[test]
    fn endpoints_live_under_api() {
        let c = client("https://127.0.0.1:3333");
        assert_eq!(c.endpoint("groups/summary").unwrap().as_str(), "https://127.0.0.1:3333/api/groups/summary");
        assert_eq!(c.endpoint("groups/7").unwrap().as_str(), "https://127.0.0.1:3333/api/groups/7");
    }

    #[test]
    fn base_with_api_suffix_is_not_doubled() {
        let c = client("https://phish.local/api/");
        assert_eq!(c.endpoint("import/group").unwrap().as_str(), "https://phish.local/api/import/group");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let settings = AppSettings {
            base_url: "https://phish.local".into(),
            ..AppSettings::default()
        };
        assert!(matches!(ApiClient::from_settings(&settings), Err(ApiError::Config(_))));
    }

    #[test]
    fn unparseable_url_is_a_config_error() {
        let settings = AppSettings {
            base_url: "not a url".into(),
            api_key: "k".into(),
            ..AppSettings::default()
        };
        assert!(matches!(ApiClient::from_settings(&settings), Err(ApiError::Config(_))));
    }
}
