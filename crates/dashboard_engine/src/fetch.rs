use std::time::Duration;

use dashboard_core::{Conversation, ConversationStates, Message, PluginCatalog};
use dashboard_logging::dash_debug;
use futures_util::StreamExt;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{DataError, FailureKind};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Root of the local data service, e.g. `http://127.0.0.1:3001`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3001".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            max_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Read-only access to the local data service.
#[async_trait::async_trait]
pub trait DataFetcher: Send + Sync {
    async fn get_conversations(&self) -> Result<Vec<Conversation>, DataError>;

    async fn get_conversation_states(&self) -> Result<ConversationStates, DataError>;

    async fn get_conversation_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, DataError>;

    async fn get_plugin_data(&self) -> Result<PluginCatalog, DataError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDataFetcher {
    settings: FetchSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestDataFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, DataError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| DataError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(DataError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| DataError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DataError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DataError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, DataError> {
        let url = self.endpoint(segments)?;
        dash_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|err| DataError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl DataFetcher for ReqwestDataFetcher {
    async fn get_conversations(&self) -> Result<Vec<Conversation>, DataError> {
        let body = self.get_json(&["api", "conversations"]).await?;
        decode_list(body, "conversations")
    }

    async fn get_conversation_states(&self) -> Result<ConversationStates, DataError> {
        let body = self.get_json(&["api", "conversations", "states"]).await?;
        let body = match body {
            Value::Object(mut map) if map.get("states").is_some_and(Value::is_object) => {
                map.remove("states").unwrap_or_default()
            }
            other => other,
        };
        decode(body)
    }

    async fn get_conversation_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, DataError> {
        let body = self
            .get_json(&["api", "conversations", conversation_id, "messages"])
            .await?;
        decode_list(body, "messages")
    }

    async fn get_plugin_data(&self) -> Result<PluginCatalog, DataError> {
        let body = self.get_json(&["api", "plugins"]).await?;
        decode(body)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DataError> {
    serde_json::from_value(value).map_err(|err| DataError::new(FailureKind::Decode, err.to_string()))
}

/// Accepts either a bare array or an object wrapping the array under `key`.
fn decode_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, DataError> {
    match value {
        Value::Array(_) => decode(value),
        Value::Object(mut map) => match map.remove(key) {
            Some(list) => decode(list),
            None => Err(DataError::new(
                FailureKind::Decode,
                format!("expected an array or an object with '{key}'"),
            )),
        },
        _ => Err(DataError::new(
            FailureKind::Decode,
            format!("expected an array of {key}"),
        )),
    }
}

fn too_large(max_bytes: u64, actual: u64) -> DataError {
    DataError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> DataError {
    if err.is_timeout() {
        return DataError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return DataError::new(FailureKind::Decode, err.to_string());
    }
    DataError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_keeps_base_path_and_escapes_ids() {
        let fetcher = ReqwestDataFetcher::new(FetchSettings {
            base_url: "http://localhost:9000/dash/".to_string(),
            ..FetchSettings::default()
        })
        .unwrap();
        let url = fetcher
            .endpoint(&["api", "conversations", "a b/c", "messages"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/dash/api/conversations/a%20b%2Fc/messages"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let err = ReqwestDataFetcher::new(FetchSettings {
            base_url: "mailto:someone@example.com".to_string(),
            ..FetchSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn list_decoding_accepts_envelope() {
        let wrapped: Vec<u32> = decode_list(json!({ "items": [1, 2] }), "items").unwrap();
        assert_eq!(wrapped, vec![1, 2]);
        let bare: Vec<u32> = decode_list(json!([3]), "items").unwrap();
        assert_eq!(bare, vec![3]);
        let err = decode_list::<u32>(json!({ "other": [] }), "items").unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }
}
