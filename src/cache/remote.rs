//! Remote cache tier implementations.

use super::config::RemoteEndpoint;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use url::Url;

/// A networked key-value tier behind the local cache.
///
/// `Ok(None)` means the key is unknown. Backend trouble of any kind is
/// [`Error::RemoteUnavailable`], never a silent miss.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    /// `ttl = None` stores without expiry.
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// `false` only for the disabled stand-in; callers may skip work on it.
    fn enabled(&self) -> bool {
        true
    }
    fn name(&self) -> &'static str;
}

/// Stored payloads are JSON text; anything else (e.g. a legacy plain string)
/// comes back as the raw string.
pub fn decode_payload(raw: String) -> Value {
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!("remote payload is not JSON, returning raw string");
            Value::String(raw)
        }
    }
}

fn ttl_seconds(ttl: Duration) -> Result<u64> {
    match ttl.as_secs() {
        0 => Err(Error::validation_with_context(
            "ttl must be at least one second",
            ErrorContext::new()
                .with_field_path("ttl")
                .with_details(format!("got {:?}", ttl)),
        )),
        secs => Ok(secs),
    }
}

/// Remote tier used when no backend is configured. Every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRemoteCache;

impl DisabledRemoteCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteCache for DisabledRemoteCache {
    async fn get(&self, _: &str) -> Result<Option<Value>> {
        Ok(None)
    }
    async fn set(&self, _: &str, _: &Value, _: Option<Duration>) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &str) -> Result<()> {
        Ok(())
    }
    fn enabled(&self) -> bool {
        false
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a Redis-over-REST store (Upstash / Vercel KV command API).
///
/// Each operation POSTs a JSON command array such as `["GET", key]` to the
/// endpoint and reads `{"result": ...}` or `{"error": ...}` back.
pub struct RestRemoteCache {
    http_client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl RestRemoteCache {
    pub fn new(remote: &RemoteEndpoint) -> Result<Self> {
        let endpoint = Url::parse(remote.url.trim()).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid remote cache URL: {}", e),
                ErrorContext::new().with_field_path("KV_REST_API_URL"),
            )
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "remote cache URL must use http or https",
                ErrorContext::new()
                    .with_field_path("KV_REST_API_URL")
                    .with_details(format!("scheme {}", endpoint.scheme())),
            ));
        }
        let http_client = reqwest::Client::builder()
            .timeout(remote.timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            endpoint,
            token: remote.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn command(&self, command: &'static str, args: Vec<Value>) -> Result<Option<Value>> {
        let unavailable = |msg: String| {
            Error::remote_unavailable(
                msg,
                ErrorContext::new()
                    .with_details(command)
                    .with_source("remote_cache"),
            )
        };

        let mut body = Vec::with_capacity(args.len() + 1);
        body.push(Value::String(command.to_string()));
        body.extend(args);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                unavailable(format!("request {}: {}", kind, e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read response: {}", e)))?;
        let parsed: Option<CommandResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let detail = parsed
                .and_then(|r| r.error)
                .unwrap_or_else(|| text.chars().take(200).collect());
            return Err(unavailable(format!("HTTP {}: {}", status.as_u16(), detail)));
        }
        let parsed = parsed.ok_or_else(|| unavailable("malformed response body".to_string()))?;
        if let Some(err) = parsed.error {
            return Err(unavailable(err));
        }
        Ok(parsed.result)
    }
}

#[async_trait]
impl RemoteCache for RestRemoteCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let result = self.command("GET", vec![Value::from(key)]).await?;
        Ok(match result {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(decode_payload(raw)),
            // Not produced by GET, but keep whatever the backend sent.
            Some(other) => Some(other),
        })
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let mut args = vec![Value::from(key), Value::from(payload)];
        if let Some(ttl) = ttl {
            args.push(Value::from("EX"));
            args.push(Value::from(ttl_seconds(ttl)?));
        }
        self.command("SET", args).await.map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command("DEL", vec![Value::from(key)]).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

impl std::fmt::Debug for RestRemoteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestRemoteCache")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

struct StoredEntry {
    payload: String,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

/// In-process remote tier with the same serialization and TTL rules as the
/// REST backend. Useful for local development and tests.
#[derive(Default)]
pub struct InMemoryRemoteCache {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryRemoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw payload as-is, bypassing serialization.
    pub fn insert_raw(&self, key: impl Into<String>, payload: impl Into<String>) {
        self.write().insert(
            key.into(),
            StoredEntry {
                payload: payload.into(),
                expires_at: None,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.read().values().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredEntry>> {
        self.entries.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredEntry>> {
        self.entries.write().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl RemoteCache for InMemoryRemoteCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.write();
        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries
            .get(key)
            .map(|entry| decode_payload(entry.payload.clone())))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let expires_at = match ttl {
            Some(ttl) => Some(Instant::now() + Duration::from_secs(ttl_seconds(ttl)?)),
            None => None,
        };
        let payload = serde_json::to_string(value)?;
        self.write().insert(
            key.to_string(),
            StoredEntry {
                payload,
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.write().remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_payload_falls_back_to_raw() {
        assert_eq!(decode_payload(r#"{"a":1}"#.into()), json!({"a": 1}));
        assert_eq!(decode_payload("\"quoted\"".into()), json!("quoted"));
        assert_eq!(decode_payload("English".into()), json!("English"));
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let remote = DisabledRemoteCache::new();
        assert!(!remote.enabled());
        remote.set("k", &json!(1), None).await.unwrap();
        assert_eq!(remote.get("k").await.unwrap(), None);
        remote.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_remote_roundtrip_and_legacy() {
        let remote = InMemoryRemoteCache::new();
        remote.set("k", &json!({"lang": "Thai"}), None).await.unwrap();
        assert_eq!(remote.get("k").await.unwrap(), Some(json!({"lang": "Thai"})));

        remote.insert_raw("legacy", "not json");
        assert_eq!(remote.get("legacy").await.unwrap(), Some(json!("not json")));

        remote.delete("k").await.unwrap();
        remote.delete("k").await.unwrap();
        assert_eq!(remote.get("k").await.unwrap(), None);
        assert_eq!(remote.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_remote_rejects_sub_second_ttl() {
        let remote = InMemoryRemoteCache::new();
        let err = remote
            .set("k", &json!(1), Some(Duration::from_millis(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(remote.is_empty());
    }

    #[test]
    fn test_rest_rejects_bad_endpoint() {
        let endpoint = |url: &str| RemoteEndpoint {
            url: url.to_string(),
            token: "t".into(),
            timeout: Duration::from_secs(1),
        };
        assert!(RestRemoteCache::new(&endpoint("not a url")).is_err());
        assert!(RestRemoteCache::new(&endpoint("redis://localhost:6379")).is_err());
        let ok = RestRemoteCache::new(&endpoint("https://kv.example.com")).unwrap();
        assert_eq!(ok.endpoint().host_str(), Some("kv.example.com"));
        assert_eq!(ok.name(), "rest");
    }
}
