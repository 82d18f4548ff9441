//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds
/// - `expire_at`: Optional absolute expiration (Unix milliseconds), wins over `ttl`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub expire_at: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// Resolves the absolute expiration for this request.
    pub fn resolve_expire_at(&self, now: i64, default_ttl: u64) -> i64 {
        self.expire_at
            .unwrap_or_else(|| expire_after(now, self.ttl.unwrap_or(default_ttl)))
    }
}

/// Request body for PUT /expire/:key
#[derive(Debug, Clone, Deserialize)]
pub struct ExpireRequest {
    /// New absolute expiration (Unix milliseconds)
    pub expire_at: i64,
}

/// Request body for POST /incr/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncrRequest {
    /// Amount to add, defaults to 1
    #[serde(default)]
    pub delta: Option<i64>,
    /// TTL in seconds for the written value
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl IncrRequest {
    /// Parses an optional JSON body. Empty or blank bodies yield the defaults.
    pub fn from_body(body: &[u8]) -> Result<Self, String> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|err| format!("Invalid increment body: {}", err))
    }
}

/// Checks a key against the API's key rules.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Absolute expiration `ttl_secs` seconds after `now` (Unix milliseconds).
pub fn expire_after(now: i64, ttl_secs: u64) -> i64 {
    let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    now.saturating_add(ttl_ms)
}
