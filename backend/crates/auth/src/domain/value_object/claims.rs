//! Claims
//!
//! The authorization payload carried in a token. Keys are opaque to the
//! token codec and middleware; only guard predicates give them meaning.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim holding the signed-in username
pub const USERNAME: &str = "username";
/// Issued-at, seconds since the Unix epoch
pub const ISSUED_AT: &str = "iat";
/// Expiry, seconds since the Unix epoch
pub const EXPIRES_AT: &str = "exp";

/// Open mapping of claim names to values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims holding only `username`
    pub fn for_user(username: impl Into<String>) -> Self {
        let mut claims = Self::new();
        claims.insert(USERNAME, username.into());
        claims
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn username(&self) -> Option<&str> {
        self.0.get(USERNAME).and_then(Value::as_str)
    }

    /// `true` only when the claim is the boolean `true`
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.0.get(ISSUED_AT).and_then(Value::as_i64)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(EXPIRES_AT).and_then(Value::as_i64)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Overlay `other` on top of `self`; keys in `other` win
    pub fn merge(mut self, other: &Claims) -> Self {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    /// Drop token metadata (`iat`, `exp`)
    pub fn without_metadata(mut self) -> Self {
        self.0.remove(ISSUED_AT);
        self.0.remove(EXPIRES_AT);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Claims> for Value {
    fn from(claims: Claims) -> Self {
        Value::Object(claims.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_flag_requires_boolean_true() {
        let c = claims(json!({"admin": true, "staff": "true", "editor": 1, "guest": false}));
        assert!(c.flag("admin"));
        assert!(!c.flag("staff"));
        assert!(!c.flag("editor"));
        assert!(!c.flag("guest"));
        assert!(!c.flag("missing"));
    }

    #[test]
    fn test_merge_other_wins() {
        let base = Claims::for_user("hello");
        let merged = base.merge(&claims(json!({"username": "Hello", "admin": false})));
        assert_eq!(merged.username(), Some("Hello"));
        assert_eq!(merged.get("admin"), Some(&json!(false)));
    }

    #[test]
    fn test_without_metadata() {
        let c = claims(json!({"username": "hello", "iat": 1, "exp": 2}));
        assert_eq!(c.issued_at(), Some(1));
        assert_eq!(c.expires_at(), Some(2));
        assert_eq!(c.without_metadata(), Claims::for_user("hello"));
    }

    #[test]
    fn test_transparent_serde() {
        let c = claims(json!({"username": "hello", "roles": ["a", "b"]}));
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({"username": "hello", "roles": ["a", "b"]})
        );
    }
}
