//! YAML Credential File
//!
//! File-backed credential source:
//!
//! ```yaml
//! hello:
//!   password: world
//!   claims:
//!     admin: false
//! ```
//!
//! Scalar passwords of any YAML type are stringified; `claims` is optional.

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::domain::entity::RawUserRecord;
use crate::domain::repository::CredentialLoader;
use crate::domain::value_object::Claims;
use crate::error::LoadError;

#[derive(Debug, Clone)]
pub struct YamlCredentialFile {
    path: PathBuf,
    origin: String,
}

impl YamlCredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let origin = path.display().to_string();
        Self { path, origin }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialLoader for YamlCredentialFile {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn load(&self) -> Result<Vec<(String, RawUserRecord)>, LoadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|error| LoadError::Io {
            origin: self.origin.clone(),
            error,
        })?;
        parse_credentials(&self.origin, &text)
    }

    fn watch_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Parse a YAML credential document
///
/// An empty document is an empty table.
pub fn parse_credentials(
    origin: &str,
    text: &str,
) -> Result<Vec<(String, RawUserRecord)>, LoadError> {
    let parse_error = |message: String| LoadError::Parse {
        origin: origin.to_string(),
        message,
    };

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: YamlValue = serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
    let users = match document {
        YamlValue::Null => return Ok(Vec::new()),
        YamlValue::Mapping(users) => users,
        _ => return Err(parse_error("top level must be a mapping of usernames".to_string())),
    };

    let mut records = Vec::with_capacity(users.len());
    for (key, value) in users {
        let username = scalar_to_string(&key)
            .ok_or_else(|| parse_error("usernames must be scalars".to_string()))?;
        let record = parse_record(&value)
            .map_err(|message| parse_error(format!("user {username}: {message}")))?;
        records.push((username, record));
    }
    Ok(records)
}

fn parse_record(value: &YamlValue) -> Result<RawUserRecord, String> {
    let fields = match value {
        YamlValue::Null => return Ok(RawUserRecord::default()),
        YamlValue::Mapping(fields) => fields,
        _ => return Err("record must be a mapping".to_string()),
    };

    let password = match fields.get("password") {
        None | Some(YamlValue::Null) => None,
        Some(value) => Some(
            scalar_to_string(value).ok_or_else(|| "password must be a scalar".to_string())?,
        ),
    };

    let claims = match fields.get("claims") {
        None | Some(YamlValue::Null) => Claims::new(),
        Some(value @ YamlValue::Mapping(_)) => {
            match serde_json::to_value(value).map_err(|e| format!("claims: {e}"))? {
                JsonValue::Object(map) => Claims::from(map),
                _ => return Err("claims must be a mapping".to_string()),
            }
        }
        Some(_) => return Err("claims must be a mapping".to_string()),
    };

    Ok(RawUserRecord { password, claims })
}

fn scalar_to_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}
