//! Credential Table Entity
//!
//! Immutable snapshot of all users, keyed by canonical username. A table is
//! built once from a credential source and never mutated; reloads build a new
//! table and swap it in whole.

use std::collections::HashMap;

use crate::domain::entity::user_record::{RawUserRecord, UserRecord};
use crate::domain::value_object::{Claims, Username};
use crate::error::LoadError;

#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    origin: String,
    users: HashMap<Username, UserRecord>,
}

impl CredentialTable {
    /// Build a table, rejecting usernames that collide after lowercasing
    pub fn from_records<I, S>(origin: impl Into<String>, records: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (S, RawUserRecord)>,
        S: AsRef<str>,
    {
        let origin = origin.into();
        let mut users = HashMap::new();

        for (name, raw) in records {
            let username = Username::new(name.as_ref());
            if users.contains_key(&username) {
                return Err(LoadError::DuplicateUsername {
                    username: name.as_ref().to_string(),
                    origin,
                });
            }
            let record = UserRecord::from_raw(username.clone(), raw);
            users.insert(username, record);
        }

        Ok(Self { origin, users })
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(&Username::new(username))
    }

    /// Claims for a matching username and password
    ///
    /// Unknown user and wrong password are indistinguishable.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Claims> {
        self.get(username)
            .filter(|record| record.verify(password))
            .map(UserRecord::token_claims)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &Username> {
        self.users.keys()
    }
}
