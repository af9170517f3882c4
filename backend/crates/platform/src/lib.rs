//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password verification against plaintext or Argon2id PHC secrets
//! - Cookie header building and extraction
//! - Bearer credential extraction from request headers
//! - Random bytes / Base64 helpers

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
