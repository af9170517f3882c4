//! Sign In Use Case
//!
//! Authenticates a user against the credential resolver and issues a token.

use std::sync::Arc;

use crate::application::token::TokenCodec;
use crate::domain::repository::CredentialResolver;
use crate::domain::value_object::{Claims, Username, claims::USERNAME};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub username: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    /// Signed token for the cookie
    pub token: String,
    /// Claims embedded in the token, without `iat`/`exp`
    pub claims: Claims,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: CredentialResolver,
{
    resolver: Arc<R>,
    codec: Arc<TokenCodec>,
}

impl<R> SignInUseCase<R>
where
    R: CredentialResolver,
{
    pub fn new(resolver: Arc<R>, codec: Arc<TokenCodec>) -> Self {
        Self { resolver, codec }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let username = Username::new(&input.username);
        if username.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let claims = match self
            .resolver
            .lookup(username.as_str(), &input.password)
            .await
        {
            Ok(claims) => claims,
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!(username = %username, "Invalid sign-in attempt");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        // Resolvers backed by callables may omit the username claim
        let claims = if claims.contains_key(USERNAME) {
            claims
        } else {
            Claims::for_user(username.as_str()).merge(&claims)
        };

        let token = self.codec.issue(&claims)?;

        tracing::info!(username = %username, "User signed in");

        Ok(SignInOutput { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::{FnCredentials, StaticCredentials};
    use secrecy::SecretString;
    use serde_json::json;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SecretString::from("reallysecret".to_string()), None).unwrap())
    }

    fn input(username: &str, password: &str) -> SignInInput {
        SignInInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_issues_verifiable_token() {
        let resolver = StaticCredentials::from_passwords([("hello", "world")]).unwrap();
        let codec = codec();
        let use_case = SignInUseCase::new(Arc::new(resolver), codec.clone());

        let output = use_case.execute(input("Hello", "world")).await.unwrap();
        assert_eq!(output.claims.username(), Some("hello"));

        let verified = codec.verify(&output.token).unwrap();
        assert_eq!(verified.without_metadata(), output.claims);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_alike() {
        let resolver = StaticCredentials::from_passwords([("hello", "world")]).unwrap();
        let use_case = SignInUseCase::new(Arc::new(resolver), codec());

        for (u, p) in [("hello", "nope"), ("nobody", "world"), ("", "")] {
            assert!(matches!(
                use_case.execute(input(u, p)).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn test_callable_resolver_gets_username_claim() {
        let resolver = FnCredentials::new(|username: String, password: String| async move {
            if password == "pw" {
                let mut claims = Claims::new();
                claims.insert("admin", username == "root");
                Ok(claims)
            } else {
                Err(AuthError::InvalidCredentials)
            }
        });
        let use_case = SignInUseCase::new(Arc::new(resolver), codec());

        let output = use_case.execute(input("ROOT", "pw")).await.unwrap();
        assert_eq!(output.claims.username(), Some("root"));
        assert_eq!(output.claims.get("admin"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_resolver_failure_propagates() {
        let resolver = FnCredentials::new(|_: String, _: String| async {
            Err::<Claims, _>(AuthError::Internal("backend unavailable".to_string()))
        });
        let use_case = SignInUseCase::new(Arc::new(resolver), codec());

        assert!(matches!(
            use_case.execute(input("hello", "world")).await,
            Err(AuthError::Internal(_))
        ));
    }
}
