//! Form and View DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::value_object::Claims;

// ============================================================================
// Sign In
// ============================================================================

/// Sign-in form; missing fields are empty
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Data for the sign-in view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInView<'a> {
    pub title: &'a str,
    pub username: &'a str,
    /// Always empty; submitted passwords are never echoed
    pub password: &'a str,
    pub sign_in_error: &'a str,
    /// Path the form posts back to
    pub action: &'a str,
    pub sign_in_url: &'a str,
    pub sign_out_url: &'a str,
}

/// Data for the view shown while the browser follows a `Refresh` header
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRedirectView<'a> {
    pub title: &'a str,
    pub dashboard_url: &'a str,
}

// ============================================================================
// Sign Out
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOutView<'a> {
    pub title: &'a str,
    pub sign_in_url: &'a str,
    pub sign_out_url: &'a str,
}

// ============================================================================
// Forbidden
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForbiddenView<'a> {
    pub title: &'a str,
    pub sign_in_url: &'a str,
    pub sign_out_url: &'a str,
    /// Claims of the signed-in user who was refused
    pub user: &'a Claims,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_in_view_field_names() {
        let view = SignInView {
            title: "Sign In",
            username: "hello",
            password: "",
            sign_in_error: "oops",
            action: "/signin",
            sign_in_url: "/signin",
            sign_out_url: "/signout",
        };
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "title": "Sign In",
                "username": "hello",
                "password": "",
                "signInError": "oops",
                "action": "/signin",
                "signInUrl": "/signin",
                "signOutUrl": "/signout",
            })
        );
    }

    #[test]
    fn test_sign_in_form_defaults() {
        let form: SignInForm = serde_json::from_value(json!({"username": "hello"})).unwrap();
        assert_eq!(form.username, "hello");
        assert_eq!(form.password, "");
    }
}
