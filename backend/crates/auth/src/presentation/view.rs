//! View Rendering
//!
//! The auth layer renders pages through a caller-supplied [`ViewRenderer`];
//! templating itself lives outside this crate.

use axum::response::Html;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Renders a named view with JSON data into an HTML document
pub trait ViewRenderer: Send + Sync + 'static {
    fn render(&self, view: &str, data: &Value) -> Result<String, ViewError>;
}

#[derive(Debug, Error)]
#[error("Failed to render view {view:?}: {message}")]
pub struct ViewError {
    pub view: String,
    pub message: String,
}

impl ViewError {
    pub fn new(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            message: message.into(),
        }
    }
}

pub(crate) fn render_view<T>(
    views: &dyn ViewRenderer,
    view: &str,
    data: &T,
) -> Result<Html<String>, ViewError>
where
    T: Serialize,
{
    let data = serde_json::to_value(data).map_err(|e| ViewError::new(view, e.to_string()))?;
    views.render(view, &data).map(Html)
}
