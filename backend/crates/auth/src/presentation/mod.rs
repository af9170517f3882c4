//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, middleware and views.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod view;

pub use handlers::AuthAppState;
pub use middleware::{
    AuthContext, AuthMiddlewareState, ClaimsGuard, CurrentUser, StaticUser, require_claims,
    with_static_user, with_user,
};
pub use router::auth_router;
pub use view::{ViewError, ViewRenderer};
