//! Caller authentication: JWT validation and the per-request session.

mod claims;
mod jwt;
mod session;

pub use claims::{Claims, MANAGE_DEVICES, VIEW_DEVICES};
pub use jwt::JwtValidator;
pub use session::SessionContext;
