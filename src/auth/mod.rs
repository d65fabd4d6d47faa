//! Caller identity for authenticated routes. Tokens are issued elsewhere;
//! this module only verifies them.

pub mod jwt;

pub use jwt::{AuthUser, Claims, JwtKeys};
