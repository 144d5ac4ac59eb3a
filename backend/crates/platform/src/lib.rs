//! Platform - HTTP transport primitives shared by the backend crates
//!
//! - `Authorization: <scheme> <credential>` header parsing
//! - `Set-Cookie` rendering for the session cookie

pub mod authorization;
pub mod cookie;
