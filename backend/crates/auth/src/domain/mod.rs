//! Domain Layer
//!
//! Value objects, entities, and the identity-provider ports.

pub mod entity;
pub mod port;
pub mod value_object;

// Re-exports
pub use entity::{token::Token, user::User};
pub use port::{SignInProvider, SignUpProvider};
pub use value_object::{new_user::NewUser, session::Session};
