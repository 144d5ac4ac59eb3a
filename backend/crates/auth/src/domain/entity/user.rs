//! User Entity
//!
//! Account as reported back by the identity provider after creation.

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Provider-assigned unique identifier
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

impl User {
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }
}
