//! Shared Kernel - vocabulary shared by every backend crate
//!
//! Only the error classification lives here:
//! - [`error::kind::ErrorKind`] maps a failure to an HTTP status class
//! - [`error::app_error::AppError`] carries kind, message, action and source
//!
//! Domain crates define their own error enums and convert into [`AppError`]
//! at the presentation boundary.
//!
//! [`AppError`]: error::app_error::AppError

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
