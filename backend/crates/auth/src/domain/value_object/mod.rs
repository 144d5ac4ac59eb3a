//! Value Object Module

pub mod display_name;
pub mod email;
pub mod new_user;
pub mod password;
pub mod session;
