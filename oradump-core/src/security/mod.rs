//! Credential protection for configured schemas.
//!
//! # Module Structure
//! - `credentials`: Secure credential container with automatic memory zeroing

mod credentials;

pub use credentials::Credentials;
