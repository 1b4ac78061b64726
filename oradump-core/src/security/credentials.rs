//! Schema credentials with automatic memory zeroing.
//!
//! # Security
//! - User and password are stored in `Zeroizing<T>` containers
//! - Memory is cleared when the credentials go out of scope
//! - `Debug` output never shows the password

use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Credentials for one configured schema.
///
/// # Example
///
/// ```rust
/// use oradump_core::security::Credentials;
///
/// let creds = Credentials::new("HR".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "HR");
/// assert!(creds.has_password());
/// assert!(!format!("{creds:?}").contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    ///
    /// An empty password is treated as absent.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password.filter(|p| !p.is_empty())),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// The password, for handing to the driver at connect time only.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Replaces the password, e.g. after prompting on the terminal.
    pub fn set_password(&mut self, password: String) {
        self.password.zeroize();
        *self.password = Some(password).filter(|p| !p.is_empty());
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}
