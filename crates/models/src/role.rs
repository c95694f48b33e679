use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to an authenticated request. Never stored on the user
/// record: it is recomputed at every login by comparing the login email
/// against the configured administrator email, which keeps a tampered
/// database column from granting privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Derive the role for a login: admin iff the email exactly matches the
    /// configured admin email (and one is configured at all).
    pub fn for_email(email: &str, admin_email: &str) -> Self {
        if !admin_email.is_empty() && email == admin_email {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// "User" / "Admin", for the login success message.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
