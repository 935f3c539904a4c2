//! Current user lookup for the user identity check.

use std::collections::HashMap;
use std::env;

/// Supplies the identity of the user running the application.
///
/// An empty string means the value is unknown.
pub trait UserEnvironment: Send + Sync {
    fn username(&self) -> String;
    fn domain(&self) -> String;
    fn email_address(&self) -> String;
    fn home_folder(&self) -> String;
}

/// Reads the user identity from the process environment.
///
/// The domain comes from `USERDOMAIN` when set, otherwise the host name.
/// There is no portable source for an email address, so it is read from
/// `EMAIL` and is empty when that is unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUser;

impl UserEnvironment for CurrentUser {
    fn username(&self) -> String {
        env_var("USER")
            .or_else(|| env_var("USERNAME"))
            .unwrap_or_default()
    }

    fn domain(&self) -> String {
        env_var("USERDOMAIN")
            .or_else(|| {
                hostname::get()
                    .ok()
                    .and_then(|name| name.into_string().ok())
            })
            .unwrap_or_default()
    }

    fn email_address(&self) -> String {
        env_var("EMAIL").unwrap_or_default()
    }

    fn home_folder(&self) -> String {
        dirs::home_dir()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Fixed user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticUser {
    pub username: String,
    pub domain: String,
    pub email_address: String,
    pub home_folder: String,
}

impl StaticUser {
    /// Builds from a map keyed by the license field names
    /// (`Username`, `Domain`, `Email Address`, `Home Folder`).
    /// Unknown keys are ignored.
    #[must_use]
    pub fn from_map(values: &HashMap<String, String>) -> Self {
        let get = |key: &str| values.get(key).cloned().unwrap_or_default();
        Self {
            username: get("Username"),
            domain: get("Domain"),
            email_address: get("Email Address"),
            home_folder: get("Home Folder"),
        }
    }
}

impl UserEnvironment for StaticUser {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn domain(&self) -> String {
        self.domain.clone()
    }

    fn email_address(&self) -> String {
        self.email_address.clone()
    }

    fn home_folder(&self) -> String {
        self.home_folder.clone()
    }
}
