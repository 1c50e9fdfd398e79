//! Client configuration.
//!
//! # Design
//! `Configuration` is an immutable value record. The only defaulting rule is
//! that an empty `accept` becomes `application/json`; every other field is
//! copied verbatim and the base URL is not validated until a request is
//! assembled from it.
//!
//! Deserialization goes through the same constructor, so a configuration
//! loaded from a file obeys the same rule as one built in code.

use std::fmt;

use serde::Deserialize;

/// The single media type this client negotiates.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Base URL, optional basic-auth credentials and the accept value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawConfiguration")]
pub struct Configuration {
    base_url: String,
    username: String,
    password: String,
    accept: String,
}

impl Configuration {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        accept: impl Into<String>,
    ) -> Self {
        let accept = accept.into();
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            accept: if accept.is_empty() {
                JSON_MEDIA_TYPE.to_string()
            } else {
                accept
            },
        }
    }

    /// Configuration without credentials and with the JSON accept value.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(base_url, "", "", JSON_MEDIA_TYPE)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// Basic auth is applied only when both username and password are set.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "***" };
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &password)
            .field("accept", &self.accept)
            .finish()
    }
}

#[derive(Deserialize)]
struct RawConfiguration {
    base_url: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    accept: String,
}

impl From<RawConfiguration> for Configuration {
    fn from(raw: RawConfiguration) -> Self {
        Configuration::new(raw.base_url, raw.username, raw.password, raw.accept)
    }
}
