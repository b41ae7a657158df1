use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the document-database backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub connect_timeout_ms: u64,
}

impl MongoConfig {
    /// `host:port` as handed to the driver.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Credentials are only sent when a username is configured.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 27017,
            username: None,
            password: None,
            database: "cardbox".into(),
            connect_timeout_ms: 5000,
        }
    }
}

impl fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}
