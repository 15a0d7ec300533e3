use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileConfig {
    /// Cookie that carries the session id between the form post and the
    /// page that shows its result.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Seconds an unread session is kept before it is swept.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl UserProfileConfig {
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Default for UserProfileConfig {
    fn default() -> Self {
        Self {
            session_cookie: default_session_cookie(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_session_cookie() -> String {
    "bbs_session".to_owned()
}

fn default_session_ttl_secs() -> u64 {
    15 * 60
}
