use serde::{Deserialize, Serialize};

/// One persisted piece of authentication state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Expiry in epoch milliseconds. `None` is a session cookie without a fixed
    /// expiry, not an expired one.
    pub expires: Option<i64>,
    #[serde(default = "default_secure")]
    pub secure: bool,
}

fn default_secure() -> bool {
    true
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            secure: default_secure(),
        }
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        matches!(self.expires, Some(at) if at <= now_millis)
    }
}
