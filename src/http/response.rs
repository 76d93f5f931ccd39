//! Response bodies for the session endpoints

use serde::{Deserialize, Serialize};

/// `{"status":"ok"}` acknowledgement for write endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Single value lookup, `value` is `null` when the key is absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueResponse {
    pub key: String,
    pub value: Option<String>,
}
