use serde::{Deserialize, Serialize};

/// An authenticated identity, valid between sign-in and sign-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub owner_id: String,
    pub display_label: String,
}

impl Session {
    pub fn new(owner_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            display_label: email.into(),
        }
    }
}
