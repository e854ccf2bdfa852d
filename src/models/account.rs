use serde::{Deserialize, Serialize};

/// The id/email pair used by account pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalAccount {
    pub id: u64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub id: u64,
    pub url: String,
}
