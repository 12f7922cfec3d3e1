//! Client configuration

use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Escape every non-ASCII character in encoded requests
    #[serde(default)]
    pub force_ascii: bool,
}

impl ClientConfig {
    pub fn with_force_ascii(mut self, force_ascii: bool) -> Self {
        self.force_ascii = force_ascii;
        self
    }
}
