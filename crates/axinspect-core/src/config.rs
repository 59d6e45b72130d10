//! Inspection configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::node::Role;

/// Configuration for scanning and inspecting a window.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct InspectConfig {
    /// Descend into objects with the document role.
    #[builder(default = "false")]
    #[serde(default)]
    pub drill_into_documents: bool,

    /// Delay before the first "still searching" notification.
    #[builder(default = "2000")]
    #[serde(default = "default_heartbeat_delay_ms")]
    pub heartbeat_delay_ms: u64,

    /// Interval between further "still searching" notifications.
    #[builder(default = "1500")]
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Application name of the inspector itself; its own dialogs are not scanned.
    #[builder(default)]
    #[serde(default)]
    pub self_app_name: Option<String>,

    /// Favorites file (None = platform config directory).
    #[builder(default)]
    #[serde(default)]
    pub favorites_path: Option<PathBuf>,
}

fn default_heartbeat_delay_ms() -> u64 {
    2000
}

fn default_heartbeat_interval_ms() -> u64 {
    1500
}

impl InspectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.heartbeat_interval_ms {
            return Err("Heartbeat interval must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl InspectConfig {
    /// Create a new config builder.
    pub fn builder() -> InspectConfigBuilder {
        InspectConfigBuilder::default()
    }

    /// Create a config with default options.
    pub fn new() -> Self {
        Self {
            drill_into_documents: false,
            heartbeat_delay_ms: default_heartbeat_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            self_app_name: None,
            favorites_path: None,
        }
    }

    /// Whether the scan descends into an object with this role.
    pub fn should_descend(&self, role: Role) -> bool {
        role != Role::Document || self.drill_into_documents
    }

    pub fn heartbeat_delay(&self) -> Duration {
        Duration::from_millis(self.heartbeat_delay_ms)
    }

    /// Never zero, even for configs that bypassed the builder.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self::new()
    }
}
