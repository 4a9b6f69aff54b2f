//! Bridge configuration.
//!
//! Defaults reproduce the three-stream deployment (`EEG_`, `PPG_`, `ACC_`)
//! with 16 KiB rings and 2 KiB transfers. A TOML file can override any of it:
//!
//! ```toml
//! ring_capacity = 16384
//! transfer_unit = 2048
//! backpressure = "retain"
//!
//! [[channels]]
//! id = 0
//! tag = "EEG_"
//! notify_handle = 0x0010
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::Bridge::BackpressurePolicy;
use crate::Core::error::{BridgeError, BridgeResult};
use crate::SPSC::{check_layout, TAG_LEN};

pub const DEFAULT_COMMAND_CAPACITY: usize = 8;
pub const DEFAULT_RING_CAPACITY: usize = 16 * 1024;
pub const DEFAULT_TRANSFER_UNIT: usize = 2048;

/// One logical data stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: u8,
    /// Exactly [`TAG_LEN`] ASCII bytes, written in front of every transfer.
    pub tag: String,
    /// Notification value handle on the peer, when known up front.
    #[serde(default)]
    pub notify_handle: Option<u16>,
    /// CCCD handle used to switch notifications on.
    #[serde(default)]
    pub cccd_handle: Option<u16>,
}

impl ChannelConfig {
    pub fn new(id: u8, tag: &str) -> Self {
        Self {
            id,
            tag: tag.to_string(),
            notify_handle: None,
            cccd_handle: None,
        }
    }

    /// Tag as the fixed byte array placed in the transfer header.
    pub fn tag_bytes(&self) -> BridgeResult<[u8; TAG_LEN]> {
        self.tag.as_bytes().try_into().map_err(|_| {
            BridgeError::Config(format!(
                "channel {} tag {:?} must be exactly {} bytes",
                self.id, self.tag, TAG_LEN
            ))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub command_capacity: usize,
    pub ring_capacity: usize,
    pub transfer_unit: usize,
    pub backpressure: BackpressurePolicy,
    pub channels: Vec<ChannelConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            ring_capacity: DEFAULT_RING_CAPACITY,
            transfer_unit: DEFAULT_TRANSFER_UNIT,
            backpressure: BackpressurePolicy::Drop,
            channels: vec![
                ChannelConfig::new(0, "EEG_"),
                ChannelConfig::new(1, "PPG_"),
                ChannelConfig::new(2, "ACC_"),
            ],
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(s: &str) -> BridgeResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("radio-bridge: loading config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> BridgeResult<String> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Check every startup invariant before anything is allocated.
    pub fn validate(&self) -> BridgeResult<()> {
        if !self.command_capacity.is_power_of_two() {
            return Err(BridgeError::InvalidCapacity(self.command_capacity));
        }
        check_layout(self.ring_capacity, self.transfer_unit)?;

        if self.channels.is_empty() {
            return Err(BridgeError::Config("at least one channel is required".into()));
        }

        let mut ids = HashSet::new();
        let mut handles = HashSet::new();
        for ch in &self.channels {
            ch.tag_bytes()?;
            if !ids.insert(ch.id) {
                return Err(BridgeError::Config(format!("duplicate channel id {}", ch.id)));
            }
            if let Some(h) = ch.notify_handle {
                if !handles.insert(h) {
                    return Err(BridgeError::Config(format!(
                        "notification handle 0x{h:04x} routed to more than one channel"
                    )));
                }
            }
        }
        Ok(())
    }
}
