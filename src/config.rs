//! Validation configuration loaded from JSON

use crate::params::{HistoryPolicy, NetworkParams};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Either the id of a built-in network or a full set of parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkSelection {
    Preset(String),
    Custom(Box<NetworkParams>),
}

/// Configuration of a validator instance.
///
/// ```json
/// { "network": "testnet", "history_policy": "strict" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    pub network: NetworkSelection,
    #[serde(default)]
    pub history_policy: HistoryPolicy,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            network: NetworkSelection::Preset("mainnet".to_string()),
            history_policy: HistoryPolicy::default(),
        }
    }
}

impl ConsensusConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: ConsensusConfig =
            serde_json::from_str(json).context("invalid consensus configuration")?;
        config.network_params()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("loading {}", path.display()))
    }

    /// Resolve the selected network.
    pub fn network_params(&self) -> anyhow::Result<NetworkParams> {
        match &self.network {
            NetworkSelection::Preset(id) => NetworkParams::by_id(id)
                .with_context(|| format!("unknown network preset {:?}", id)),
            NetworkSelection::Custom(params) => {
                params.validate()?;
                Ok((**params).clone())
            }
        }
    }
}
