//! Chain parameters.

use crate::subsidy::SubsidyParams;
use serde::{Deserialize, Serialize};

/// Base block version shared by every network.
const BASE_BLOCK_VERSION: u32 = 1;

/// Version bit flagging testnet blocks.
const TESTNET_VERSION_BIT: u32 = 1 << 2;

/// Version bit flagging private-network blocks.
const PRIVNET_VERSION_BIT: u32 = 1 << 3;

/// Network identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Main network.
    Mainnet,
    /// Public test network.
    Testnet,
    /// Private development network.
    Privnet,
}

/// Consensus parameters of a network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainParams {
    /// Network these parameters belong to.
    pub network: Network,
    /// Blocks a coinbase output must age before it can be spent.
    pub coinbase_maturity: u64,
    /// Whether the network allows dropping to the minimum difficulty when
    /// blocks are slow; affects timestamp-driven difficulty refreshes.
    pub reduce_min_difficulty: bool,
    /// Target seconds between blocks.
    pub target_time_per_block: u64,
    /// Emission schedule.
    pub subsidy: SubsidyParams,
}

impl ChainParams {
    /// Main network parameters.
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            coinbase_maturity: 720,
            reduce_min_difficulty: false,
            target_time_per_block: 30,
            subsidy: SubsidyParams::default(),
        }
    }

    /// Test network parameters.
    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            reduce_min_difficulty: true,
            ..Self::mainnet()
        }
    }

    /// Private network parameters.
    pub fn privnet() -> Self {
        Self {
            network: Network::Privnet,
            coinbase_maturity: 16,
            reduce_min_difficulty: true,
            target_time_per_block: 30,
            subsidy: SubsidyParams::default(),
        }
    }

    /// Block version generated for this network.
    pub fn block_version(&self) -> u32 {
        match self.network {
            Network::Mainnet => BASE_BLOCK_VERSION,
            Network::Testnet => BASE_BLOCK_VERSION | TESTNET_VERSION_BIT,
            Network::Privnet => BASE_BLOCK_VERSION | PRIVNET_VERSION_BIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_versions_differ_per_network() {
        let versions = [
            ChainParams::mainnet().block_version(),
            ChainParams::testnet().block_version(),
            ChainParams::privnet().block_version(),
        ];
        assert_eq!(versions[0], 1);
        assert_ne!(versions[0], versions[1]);
        assert_ne!(versions[1], versions[2]);
    }

    #[test]
    fn test_privnet_short_maturity() {
        assert!(ChainParams::privnet().coinbase_maturity < ChainParams::mainnet().coinbase_maturity);
    }
}
