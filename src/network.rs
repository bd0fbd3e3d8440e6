// BCS Wallet
// Written in 2021 by the BCS Wallet Developers
//
// Copyright (c) 2021 BCS Wallet Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Network parameters
//!
//! Every network variant of the chain uses its own version bytes for addresses and private
//! keys. The [`NetworkInfo`] of a [`Network`] carries them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Network variants of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Main network
    Mainnet,
    /// Public test network
    Testnet,
    /// Local regression test network
    Regtest,
}

/// BIP32 extended key version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bip32Versions {
    /// Version of extended public keys
    pub public: u32,
    /// Version of extended private keys
    pub private: u32,
}

/// Per-network constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Network these constants belong to
    pub network: Network,
    /// Prefix prepended to signed messages
    pub message_prefix: &'static str,
    /// Human readable part of bech32 addresses
    pub bech32: &'static str,
    /// Extended key versions
    pub bip32: Bip32Versions,
    /// Version byte of pay-to-pubkey-hash addresses
    pub pubkey_hash: u8,
    /// Version byte of pay-to-script-hash addresses
    pub script_hash: u8,
    /// Version byte of WIF private keys
    pub wif: u8,
}

const MESSAGE_PREFIX: &str = "\u{15}BCS Signed Message:\n";

const MAINNET: NetworkInfo = NetworkInfo {
    network: Network::Mainnet,
    message_prefix: MESSAGE_PREFIX,
    bech32: "bc",
    bip32: Bip32Versions {
        public: 76_067_358,
        private: 76_066_276,
    },
    pubkey_hash: 25,
    script_hash: 50,
    wif: 128,
};

const TESTNET: NetworkInfo = NetworkInfo {
    network: Network::Testnet,
    message_prefix: MESSAGE_PREFIX,
    bech32: "tb",
    bip32: Bip32Versions {
        public: 70_617_039,
        private: 70_615_956,
    },
    pubkey_hash: 85,
    script_hash: 110,
    wif: 239,
};

// regtest shares every version byte with testnet
const REGTEST: NetworkInfo = NetworkInfo {
    network: Network::Regtest,
    ..TESTNET
};

impl Network {
    /// Return the constants of this network
    pub fn info(&self) -> &'static NetworkInfo {
        match self {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
            Network::Regtest => &REGTEST,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(Error::Generic(format!("Unknown network `{}`", other))),
        }
    }
}
