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

//! Address codec
//!
//! Addresses are base58check strings made of a network specific version byte followed by a
//! 20-byte hash. This module converts them to and from the hashes used in output scripts.

use std::fmt;

use bitcoin::hashes::hex::{FromHex, ToHex};
use bitcoin::hashes::Hash;
use bitcoin::util::base58;
use bitcoin::{PubkeyHash, Script, ScriptHash};

use crate::error::Error;
use crate::network::Network;

/// The hash an [`Address`] commits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    /// Hash160 of a public key
    PubkeyHash(PubkeyHash),
    /// Hash160 of a redeem script
    ScriptHash(ScriptHash),
}

/// A network-bound address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Network the address belongs to
    pub network: Network,
    /// Committed hash
    pub payload: Payload,
}

impl Address {
    /// Create a pay-to-pubkey-hash address
    pub fn p2pkh(pubkey_hash: PubkeyHash, network: Network) -> Self {
        Address {
            network,
            payload: Payload::PubkeyHash(pubkey_hash),
        }
    }

    /// Create a pay-to-script-hash address
    pub fn p2sh(script_hash: ScriptHash, network: Network) -> Self {
        Address {
            network,
            payload: Payload::ScriptHash(script_hash),
        }
    }

    /// Decode a base58check address, making sure its version byte belongs to `network`
    pub fn parse(address: &str, network: Network) -> Result<Self, Error> {
        let data = base58::from_check(address)
            .map_err(|_| Error::InvalidAddress(address.to_string()))?;
        if data.len() != 21 {
            return Err(Error::InvalidAddress(address.to_string()));
        }

        let invalid = |_| Error::InvalidAddress(address.to_string());
        let info = network.info();
        let payload = match data[0] {
            v if v == info.pubkey_hash => {
                Payload::PubkeyHash(PubkeyHash::from_slice(&data[1..]).map_err(invalid)?)
            }
            v if v == info.script_hash => {
                Payload::ScriptHash(ScriptHash::from_slice(&data[1..]).map_err(invalid)?)
            }
            version => {
                return Err(Error::InvalidNetwork {
                    expected: network,
                    version,
                })
            }
        };

        Ok(Address { network, payload })
    }

    /// Recover the address paid by a standard P2PKH or P2SH output script
    pub fn from_script(script: &Script, network: Network) -> Option<Self> {
        let bytes = script.as_bytes();
        let payload = if script.is_p2pkh() {
            Payload::PubkeyHash(PubkeyHash::from_slice(&bytes[3..23]).ok()?)
        } else if script.is_p2sh() {
            Payload::ScriptHash(ScriptHash::from_slice(&bytes[2..22]).ok()?)
        } else {
            return None;
        };

        Some(Address { network, payload })
    }

    /// Output script paying this address
    pub fn script_pubkey(&self) -> Script {
        match &self.payload {
            Payload::PubkeyHash(hash) => Script::new_p2pkh(hash),
            Payload::ScriptHash(hash) => Script::new_p2sh(hash),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.network.info();
        let mut prefixed = [0; 21];
        match &self.payload {
            Payload::PubkeyHash(hash) => {
                prefixed[0] = info.pubkey_hash;
                prefixed[1..].copy_from_slice(&hash[..]);
            }
            Payload::ScriptHash(hash) => {
                prefixed[0] = info.script_hash;
                prefixed[1..].copy_from_slice(&hash[..]);
            }
        }
        write!(f, "{}", base58::check_encode_slice(&prefixed[..]))
    }
}

/// Address of a deployed contract, the 20 bytes pushed into call scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractAddress(pub [u8; 20]);

impl ContractAddress {
    /// Parse a hex encoded contract address
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = Vec::<u8>::from_hex(s)?;
        Self::from_slice(&bytes)
    }

    /// Build a contract address from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 20 {
            return Err(Error::InvalidContractAddress(bytes.len()));
        }

        let mut inner = [0; 20];
        inner.copy_from_slice(bytes);
        Ok(ContractAddress(inner))
    }

    /// Raw bytes of the address
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}
