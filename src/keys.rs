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

//! Key pairs
//!
//! A [`KeyPair`] is the signing key of a wallet together with the network it lives on. Deriving
//! it from a mnemonic or decrypting it is left to the caller: this module only imports and
//! exports keys in the Wallet Import Format.

use std::fmt;

use bitcoin::secp256k1::SecretKey;
use bitcoin::util::base58;
use bitcoin::{PrivateKey, PubkeyHash, PublicKey};

use crate::address::Address;
use crate::error::Error;
use crate::network::Network;
use crate::wallet::utils::SecpCtx;

/// A private key bound to a [`Network`]
#[derive(Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
    network: Network,
}

impl KeyPair {
    /// Create a key pair from a raw secret key
    pub fn new(secret_key: SecretKey, compressed: bool, network: Network, secp: &SecpCtx) -> Self {
        let private_key = PrivateKey {
            compressed,
            // only used by `rust-bitcoin` to pick a WIF version, which we encode ourselves
            network: bitcoin::Network::Bitcoin,
            key: secret_key,
        };
        let public_key = private_key.public_key(secp);

        KeyPair {
            private_key,
            public_key,
            network,
        }
    }

    /// Import a key in the Wallet Import Format
    ///
    /// The version byte must match the WIF version of `network`.
    pub fn from_wif(wif: &str, network: Network, secp: &SecpCtx) -> Result<Self, Error> {
        let data = base58::from_check(wif)?;
        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 0x01 => true,
            _ => return Err(Error::InvalidKey),
        };
        if data[0] != network.info().wif {
            return Err(Error::InvalidKey);
        }

        let secret_key = SecretKey::from_slice(&data[1..33]).map_err(|_| Error::InvalidKey)?;
        Ok(Self::new(secret_key, compressed, network, secp))
    }

    /// Export the key in the Wallet Import Format
    pub fn to_wif(&self) -> String {
        let mut data = Vec::with_capacity(34);
        data.push(self.network.info().wif);
        data.extend_from_slice(&self.private_key.key[..]);
        if self.private_key.compressed {
            data.push(0x01);
        }

        base58::check_encode_slice(&data)
    }

    /// Network of the key
    pub fn network(&self) -> Network {
        self.network
    }

    /// Public half of the key pair
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Private half of the key pair
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Hash160 of the serialized public key
    pub fn pubkey_hash(&self) -> PubkeyHash {
        self.public_key.pubkey_hash()
    }

    /// Pay-to-pubkey-hash address controlled by this key
    pub fn address(&self) -> Address {
        Address::p2pkh(self.pubkey_hash(), self.network)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("network", &self.network)
            .finish()
    }
}
