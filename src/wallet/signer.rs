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

//! Generalized signers
//!
//! This module provides the ability to plug in custom signers, like a hardware wallet or a
//! remote service, by implementing the [`Signer`] trait. [`KeyPair`] implements it for the
//! common case of a key held in memory.
//!
//! ## Example
//!
//! ```
//! # use bitcoin::{Script, Transaction};
//! # use bcs_wallet::wallet::signer::*;
//! # use bcs_wallet::wallet::utils::SecpCtx;
//! # use bcs_wallet::{Address, KeyPair};
//! #[derive(Debug)]
//! struct CustomSigner {
//!     inner: KeyPair,
//! }
//!
//! impl Signer for CustomSigner {
//!     fn sign(
//!         &self,
//!         tx: &mut Transaction,
//!         input_index: usize,
//!         prev_script: &Script,
//!         secp: &SecpCtx,
//!     ) -> Result<(), SignerError> {
//!         // ask for confirmation, log, ...
//!         self.inner.sign(tx, input_index, prev_script, secp)
//!     }
//!
//!     fn address(&self) -> Address {
//!         self.inner.address()
//!     }
//! }
//! ```

use std::fmt;

use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::Builder as ScriptBuilder;
use bitcoin::secp256k1::Message;
use bitcoin::{Script, SigHashType, Transaction};

use crate::address::Address;
use crate::keys::KeyPair;
use crate::wallet::utils::SecpCtx;

/// Signing error
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SignerError {
    /// The signer doesn't own the key required by the previous output script
    MissingKey,
    /// Input index is out of range
    InputIndexOutOfRange,
    /// The signature hash can't be turned into a message to sign
    InvalidSighash,
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for SignerError {}

/// Trait for signers
///
/// Signers only produce legacy `SIGHASH_ALL` signatures, the only kind the wallet's
/// transactions need.
pub trait Signer: fmt::Debug + Send + Sync {
    /// Sign input `input_index` of `tx`, which spends an output locked by `prev_script`
    ///
    /// The `script_sig` of the input is replaced with the signature and, for pay-to-pubkey-hash
    /// outputs, the public key.
    fn sign(
        &self,
        tx: &mut Transaction,
        input_index: usize,
        prev_script: &Script,
        secp: &SecpCtx,
    ) -> Result<(), SignerError>;

    /// Address receiving the change of the transactions this signer funds
    fn address(&self) -> Address;
}

impl Signer for KeyPair {
    fn sign(
        &self,
        tx: &mut Transaction,
        input_index: usize,
        prev_script: &Script,
        secp: &SecpCtx,
    ) -> Result<(), SignerError> {
        if input_index >= tx.input.len() {
            return Err(SignerError::InputIndexOutOfRange);
        }

        let pubkey_hash_script = Script::new_p2pkh(&self.pubkey_hash());
        let pubkey_script = ScriptBuilder::new()
            .push_key(self.public_key())
            .push_opcode(opcodes::all::OP_CHECKSIG)
            .into_script();
        let push_pubkey = if prev_script == &pubkey_hash_script {
            true
        } else if prev_script == &pubkey_script {
            false
        } else {
            return Err(SignerError::MissingKey);
        };

        let sighash = tx.signature_hash(input_index, prev_script, SigHashType::All.as_u32());
        let msg = Message::from_slice(&sighash[..]).map_err(|_| SignerError::InvalidSighash)?;
        let mut signature = secp
            .sign(&msg, &self.private_key().key)
            .serialize_der()
            .to_vec();
        signature.push(SigHashType::All.as_u32() as u8);

        let mut builder = ScriptBuilder::new().push_slice(&signature);
        if push_pubkey {
            builder = builder.push_key(self.public_key());
        }
        tx.input[input_index].script_sig = builder.into_script();

        Ok(())
    }

    fn address(&self) -> Address {
        KeyPair::address(self)
    }
}
