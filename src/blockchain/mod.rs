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

//! Blockchain backends
//!
//! This module provides the [`Indexer`] trait, implemented by the services the wallet queries
//! for UTXOs, fee estimates and history, and that accepts its transactions. Implementations
//! perform single request/response calls and never retry: errors are returned to the caller.
//!
//! The [`BlockGenerator`] trait covers the regtest-only ability of mining blocks on demand.

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::Txid;

use crate::address::{Address, ContractAddress};
use crate::error::Error;
use crate::network::Network;
use crate::types::{
    AddressInfo, ContractCallResult, FeeRate, SendRawTxResult, TransactionInfo, TransactionPage,
    Utxo,
};

#[cfg(feature = "insight")]
#[cfg_attr(docsrs, doc(cfg(feature = "insight")))]
pub mod insight;
#[cfg(feature = "insight")]
#[cfg_attr(docsrs, doc(cfg(feature = "insight")))]
pub use self::insight::InsightClient;

#[cfg(feature = "insight")]
#[cfg_attr(docsrs, doc(cfg(feature = "insight")))]
pub mod rpc;
#[cfg(feature = "insight")]
#[cfg_attr(docsrs, doc(cfg(feature = "insight")))]
pub use self::rpc::RpcBlockGenerator;

/// Default confirmation target of fee estimates, in blocks
pub const DEFAULT_CONFIRMATION_TARGET: usize = 6;

/// Trait that defines the actions that must be supported by a chain indexer
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Unspent outputs owned by `address`
    async fn list_utxos(&self, address: &Address) -> Result<Vec<Utxo>, Error>;

    /// Balance summary of `address`
    async fn get_info(&self, address: &Address) -> Result<AddressInfo, Error>;

    /// Broadcast a hex encoded transaction
    async fn send_raw_tx(&self, raw_tx: &str) -> Result<SendRawTxResult, Error>;

    /// Execute a read-only call of `contract`
    async fn contract_call(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
    ) -> Result<ContractCallResult, Error>;

    /// Estimate the fee, in satoshi per kilobyte, for a confirmation within `target` blocks
    ///
    /// Returns [`Error::FeeRateUnavailable`] when the indexer has no estimate, which is always
    /// the case on some test networks.
    async fn estimate_fee(&self, target: usize) -> Result<u64, Error>;

    /// Same as [`estimate_fee`](Self::estimate_fee), converted to satoshi per byte rounding up
    async fn estimate_fee_per_byte(&self, target: usize) -> Result<FeeRate, Error> {
        Ok(FeeRate::from_sat_per_kb(self.estimate_fee(target).await?))
    }

    /// Details of a single transaction
    async fn get_transaction_info(&self, txid: &Txid) -> Result<TransactionInfo, Error>;

    /// Page `page` of the history of `address`, most recent first
    async fn get_transactions(&self, address: &Address, page: u32)
        -> Result<TransactionPage, Error>;
}

/// Trait for [`Indexer`] types that can be created given a configuration
pub trait ConfigurableIndexer: Indexer + Sized {
    /// Type that contains the configuration
    type Config: std::fmt::Debug;
    /// Create a new instance given a configuration
    fn from_config(config: &Self::Config) -> Result<Self, Error>;
}

#[async_trait]
impl<T: Indexer + ?Sized> Indexer for Arc<T> {
    async fn list_utxos(&self, address: &Address) -> Result<Vec<Utxo>, Error> {
        self.deref().list_utxos(address).await
    }

    async fn get_info(&self, address: &Address) -> Result<AddressInfo, Error> {
        self.deref().get_info(address).await
    }

    async fn send_raw_tx(&self, raw_tx: &str) -> Result<SendRawTxResult, Error> {
        self.deref().send_raw_tx(raw_tx).await
    }

    async fn contract_call(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
    ) -> Result<ContractCallResult, Error> {
        self.deref().contract_call(contract, call_data).await
    }

    async fn estimate_fee(&self, target: usize) -> Result<u64, Error> {
        self.deref().estimate_fee(target).await
    }

    async fn estimate_fee_per_byte(&self, target: usize) -> Result<FeeRate, Error> {
        self.deref().estimate_fee_per_byte(target).await
    }

    async fn get_transaction_info(&self, txid: &Txid) -> Result<TransactionInfo, Error> {
        self.deref().get_transaction_info(txid).await
    }

    async fn get_transactions(
        &self,
        address: &Address,
        page: u32,
    ) -> Result<TransactionPage, Error> {
        self.deref().get_transactions(address, page).await
    }
}

/// Mine blocks on demand, only available on regtest nodes
#[async_trait]
pub trait BlockGenerator: Send + Sync {
    /// Mine `nblocks` blocks, returning their hashes
    async fn generate(&self, nblocks: u32) -> Result<Vec<String>, Error>;
}

/// Mine a block to confirm the last broadcast transaction, does nothing off regtest
pub async fn generate_block<G: BlockGenerator + ?Sized>(
    generator: &G,
    network: Network,
) -> Result<(), Error> {
    if network != Network::Regtest {
        log::debug!("not generating a block on {}", network);
        return Ok(());
    }

    let hashes = generator.generate(1).await?;
    log::info!("generated blocks `{:?}`", hashes);

    Ok(())
}
