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

//! Wallet
//!
//! This module defines the [`Wallet`] structure, which ties a [`KeyPair`] to an [`Indexer`] and
//! builds, signs and broadcasts transactions for it.
//!
//! ## Example
//!
//! ```no_run
//! # use bitcoin::secp256k1::Secp256k1;
//! # use bcs_wallet::blockchain::InsightClient;
//! # use bcs_wallet::wallet::SendOptions;
//! # use bcs_wallet::*;
//! # async fn run() -> Result<(), bcs_wallet::Error> {
//! let secp = Secp256k1::new();
//! let keypair = KeyPair::from_wif(
//!     "cMbgxCJrTYUqgcmiC1berh5DFrtY1KeU4PXZ6NZxgenniF1mXCRk",
//!     Network::Testnet,
//!     &secp,
//! )?;
//! let wallet = Wallet::new(keypair, InsightClient::for_network(Network::Testnet));
//!
//! println!("balance: {} sat", wallet.get_balance().await?);
//! let result = wallet
//!     .send(
//!         "bRrsJqyDzRFMc8e4Lk1QEVyBDMtWNP4DCY",
//!         1e8,
//!         &SendOptions { fee_rate: Some(400.0) },
//!     )
//!     .await?;
//! println!("sent {}", result.id);
//! # Ok(())
//! # }
//! ```

use bitcoin::Txid;
use log::debug;
use serde::{Deserialize, Serialize};

pub mod coin_selection;
pub mod estimate;
pub mod fee;
pub mod rpc_provider;
pub mod script;
pub mod signer;
pub mod tx_builder;
pub mod utils;

use coin_selection::{CoinSelectionAlgorithm, DefaultCoinSelectionAlgorithm};
use estimate::{estimate_pubkey_hash_max_send, estimate_send_to_contract_max_value};
use fee::default_fee_rate;
use rpc_provider::WalletRpcProvider;
use tx_builder::{BuiltTransaction, Operation, TxBuilder};
use utils::sum_utxo_values;

use crate::address::{Address, ContractAddress};
use crate::blockchain::{Indexer, DEFAULT_CONFIRMATION_TARGET};
use crate::error::Error;
use crate::keys::KeyPair;
use crate::network::Network;
use crate::types::*;

/// Options of a payment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SendOptions {
    /// Fee rate in satoshi/byte, floored
    ///
    /// When `None` the indexer's estimate is used, or 391 sat/byte (0.004 BCS/KB) if it has
    /// none.
    pub fee_rate: Option<f64>,
}

/// Options of a contract deployment or call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractSendOptions {
    /// Gas limit (default `250000`)
    pub gas_limit: u64,
    /// Gas price in satoshi (default `40`)
    pub gas_price: u64,
    /// Value sent to the contract in satoshi, must be an integer (default `0`)
    ///
    /// Ignored when deploying a contract.
    pub amount: f64,
    /// Fee rate, resolved like [`SendOptions::fee_rate`]
    pub fee_rate: Option<f64>,
}

impl Default for ContractSendOptions {
    fn default() -> Self {
        ContractSendOptions {
            gas_limit: 250_000,
            gas_price: 40,
            amount: 0.0,
            fee_rate: None,
        }
    }
}

impl ContractSendOptions {
    /// Gas parameters of the options
    pub fn gas(&self) -> GasParams {
        GasParams {
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
        }
    }
}

/// A wallet controlling the outputs of a single key
///
/// The wallet keeps no state besides its key: UTXOs are fetched from the indexer for every
/// transaction. Two transactions built concurrently from the same UTXOs may double-spend each
/// other, callers must serialize them if that matters.
#[derive(Debug)]
pub struct Wallet<I, Cs: CoinSelectionAlgorithm = DefaultCoinSelectionAlgorithm> {
    keypair: KeyPair,
    indexer: I,
    builder: TxBuilder<Cs>,
}

impl<I: Indexer> Wallet<I> {
    /// Create a wallet using the default [`TxBuilder`]
    pub fn new(keypair: KeyPair, indexer: I) -> Self {
        Wallet {
            keypair,
            indexer,
            builder: TxBuilder::new(),
        }
    }
}

impl<I: Indexer, Cs: CoinSelectionAlgorithm> Wallet<I, Cs> {
    /// Create a wallet with a customized [`TxBuilder`]
    pub fn with_tx_builder(keypair: KeyPair, indexer: I, builder: TxBuilder<Cs>) -> Self {
        Wallet {
            keypair,
            indexer,
            builder,
        }
    }

    /// Address of the wallet
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// Network of the wallet
    pub fn network(&self) -> Network {
        self.keypair.network()
    }

    /// Key of the wallet
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Export the key of the wallet in the Wallet Import Format
    pub fn to_wif(&self) -> String {
        self.keypair.to_wif()
    }

    /// Return a reference to the indexer
    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    /// Provider serving contract RPC calls with this wallet
    pub fn rpc_provider(&self) -> WalletRpcProvider<'_, I, Cs> {
        WalletRpcProvider::new(self)
    }

    /// Balance summary of the wallet's address
    pub async fn get_info(&self) -> Result<AddressInfo, Error> {
        self.indexer.get_info(&self.address()).await
    }

    /// Spendable outputs of the wallet
    pub async fn get_utxos(&self) -> Result<Vec<Utxo>, Error> {
        self.indexer.list_utxos(&self.address()).await
    }

    /// Sum of the spendable outputs, in satoshi
    pub async fn get_balance(&self) -> Result<u64, Error> {
        sum_utxo_values(&self.get_utxos().await?)
    }

    /// Page `page` of the wallet's history
    pub async fn get_transactions(&self, page: u32) -> Result<TransactionPage, Error> {
        self.indexer.get_transactions(&self.address(), page).await
    }

    /// Details of a transaction
    pub async fn get_transaction_info(&self, txid: &Txid) -> Result<TransactionInfo, Error> {
        self.indexer.get_transaction_info(txid).await
    }

    /// Resolve the fee rate of a transaction
    ///
    /// An explicit rate is floored, otherwise the indexer's estimate is used. If the indexer has
    /// no estimate the rate falls back to 0.004 BCS/KB.
    pub async fn fee_rate(&self, requested: Option<f64>) -> Result<FeeRate, Error> {
        if let Some(rate) = requested {
            return FeeRate::from_sat_per_byte_f64(rate);
        }

        match self
            .indexer
            .estimate_fee_per_byte(DEFAULT_CONFIRMATION_TARGET)
            .await
        {
            Ok(rate) => Ok(rate),
            Err(Error::FeeRateUnavailable) => {
                debug!("no fee estimate, using `{}`", default_fee_rate());
                Ok(default_fee_rate())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the wallet's UTXOs and build a signed transaction for `operation`
    pub async fn build_tx(
        &self,
        operation: &Operation,
        fee_rate: FeeRate,
    ) -> Result<BuiltTransaction, Error> {
        let utxos = self.get_utxos().await?;
        self.builder.build(&utxos, &self.keypair, operation, fee_rate)
    }

    /// Build a signed payment of `amount` satoshi to `to`, returned as hex
    pub async fn generate_tx(
        &self,
        to: &str,
        amount: f64,
        options: &SendOptions,
    ) -> Result<String, Error> {
        let amount = ensure_amount_integer(amount)?;
        let to = Address::parse(to, self.network())?;
        let fee_rate = self.fee_rate(options.fee_rate).await?;

        Ok(self
            .build_tx(&Operation::Pay { to, amount }, fee_rate)
            .await?
            .to_hex())
    }

    /// Pay `amount` satoshi to `to`
    pub async fn send(
        &self,
        to: &str,
        amount: f64,
        options: &SendOptions,
    ) -> Result<SendRawTxResult, Error> {
        let raw_tx = self.generate_tx(to, amount, options).await?;
        self.indexer.send_raw_tx(&raw_tx).await
    }

    /// Largest amount [`send`](Self::send) can pay to `to`
    pub async fn send_estimate_max_value(
        &self,
        to: &str,
        options: &SendOptions,
    ) -> Result<u64, Error> {
        let to = Address::parse(to, self.network())?;
        let fee_rate = self.fee_rate(options.fee_rate).await?;
        self.builder.check_fee_rate(fee_rate)?;
        let utxos = self.get_utxos().await?;

        estimate_pubkey_hash_max_send(self.builder.get_coin_selection(), &utxos, &to, fee_rate)
    }

    /// Build a signed contract deployment, returned as hex
    pub async fn generate_create_contract_tx(
        &self,
        bytecode: &[u8],
        options: &ContractSendOptions,
    ) -> Result<String, Error> {
        let fee_rate = self.fee_rate(options.fee_rate).await?;
        let operation = Operation::CreateContract {
            bytecode: bytecode.to_vec(),
            gas: options.gas(),
        };

        Ok(self.build_tx(&operation, fee_rate).await?.to_hex())
    }

    /// Deploy a contract
    pub async fn create_contract(
        &self,
        bytecode: &[u8],
        options: &ContractSendOptions,
    ) -> Result<SendRawTxResult, Error> {
        let raw_tx = self.generate_create_contract_tx(bytecode, options).await?;
        self.indexer.send_raw_tx(&raw_tx).await
    }

    /// Build a signed contract call, returned as hex
    pub async fn generate_contract_send_tx(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
        options: &ContractSendOptions,
    ) -> Result<String, Error> {
        let amount = ensure_amount_integer(options.amount)?;
        let fee_rate = self.fee_rate(options.fee_rate).await?;
        let operation = Operation::SendToContract {
            contract: *contract,
            call_data: call_data.to_vec(),
            amount,
            gas: options.gas(),
        };

        Ok(self.build_tx(&operation, fee_rate).await?.to_hex())
    }

    /// Call a contract, broadcasting the transaction
    pub async fn contract_send(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
        options: &ContractSendOptions,
    ) -> Result<SendRawTxResult, Error> {
        let raw_tx = self
            .generate_contract_send_tx(contract, call_data, options)
            .await?;
        self.indexer.send_raw_tx(&raw_tx).await
    }

    /// Largest amount [`contract_send`](Self::contract_send) can send to `contract`
    pub async fn contract_send_estimate_max_value(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
        options: &ContractSendOptions,
    ) -> Result<u64, Error> {
        let fee_rate = self.fee_rate(options.fee_rate).await?;
        self.builder.check_fee_rate(fee_rate)?;
        let utxos = self.get_utxos().await?;

        estimate_send_to_contract_max_value(
            self.builder.get_coin_selection(),
            &utxos,
            contract,
            call_data,
            options.gas(),
            fee_rate,
        )
    }

    /// Read-only call of a contract, nothing is broadcast
    pub async fn contract_call(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
    ) -> Result<ContractCallResult, Error> {
        self.indexer.contract_call(contract, call_data).await
    }
}
