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

//! Insight
//!
//! This module defines an [`Indexer`] that queries an Insight REST API.
//!
//! ## Example
//!
//! ```no_run
//! # use bcs_wallet::blockchain::insight::InsightClient;
//! # use bcs_wallet::Network;
//! let testnet = InsightClient::for_network(Network::Testnet);
//! let local = InsightClient::new("http://localhost:3001/insight-api");
//! # Ok::<(), bcs_wallet::Error>(())
//! ```

use std::fmt;

use async_trait::async_trait;
use bitcoin::hashes::hex::ToHex;
use bitcoin::Txid;
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ConfigurableIndexer, Indexer};
use crate::address::{Address, ContractAddress};
use crate::error::Error;
use crate::network::Network;
use crate::types::{
    AddressInfo, ContractCallResult, SendRawTxResult, TransactionInfo, TransactionPage, Utxo,
};

/// Base URL of the mainnet Insight API
pub const MAINNET_URL: &str = "http://bcschain.info/api";
/// Base URL of the testnet Insight API
pub const TESTNET_URL: &str = "http://testnet.bcschain.info/api";
/// Base URL of a local regtest Insight API
pub const REGTEST_URL: &str = "http://localhost:3001/insight-api";

/// Number of transactions in a page of history
pub const PAGE_SIZE: u32 = 10;

/// Client of an Insight API
#[derive(Debug, Clone)]
pub struct InsightClient {
    url: String,
    // The async client automatically uses `fetch` when the target platform is wasm32
    client: Client,
}

impl InsightClient {
    /// Create a new instance of the client from a base URL
    pub fn new(base_url: &str) -> Self {
        InsightClient {
            url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client of the public API of `network`
    pub fn for_network(network: Network) -> Self {
        Self::new(base_url(network))
    }

    /// Base URL of the API
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn _get<T: DeserializeOwned>(&self, path: &str) -> Result<T, InsightError> {
        debug!("GET {}{}", self.url, path);

        Ok(self
            .client
            .get(&format!("{}{}", self.url, path))
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?)
    }

    async fn _send_raw_tx(&self, raw_tx: &str) -> Result<SendRawTxResult, InsightError> {
        debug!("POST {}/tx/send", self.url);

        Ok(self
            .client
            .post(&format!("{}/tx/send", self.url))
            .json(&SendRawTxRequest { rawtx: raw_tx })
            .send()
            .await?
            .error_for_status()?
            .json::<SendRawTxResult>()
            .await?)
    }
}

/// Base URL of the public Insight API of `network`
pub fn base_url(network: Network) -> &'static str {
    match network {
        Network::Mainnet => MAINNET_URL,
        Network::Testnet => TESTNET_URL,
        Network::Regtest => REGTEST_URL,
    }
}

#[derive(Serialize)]
struct SendRawTxRequest<'a> {
    rawtx: &'a str,
}

#[derive(Deserialize)]
struct InfoResponse {
    #[serde(rename = "feeRate", default)]
    fee_rate: Option<f64>,
}

// The API reports the fee rate in BCS per kilobyte, negative when it has no estimate
fn fee_per_kb(fee_rate: Option<f64>) -> Result<u64, Error> {
    match fee_rate {
        Some(rate) if rate.is_finite() && rate >= 0.0 => Ok((rate * 1e8).ceil() as u64),
        _ => Err(Error::FeeRateUnavailable),
    }
}

#[async_trait]
impl Indexer for InsightClient {
    async fn list_utxos(&self, address: &Address) -> Result<Vec<Utxo>, Error> {
        Ok(self._get(&format!("/address/{}/utxo", address)).await?)
    }

    async fn get_info(&self, address: &Address) -> Result<AddressInfo, Error> {
        Ok(self._get(&format!("/address/{}", address)).await?)
    }

    async fn send_raw_tx(&self, raw_tx: &str) -> Result<SendRawTxResult, Error> {
        let result = self._send_raw_tx(raw_tx).await?;
        info!("broadcast tx `{}`, status `{}`", result.id, result.status);

        Ok(result)
    }

    async fn contract_call(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
    ) -> Result<ContractCallResult, Error> {
        Ok(self
            ._get(&format!(
                "/contract/{}/call?data={}",
                contract,
                call_data.to_hex()
            ))
            .await?)
    }

    async fn estimate_fee(&self, _target: usize) -> Result<u64, Error> {
        let info: InfoResponse = self._get("/info").await?;
        fee_per_kb(info.fee_rate)
    }

    async fn get_transaction_info(&self, txid: &Txid) -> Result<TransactionInfo, Error> {
        Ok(self._get(&format!("/tx/{}", txid)).await?)
    }

    async fn get_transactions(
        &self,
        address: &Address,
        page: u32,
    ) -> Result<TransactionPage, Error> {
        Ok(self
            ._get(&format!(
                "/address/{}/basic-txs?pageSize={}&page={}",
                address, PAGE_SIZE, page
            ))
            .await?)
    }
}

/// Configuration for an [`InsightClient`]
#[derive(Debug, serde::Deserialize, serde::Serialize, Clone, PartialEq)]
pub struct InsightConfig {
    /// Base URL of the Insight API
    ///
    /// eg. `http://testnet.bcschain.info/api`
    pub base_url: String,
}

impl InsightConfig {
    /// Configuration pointing to the public API of `network`
    pub fn for_network(network: Network) -> Self {
        InsightConfig {
            base_url: base_url(network).to_string(),
        }
    }
}

impl ConfigurableIndexer for InsightClient {
    type Config = InsightConfig;

    fn from_config(config: &Self::Config) -> Result<Self, Error> {
        Ok(InsightClient::new(config.base_url.as_str()))
    }
}

/// Errors that can happen while talking to an Insight API
#[derive(Debug)]
pub enum InsightError {
    /// Error with the HTTP call, including non-success statuses and malformed bodies
    Reqwest(reqwest::Error),
}

impl fmt::Display for InsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for InsightError {}

impl_error!(reqwest::Error, Reqwest, InsightError);
