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

//! Contract RPC provider
//!
//! Contract libraries talk to the node through `sendtocontract` and `callcontract` calls, with
//! amounts and gas prices expressed in BCS. [`WalletRpcProvider`] serves those calls from a
//! [`Wallet`], converting BCS to satoshi on the way in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::ContractAddress;
use crate::blockchain::Indexer;
use crate::error::Error;
use crate::types::{ContractCallResult, SendRawTxResult};
use crate::wallet::coin_selection::CoinSelectionAlgorithm;
use crate::wallet::{ContractSendOptions, Wallet};

/// Satoshi in one BCS
pub const SATOSHI_PER_BCS: f64 = 100_000_000.0;
/// Gas limit of calls that don't specify one
pub const DEFAULT_RPC_GAS_LIMIT: u64 = 200_000;
/// Gas price, in BCS, of calls that don't specify one
pub const DEFAULT_RPC_GAS_PRICE: f64 = 0.000_000_4;
/// Largest amount of satoshi an `f64` holds exactly, 2^53
pub const MAX_EXACT_SATOSHI: u64 = 1 << 53;

/// Contract RPC methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcMethod {
    /// Broadcast a transaction calling a contract
    SendToContract,
    /// Read-only call of a contract
    CallContract,
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcMethod::SendToContract => write!(f, "sendtocontract"),
            RpcMethod::CallContract => write!(f, "callcontract"),
        }
    }
}

impl FromStr for RpcMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sendtocontract" => Ok(RpcMethod::SendToContract),
            "callcontract" => Ok(RpcMethod::CallContract),
            _ => Err(Error::Generic(format!("Unknown method call `{}`", s))),
        }
    }
}

/// Parameters of a contract RPC call
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRpcParams {
    /// Target contract
    pub contract_address: ContractAddress,
    /// ABI encoded call data
    pub encoded_data: Vec<u8>,
    /// Value sent along the call, in BCS (default `0`)
    pub amount: Option<f64>,
    /// Gas limit (default [`DEFAULT_RPC_GAS_LIMIT`])
    pub gas_limit: Option<u64>,
    /// Gas price, in BCS (default [`DEFAULT_RPC_GAS_PRICE`])
    pub gas_price: Option<f64>,
}

impl ContractRpcParams {
    /// Call `contract_address` with `encoded_data` and default options
    pub fn new(contract_address: ContractAddress, encoded_data: Vec<u8>) -> Self {
        ContractRpcParams {
            contract_address,
            encoded_data,
            amount: None,
            gas_limit: None,
            gas_price: None,
        }
    }

    /// Send options with BCS values converted to satoshi
    pub fn send_options(&self) -> Result<ContractSendOptions, Error> {
        Ok(ContractSendOptions {
            gas_limit: self.gas_limit.unwrap_or(DEFAULT_RPC_GAS_LIMIT),
            gas_price: bcs_to_satoshi(self.gas_price.unwrap_or(DEFAULT_RPC_GAS_PRICE))?,
            amount: bcs_to_satoshi(self.amount.unwrap_or(0.0))? as f64,
            fee_rate: None,
        })
    }
}

/// Convert BCS to satoshi, dropping any fraction of satoshi
///
/// Results above [`MAX_EXACT_SATOSHI`] are refused: they can't go through the float amounts of
/// [`ContractSendOptions`] unchanged.
pub fn bcs_to_satoshi(bcs: f64) -> Result<u64, Error> {
    if !bcs.is_finite() {
        return Err(Error::InvalidAmount(bcs));
    }
    if bcs < 0.0 {
        return Err(Error::NegativeAmount(bcs));
    }

    let satoshi = (bcs * SATOSHI_PER_BCS).floor();
    if satoshi > MAX_EXACT_SATOSHI as f64 {
        return Err(Error::InvalidAmount(bcs));
    }

    Ok(satoshi as u64)
}

/// Result of a contract RPC call
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResult {
    /// The transaction broadcast by [`RpcMethod::SendToContract`]
    Sent(SendRawTxResult),
    /// The result of [`RpcMethod::CallContract`]
    Called(ContractCallResult),
}

/// Serves contract RPC calls with a [`Wallet`]
#[derive(Debug)]
pub struct WalletRpcProvider<'w, I, Cs: CoinSelectionAlgorithm> {
    wallet: &'w Wallet<I, Cs>,
}

impl<'w, I: Indexer, Cs: CoinSelectionAlgorithm> WalletRpcProvider<'w, I, Cs> {
    /// Create a provider backed by `wallet`
    pub fn new(wallet: &'w Wallet<I, Cs>) -> Self {
        WalletRpcProvider { wallet }
    }

    /// Run `method`
    ///
    /// `fee_rate` (satoshi/byte) only applies to [`RpcMethod::SendToContract`].
    pub async fn raw_call(
        &self,
        method: RpcMethod,
        params: &ContractRpcParams,
        fee_rate: Option<f64>,
    ) -> Result<RpcResult, Error> {
        log::debug!("{} `{}`", method, params.contract_address);

        match method {
            RpcMethod::SendToContract => {
                let options = ContractSendOptions {
                    fee_rate,
                    ..params.send_options()?
                };
                let result = self
                    .wallet
                    .contract_send(&params.contract_address, &params.encoded_data, &options)
                    .await?;
                Ok(RpcResult::Sent(result))
            }
            RpcMethod::CallContract => {
                let result = self
                    .wallet
                    .contract_call(&params.contract_address, &params.encoded_data)
                    .await?;
                Ok(RpcResult::Called(result))
            }
        }
    }
}
