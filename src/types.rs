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

use std::fmt;
use std::str::FromStr;

use bitcoin::hashes::hex::FromHex;
use bitcoin::{OutPoint, Script, Txid};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::Error;

/// Fee rate
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
// Internally stored as satoshi/byte
pub struct FeeRate(u64);

impl FeeRate {
    /// Create a new instance of [`FeeRate`] given an integer fee rate in satoshi/byte
    pub const fn from_sat_per_byte(sat_per_byte: u64) -> Self {
        FeeRate(sat_per_byte)
    }

    /// Create a new instance of [`FeeRate`] from a fee in satoshi per kilobyte, rounding up
    pub const fn from_sat_per_kb(sat_per_kb: u64) -> Self {
        FeeRate(sat_per_kb / 1024 + (sat_per_kb % 1024 != 0) as u64)
    }

    /// Create a new instance of [`FeeRate`] from an untrusted float, flooring it
    ///
    /// Selection needs an integral rate, so any fractional part is dropped here and no float
    /// reaches the fee arithmetic.
    pub fn from_sat_per_byte_f64(sat_per_byte: f64) -> Result<Self, Error> {
        if !sat_per_byte.is_finite() || sat_per_byte < 1.0 {
            return Err(Error::InvalidFeeRate(sat_per_byte));
        }

        Ok(FeeRate(sat_per_byte.floor() as u64))
    }

    /// Return the value as satoshi/byte
    pub fn as_sat_per_byte(&self) -> u64 {
        self.0
    }

    /// Fee for `bytes` bytes at this rate, saturating at `u64::MAX`
    pub fn fee_for_bytes(&self, bytes: usize) -> u64 {
        self.0.saturating_mul(bytes as u64)
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/byte", self.0)
    }
}

/// Check that a float amount of satoshi is a non-negative integer and convert it
///
/// Amounts coming from JSON or user input land here before touching any fee arithmetic.
pub fn ensure_amount_integer(amount: f64) -> Result<u64, Error> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount(amount));
    }
    if amount < 0.0 {
        return Err(Error::NegativeAmount(amount));
    }
    if amount.fract() != 0.0 {
        return Err(Error::NonIntegerAmount(amount));
    }
    // `u64::MAX as f64` rounds up to 2^64
    if amount >= u64::MAX as f64 {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(amount as u64)
}

/// Gas parameters of a contract create or call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GasParams {
    /// Maximum amount of gas the execution may consume
    pub gas_limit: u64,
    /// Price of one unit of gas, in satoshi
    pub gas_price: u64,
}

/// Where an [`OutputIntent`] sends its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A plain payment to an address
    Address(Address),
    /// A synthetic output script, e.g. a contract create or call
    Script(Script),
    /// Value reserved by the transaction but paid to no output, e.g. the gas limit fee
    Unassigned,
}

/// An output the coin selection has to fund
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputIntent {
    /// Value in satoshi
    pub value: u64,
    /// Destination of the value
    pub destination: Destination,
}

impl OutputIntent {
    /// Pay `value` to `address`
    pub fn to_address(address: Address, value: u64) -> Self {
        OutputIntent {
            value,
            destination: Destination::Address(address),
        }
    }

    /// Attach `value` to an output script
    pub fn to_script(script: Script, value: u64) -> Self {
        OutputIntent {
            value,
            destination: Destination::Script(script),
        }
    }

    /// Reserve `value` without an output
    pub fn reserved(value: u64) -> Self {
        OutputIntent {
            value,
            destination: Destination::Unassigned,
        }
    }

    /// Raw script of the output, if it's a synthetic one
    pub fn script(&self) -> Option<&Script> {
        match &self.destination {
            Destination::Script(script) => Some(script),
            _ => None,
        }
    }
}

/// An unspent output, as reported by the indexer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    /// Address owning the output
    pub address: String,
    /// Id of the transaction that created the output
    pub transaction_id: Txid,
    /// Index of the output in its transaction
    pub output_index: u32,
    /// Hex encoded output script
    pub script_pub_key: String,
    /// Value in satoshi
    #[serde(deserialize_with = "deserialize_satoshi")]
    pub value: u64,
    /// Whether the output comes from a coinstake
    #[serde(default)]
    pub is_stake: bool,
    /// Height of the block including the output
    #[serde(default)]
    pub height: i64,
    /// Number of confirmations
    #[serde(default)]
    pub confirmations: u64,
}

impl Utxo {
    /// Reference to the output
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.transaction_id,
            vout: self.output_index,
        }
    }

    /// Decoded output script
    pub fn script(&self) -> Result<Script, Error> {
        Ok(Script::from(Vec::<u8>::from_hex(&self.script_pub_key)?))
    }
}

// Indexers return satoshi either as JSON numbers or as decimal strings; floats are rejected.
fn deserialize_satoshi<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    struct SatoshiVisitor;

    impl<'de> Visitor<'de> for SatoshiVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "an integer amount of satoshi")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            if v < 0 {
                return Err(E::custom(format!("negative amount {}", v)));
            }
            Ok(v as u64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            ensure_amount_integer(v).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            u64::from_str(v).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(SatoshiVisitor)
}

/// Balance summary of an address
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressInfo {
    /// The address
    pub addr_str: String,
    /// Balance
    pub balance: serde_json::Value,
    /// Balance of mature coins
    pub coin_balance: serde_json::Value,
    /// Total received
    pub total_received: serde_json::Value,
    /// Total received, coins only
    pub total_coin_received: serde_json::Value,
    /// Total sent
    pub total_sent: serde_json::Value,
    /// Total sent, coins only
    pub total_coin_sent: serde_json::Value,
    /// Unconfirmed balance
    pub unconfirmed: serde_json::Value,
}

/// Answer of the indexer to a raw transaction broadcast
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SendRawTxResult {
    /// Id of the broadcast transaction
    #[serde(alias = "txid")]
    pub id: String,
    /// `0` when the transaction was accepted
    #[serde(default)]
    pub status: i64,
}

impl SendRawTxResult {
    /// Whether the indexer accepted the transaction
    pub fn is_accepted(&self) -> bool {
        self.status == 0
    }
}

/// Result of a read-only contract call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContractCallResult {
    /// Called contract
    #[serde(default)]
    pub address: String,
    /// Raw execution result
    #[serde(default)]
    pub execution_result: serde_json::Value,
}

/// Input of a transaction as reported by the indexer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TxInputInfo {
    /// Spent transaction
    pub prev_tx_id: String,
    /// Address of the spent output
    pub address: String,
}

/// Output of a transaction as reported by the indexer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TxOutputInfo {
    /// Value, as formatted by the indexer
    pub value: serde_json::Value,
    /// Decoded output script
    pub script_pub_key: serde_json::Value,
    /// Contract execution receipt, if any
    pub receipt: serde_json::Value,
}

/// Detailed information about a single transaction
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionInfo {
    /// Transaction id
    pub id: String,
    /// Version
    pub version: i64,
    /// Lock time
    pub locktime: u64,
    /// Inputs
    pub inputs: Vec<TxInputInfo>,
    /// Outputs
    pub outputs: Vec<TxOutputInfo>,
    /// Number of confirmations
    pub confirmations: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Sum of the outputs
    pub output_value: serde_json::Value,
    /// Sum of the inputs
    pub input_value: serde_json::Value,
    /// Paid fees
    pub fees: serde_json::Value,
    /// Hash of the including block
    pub blockhash: String,
    /// Height of the including block
    pub blockheight: i64,
    /// Token transfers carried by the transaction
    #[serde(rename = "qrc20TokenTransfers")]
    pub token_transfers: Vec<serde_json::Value>,
}

/// Summary of a transaction in an address history
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TransactionSummary {
    /// Transaction id
    pub id: String,
    /// Height of the including block
    pub blockheight: i64,
    /// Hash of the including block
    pub blockhash: String,
    /// Block timestamp
    pub timestamp: u64,
    /// Number of confirmations
    pub confirmations: u64,
    /// Net amount for the address
    pub amount: serde_json::Value,
    /// Sum of the inputs
    pub inputvalue: serde_json::Value,
    /// Sum of the outputs
    pub outputvalue: serde_json::Value,
    /// Paid fees
    pub fees: serde_json::Value,
    /// Kind of transaction
    #[serde(rename = "type")]
    pub kind: String,
}

/// A page of an address history
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionPage {
    /// Number of transactions across all pages
    pub total_count: u64,
    /// Transactions of this page
    pub transactions: Vec<TransactionSummary>,
}
