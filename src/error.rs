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

use crate::network::Network;

/// Errors that can be thrown by the [`Wallet`](crate::wallet::Wallet)
#[derive(Debug)]
pub enum Error {
    /// Generic error
    Generic(String),
    /// A transaction amount given as a float has a fractional part
    NonIntegerAmount(f64),
    /// A transaction amount is negative
    NegativeAmount(f64),
    /// A transaction amount is not a finite number or doesn't fit in 64 bits of satoshi
    InvalidAmount(f64),
    /// A sum of satoshi values doesn't fit in 64 bits
    AmountOverflow,
    /// A fee rate is not a finite, positive number
    InvalidFeeRate(f64),
    /// Wallet's UTXO set is not enough to cover the requested outputs plus fee
    InsufficientFunds {
        /// Sats needed for the outputs and the estimated fee
        needed: u64,
        /// Sats available for spending
        available: u64,
    },
    /// The fee rate is above the sanity ceiling, usually a unit mix-up
    ExcessiveFeeRate {
        /// Requested fee rate (satoshi/byte)
        fee_rate: u64,
        /// Highest accepted fee rate (satoshi/byte)
        max: u64,
    },
    /// `gas_limit * gas_price` doesn't fit in 64 bits
    GasLimitFeeOverflow,
    /// The indexer doesn't have data to estimate a fee rate
    FeeRateUnavailable,
    /// The address string can't be decoded
    InvalidAddress(String),
    /// The address belongs to a different network
    InvalidNetwork {
        /// Network the wallet operates on
        expected: Network,
        /// Version byte found in the address
        version: u8,
    },
    /// A contract address must be exactly 20 bytes
    InvalidContractAddress(usize),
    /// The script is not a well formed create or call script
    InvalidContractScript(String),
    /// The private key is malformed or belongs to a different network
    InvalidKey,

    /// Signing error
    Signer(crate::wallet::signer::SignerError),
    /// Encoding error
    Encode(bitcoin::consensus::encode::Error),
    /// Hex decoding error
    Hex(bitcoin::hashes::hex::Error),
    /// Base58 decoding error
    Base58(bitcoin::util::base58::Error),
    /// Private key error
    Key(bitcoin::util::key::Error),
    /// A secp256k1 error
    Secp256k1(bitcoin::secp256k1::Error),
    /// Error serializing or deserializing JSON data
    Json(serde_json::Error),
    #[cfg(feature = "insight")]
    /// Insight client error
    Insight(Box<crate::blockchain::insight::InsightError>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(err) => write!(f, "Generic error: {}", err),
            Self::NonIntegerAmount(amount) => {
                write!(f, "Expect tx amount to be an integer, got: {}", amount)
            }
            Self::NegativeAmount(amount) => {
                write!(f, "Expect tx amount to be a positive integer, got: {}", amount)
            }
            Self::InvalidAmount(amount) => write!(f, "Invalid tx amount: {}", amount),
            Self::AmountOverflow => write!(f, "Sum of amounts overflows"),
            Self::InvalidFeeRate(rate) => write!(f, "Invalid fee rate: {}", rate),
            Self::InsufficientFunds { needed, available } => write!(
                f,
                "Could not find UTXOs to build transaction: {} sat available of {} sat needed",
                available, needed
            ),
            Self::ExcessiveFeeRate { fee_rate, max } => write!(
                f,
                "Excessive tx fees, is set to 100 times of norm: {} sat/byte (max {} sat/byte)",
                fee_rate, max
            ),
            Self::GasLimitFeeOverflow => write!(f, "Gas limit fee overflows"),
            Self::FeeRateUnavailable => write!(f, "Fee rate unavailable"),
            Self::InvalidAddress(addr) => write!(f, "Invalid address: {}", addr),
            Self::InvalidNetwork { expected, version } => write!(
                f,
                "Invalid network: address version `{}` is not valid on {}",
                version, expected
            ),
            Self::InvalidContractAddress(len) => {
                write!(f, "Invalid contract address: expected 20 bytes, got {}", len)
            }
            Self::InvalidContractScript(err) => write!(f, "Invalid contract script: {}", err),
            Self::InvalidKey => write!(f, "Invalid private key"),
            Self::Signer(err) => write!(f, "Signer error: {}", err),
            Self::Encode(err) => write!(f, "Encoding error: {}", err),
            Self::Hex(err) => write!(f, "Hex decoding error: {}", err),
            Self::Base58(err) => write!(f, "Base58 decoding error: {}", err),
            Self::Key(err) => write!(f, "Key error: {}", err),
            Self::Secp256k1(err) => write!(f, "Secp256k1 error: {}", err),
            Self::Json(err) => write!(f, "Serialize/Deserialize JSON error: {}", err),
            #[cfg(feature = "insight")]
            Self::Insight(err) => write!(f, "Insight client error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! impl_error {
    ( $from:ty, $to:ident ) => {
        impl_error!($from, $to, Error);
    };
    ( $from:ty, $to:ident, $impl_for:ty ) => {
        impl std::convert::From<$from> for $impl_for {
            fn from(err: $from) -> Self {
                <$impl_for>::$to(err)
            }
        }
    };
}

impl_error!(crate::wallet::signer::SignerError, Signer);
impl_error!(bitcoin::consensus::encode::Error, Encode);
impl_error!(bitcoin::hashes::hex::Error, Hex);
impl_error!(bitcoin::util::base58::Error, Base58);
impl_error!(bitcoin::util::key::Error, Key);
impl_error!(bitcoin::secp256k1::Error, Secp256k1);
impl_error!(serde_json::Error, Json);

#[cfg(feature = "insight")]
impl From<crate::blockchain::insight::InsightError> for Error {
    fn from(other: crate::blockchain::insight::InsightError) -> Self {
        Error::Insight(Box::new(other))
    }
}
