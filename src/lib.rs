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

// only enables the `doc_cfg` feature when
// the `docsrs` configuration attribute is defined
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A wallet SDK for the BCS chain.
//!
//! The library builds and signs transactions for a single key: plain payments, contract
//! deployments and contract calls. UTXOs, fee estimates and broadcasting go through an
//! [`Indexer`](blockchain::Indexer), the [Insight](blockchain::insight) API by default.
//!
//! # A Tour of the library
//!
//! * [`Wallet`] fetches UTXOs, resolves fee rates and broadcasts what it builds
//! * [`TxBuilder`] selects coins, adds the outputs and the change, then signs every input
//! * [`wallet::coin_selection`] chooses the inputs and the fee
//! * [`wallet::script`] encodes contract create and call scripts
//! * [`wallet::estimate`] finds the largest amount a wallet can send
//!
//! ## Example
//!
//! ```
//! use bcs_wallet::bitcoin::secp256k1::Secp256k1;
//! use bcs_wallet::{KeyPair, Network, Operation, TxBuilder};
//!
//! let secp = Secp256k1::new();
//! let keypair = KeyPair::from_wif(
//!     "cMbgxCJrTYUqgcmiC1berh5DFrtY1KeU4PXZ6NZxgenniF1mXCRk",
//!     Network::Regtest,
//!     &secp,
//! )?;
//!
//! let operation = Operation::Pay {
//!     to: keypair.address(),
//!     amount: 10_000,
//! };
//! // without UTXOs there's nothing to spend
//! assert!(TxBuilder::new()
//!     .build(&[], &keypair, &operation, bcs_wallet::FeeRate::from_sat_per_byte(10))
//!     .is_err());
//! # Ok::<(), bcs_wallet::Error>(())
//! ```

pub extern crate bitcoin;
extern crate log;
extern crate serde;
extern crate serde_json;

#[cfg(feature = "insight")]
pub extern crate reqwest;

#[macro_use]
pub(crate) mod error;
pub mod address;
pub mod blockchain;
pub mod keys;
pub mod network;
pub(crate) mod types;
pub mod wallet;

pub use address::{Address, ContractAddress};
pub use error::Error;
pub use keys::KeyPair;
pub use network::Network;
pub use types::*;
pub use wallet::signer;
pub use wallet::tx_builder::{Operation, TxBuilder};
pub use wallet::Wallet;
