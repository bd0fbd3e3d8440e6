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

use bitcoin::secp256k1::{All, Secp256k1};

use crate::error::Error;
use crate::types::Utxo;

pub type SecpCtx = Secp256k1<All>;

/// Sum of the values of a set of UTXOs, [`Error::AmountOverflow`] if it doesn't fit in a `u64`
pub fn sum_utxo_values<'a, I: IntoIterator<Item = &'a Utxo>>(utxos: I) -> Result<u64, Error> {
    utxos.into_iter().try_fold(0u64, |sum, utxo| {
        sum.checked_add(utxo.value).ok_or(Error::AmountOverflow)
    })
}
