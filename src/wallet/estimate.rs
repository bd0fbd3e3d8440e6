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

//! Maximum sendable amount
//!
//! Both estimators start from the whole balance and walk down by a fixed step until the coin
//! selection finds a feasible set of inputs.
//!
//! This is a heuristic. The fee depends on the number of inputs, which changes in jumps as the
//! amount decreases, so the returned value is the first feasible probe on a fixed grid and can be
//! up to one step below the true maximum. A binary search would assume a monotonic relation
//! between amount and feasibility that the selection algorithms don't guarantee.

use crate::address::{Address, ContractAddress};
use crate::error::Error;
use crate::types::{FeeRate, GasParams, OutputIntent, Utxo};
use crate::wallet::coin_selection::{select_coins, CoinSelectionAlgorithm};
use crate::wallet::fee::gas_limit_fee;
use crate::wallet::script::call_contract_script;
use crate::wallet::utils::sum_utxo_values;

/// Step of the plain send estimator, 0.001 BCS
pub const PUBKEY_HASH_STEP: u64 = 100_000;
/// Step of the contract send estimator, 0.0001 BCS
pub const CONTRACT_STEP: u64 = 10_000;

// Only infeasibility moves the probe down, anything else is a real failure
fn is_feasible<Cs: CoinSelectionAlgorithm + ?Sized>(
    coin_selection: &Cs,
    utxos: &[Utxo],
    outputs: &[OutputIntent],
    fee_rate: FeeRate,
) -> Result<bool, Error> {
    match select_coins(coin_selection, utxos, outputs, fee_rate) {
        Ok(_) => Ok(true),
        Err(Error::InsufficientFunds { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

fn descend<F>(start: u64, step: u64, mut probe: F) -> Result<u64, Error>
where
    F: FnMut(u64) -> Result<bool, Error>,
{
    let mut amount = start;
    while amount > 0 {
        if probe(amount)? {
            log::debug!("max sendable amount `{}`", amount);
            return Ok(amount);
        }

        log::trace!("`{}` is not feasible, stepping down by `{}`", amount, step);
        amount = amount.saturating_sub(step);
    }

    Ok(0)
}

/// Largest amount that can be paid to `to` in a single output, `0` if none
pub fn estimate_pubkey_hash_max_send<Cs: CoinSelectionAlgorithm + ?Sized>(
    coin_selection: &Cs,
    utxos: &[Utxo],
    to: &Address,
    fee_rate: FeeRate,
) -> Result<u64, Error> {
    descend(sum_utxo_values(utxos)?, PUBKEY_HASH_STEP, |amount| {
        is_feasible(
            coin_selection,
            utxos,
            &[OutputIntent::to_address(*to, amount)],
            fee_rate,
        )
    })
}

/// Largest amount that can be sent along a call to `contract`, `0` if none
///
/// The gas limit fee is reserved first, the probe starts from what's left of the balance.
pub fn estimate_send_to_contract_max_value<Cs: CoinSelectionAlgorithm + ?Sized>(
    coin_selection: &Cs,
    utxos: &[Utxo],
    contract: &ContractAddress,
    call_data: &[u8],
    gas: GasParams,
    fee_rate: FeeRate,
) -> Result<u64, Error> {
    let gas_fee = gas_limit_fee(&gas)?;
    let start = match sum_utxo_values(utxos)?.checked_sub(gas_fee) {
        Some(start) => start,
        None => return Ok(0),
    };
    let script = call_contract_script(gas, call_data, contract)?;

    descend(start, CONTRACT_STEP, |amount| {
        is_feasible(
            coin_selection,
            utxos,
            &[
                OutputIntent::reserved(gas_fee),
                OutputIntent::to_script(script.clone(), amount),
            ],
            fee_rate,
        )
    })
}
