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

//! Coin selection
//!
//! This module provides the trait [`CoinSelectionAlgorithm`] that can be implemented to
//! define custom coin selection algorithms.
//!
//! The coin selection algorithm is picked when building a transaction through the
//! [`TxBuilder::coin_selection`](super::tx_builder::TxBuilder::coin_selection) method. The
//! [`DefaultCoinSelectionAlgorithm`] is used if it's not explicitly overridden.
//!
//! Algorithms only pick inputs and report the fee: the value of the change output, if any, is
//! derived by the [`TxBuilder`](super::tx_builder::TxBuilder) from the returned fee, which is
//! treated as authoritative.
//!
//! ## Example
//!
//! ```
//! # use bcs_wallet::wallet::coin_selection::*;
//! # use bcs_wallet::*;
//! #[derive(Debug)]
//! struct AlwaysSpendEverything;
//!
//! impl CoinSelectionAlgorithm for AlwaysSpendEverything {
//!     fn coin_select(
//!         &self,
//!         utxos: &[Utxo],
//!         outputs: &[OutputIntent],
//!         fee_rate: FeeRate,
//!     ) -> Result<CoinSelectionResult, bcs_wallet::Error> {
//!         let selected_amount: u64 = utxos.iter().map(|utxo| utxo.value).sum();
//!         let needed = sum_output_values(outputs)
//!             + fee_rate.fee_for_bytes(transaction_size(utxos.len(), outputs));
//!
//!         if selected_amount < needed {
//!             return Err(bcs_wallet::Error::InsufficientFunds {
//!                 needed,
//!                 available: selected_amount,
//!             });
//!         }
//!
//!         Ok(CoinSelectionResult {
//!             selected: utxos.to_vec(),
//!             fee_amount: selected_amount - sum_output_values(outputs),
//!         })
//!     }
//! }
//! ```

use std::cmp::Reverse;

use crate::error::Error;
use crate::types::{FeeRate, OutputIntent, Utxo};
use crate::wallet::utils::sum_utxo_values;

/// Default coin selection algorithm used by [`TxBuilder`](super::tx_builder::TxBuilder) if not
/// overridden
pub type DefaultCoinSelectionAlgorithm = CoinSelect;

/// Version, input and output counts and locktime
pub const TX_EMPTY_SIZE: usize = 4 + 1 + 1 + 4;
/// Outpoint, script length and sequence
pub const TX_INPUT_BASE: usize = 32 + 4 + 1 + 4;
/// A signature and a compressed public key
pub const TX_INPUT_PUBKEYHASH: usize = 107;
/// Value and script length
pub const TX_OUTPUT_BASE: usize = 8 + 1;
/// A P2PKH output script
pub const TX_OUTPUT_PUBKEYHASH: usize = 25;
/// Size of a change output
pub const BLANK_OUTPUT_SIZE: usize = TX_OUTPUT_BASE + TX_OUTPUT_PUBKEYHASH;

/// Estimated size of a signed P2PKH input
pub fn input_size() -> usize {
    TX_INPUT_BASE + TX_INPUT_PUBKEYHASH
}

/// Size of an output, outputs without a script are counted as P2PKH
pub fn output_size(output: &OutputIntent) -> usize {
    TX_OUTPUT_BASE
        + output
            .script()
            .map(|script| script.len())
            .unwrap_or(TX_OUTPUT_PUBKEYHASH)
}

/// Estimated size of a transaction spending `n_inputs` P2PKH inputs
pub fn transaction_size(n_inputs: usize, outputs: &[OutputIntent]) -> usize {
    TX_EMPTY_SIZE + n_inputs * input_size() + outputs.iter().map(output_size).sum::<usize>()
}

/// Below this value an output costs more to spend than it's worth
pub fn dust_threshold(fee_rate: FeeRate) -> u64 {
    fee_rate.fee_for_bytes(input_size())
}

/// Sum of the values of the outputs
pub fn sum_output_values(outputs: &[OutputIntent]) -> u64 {
    outputs
        .iter()
        .fold(0, |sum, output| sum.saturating_add(output.value))
}

/// Result of a successful coin selection
#[derive(Debug, Clone, PartialEq)]
pub struct CoinSelectionResult {
    /// Selected UTXOs, in the order they should be spent
    pub selected: Vec<Utxo>,
    /// Total fee amount in satoshi
    pub fee_amount: u64,
}

impl CoinSelectionResult {
    /// Sum of the selected UTXOs' value
    pub fn selected_amount(&self) -> Result<u64, Error> {
        sum_utxo_values(&self.selected)
    }
}

/// Trait for generalized coin selection algorithms
///
/// This trait can be implemented to make the [`TxBuilder`](super::tx_builder::TxBuilder) use a
/// customized coin selection algorithm when it creates transactions.
///
/// For an example see [this module](crate::wallet::coin_selection)'s documentation.
pub trait CoinSelectionAlgorithm: std::fmt::Debug {
    /// Perform the coin selection
    ///
    /// - `utxos`: the spendable UTXOs
    /// - `outputs`: the outputs that have to be funded, including value reserved without an
    ///              output
    /// - `fee_rate`: fee rate to use
    ///
    /// The returned fee must cover the size of the transaction, and the value left after
    /// outputs and fee is returned as change.
    fn coin_select(
        &self,
        utxos: &[Utxo],
        outputs: &[OutputIntent],
        fee_rate: FeeRate,
    ) -> Result<CoinSelectionResult, Error>;
}

/// Run `coin_selection`, treating an empty selection as infeasible
pub fn select_coins<Cs: CoinSelectionAlgorithm + ?Sized>(
    coin_selection: &Cs,
    utxos: &[Utxo],
    outputs: &[OutputIntent],
    fee_rate: FeeRate,
) -> Result<CoinSelectionResult, Error> {
    let result = coin_selection.coin_select(utxos, outputs, fee_rate)?;
    if result.selected.is_empty() {
        return Err(Error::InsufficientFunds {
            needed: sum_output_values(outputs),
            available: sum_utxo_values(utxos)?,
        });
    }

    Ok(result)
}

// Decide whether the leftover is worth a change output and compute the fee accordingly
fn finalize(
    selected: Vec<Utxo>,
    selected_amount: u64,
    outputs: &[OutputIntent],
    fee_rate: FeeRate,
) -> CoinSelectionResult {
    let outputs_amount = sum_output_values(outputs);
    let fee_with_change =
        fee_rate.fee_for_bytes(transaction_size(selected.len(), outputs) + BLANK_OUTPUT_SIZE);

    let fee_amount = match selected_amount.checked_sub(outputs_amount.saturating_add(fee_with_change)) {
        Some(change) if change > dust_threshold(fee_rate) => fee_with_change,
        _ => selected_amount.saturating_sub(outputs_amount),
    };

    log::debug!(
        "selected `{}` utxos for `{}` sat, fee_amount = `{}`",
        selected.len(),
        selected_amount,
        fee_amount
    );

    CoinSelectionResult {
        selected,
        fee_amount,
    }
}

fn insufficient_funds(utxos: &[Utxo], outputs: &[OutputIntent], fee: u64) -> Error {
    match sum_utxo_values(utxos) {
        Ok(available) => Error::InsufficientFunds {
            needed: sum_output_values(outputs).saturating_add(fee),
            available,
        },
        Err(e) => e,
    }
}

/// Look for a selection that needs no change
///
/// UTXOs are considered in the given order and skipped whenever they would overshoot the
/// target by more than the dust threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blackjack;

impl CoinSelectionAlgorithm for Blackjack {
    fn coin_select(
        &self,
        utxos: &[Utxo],
        outputs: &[OutputIntent],
        fee_rate: FeeRate,
    ) -> Result<CoinSelectionResult, Error> {
        let outputs_amount = sum_output_values(outputs);
        let threshold = dust_threshold(fee_rate);
        let mut size = transaction_size(0, outputs);
        let mut selected_amount: u64 = 0;
        let mut selected = vec![];

        for utxo in utxos {
            let fee = fee_rate.fee_for_bytes(size + input_size());
            if selected_amount.saturating_add(utxo.value)
                > outputs_amount.saturating_add(fee).saturating_add(threshold)
            {
                log::trace!("blackjack: skipping `{}`", utxo.outpoint());
                continue;
            }

            size += input_size();
            selected_amount = selected_amount
                .checked_add(utxo.value)
                .ok_or(Error::AmountOverflow)?;
            selected.push(utxo.clone());

            if selected_amount < outputs_amount.saturating_add(fee) {
                continue;
            }

            return Ok(finalize(selected, selected_amount, outputs, fee_rate));
        }

        Err(insufficient_funds(utxos, outputs, fee_rate.fee_for_bytes(size)))
    }
}

/// Add UTXOs in the given order until the outputs and the fee are covered
///
/// UTXOs worth less than the fee needed to spend them are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Accumulative;

impl CoinSelectionAlgorithm for Accumulative {
    fn coin_select(
        &self,
        utxos: &[Utxo],
        outputs: &[OutputIntent],
        fee_rate: FeeRate,
    ) -> Result<CoinSelectionResult, Error> {
        let outputs_amount = sum_output_values(outputs);
        let mut size = transaction_size(0, outputs);
        let mut selected_amount: u64 = 0;
        let mut selected = vec![];

        for utxo in utxos {
            if fee_rate.fee_for_bytes(input_size()) > utxo.value {
                log::trace!("accumulative: skipping dust `{}`", utxo.outpoint());
                continue;
            }

            size += input_size();
            selected_amount = selected_amount
                .checked_add(utxo.value)
                .ok_or(Error::AmountOverflow)?;
            selected.push(utxo.clone());

            let fee = fee_rate.fee_for_bytes(size);
            if selected_amount < outputs_amount.saturating_add(fee) {
                continue;
            }

            return Ok(finalize(selected, selected_amount, outputs, fee_rate));
        }

        Err(insufficient_funds(utxos, outputs, fee_rate.fee_for_bytes(size)))
    }
}

/// Default coin selection
///
/// Sorts the UTXOs by effective value, the value left after paying for their own input, then
/// tries [`Blackjack`] first to avoid a change output and falls back to [`Accumulative`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CoinSelect;

impl CoinSelectionAlgorithm for CoinSelect {
    fn coin_select(
        &self,
        utxos: &[Utxo],
        outputs: &[OutputIntent],
        fee_rate: FeeRate,
    ) -> Result<CoinSelectionResult, Error> {
        log::debug!(
            "outputs_amount = `{}`, fee_rate = `{}`",
            sum_output_values(outputs),
            fee_rate
        );

        let input_fee = fee_rate.fee_for_bytes(input_size()) as i128;
        let mut sorted = utxos.to_vec();
        sorted.sort_by_key(|utxo| Reverse(utxo.value as i128 - input_fee));

        match Blackjack.coin_select(&sorted, outputs, fee_rate) {
            Err(Error::InsufficientFunds { .. }) => {
                Accumulative.coin_select(&sorted, outputs, fee_rate)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use bitcoin::Txid;

    use super::*;

    const P2PKH_SCRIPT: &str = "76a914424242424242424242424242424242424242424288ac";

    fn utxo(value: u64, index: u32) -> Utxo {
        Utxo {
            address: String::new(),
            transaction_id: Txid::from_str(
                "ebd9813ecebc57ff8f30797de7c205e3c7498ca950ea4341ee51a685ff2fa30a",
            )
            .unwrap(),
            output_index: index,
            script_pub_key: P2PKH_SCRIPT.to_string(),
            value,
            is_stake: false,
            height: 100,
            confirmations: 10,
        }
    }

    fn get_test_utxos() -> Vec<Utxo> {
        vec![utxo(100_000, 0), utxo(200_000, 1)]
    }

    fn payment(value: u64) -> Vec<OutputIntent> {
        vec![OutputIntent::reserved(value)]
    }

    #[test]
    fn test_sizes() {
        assert_eq!(input_size(), 148);
        assert_eq!(BLANK_OUTPUT_SIZE, 34);
        assert_eq!(transaction_size(1, &payment(1)), 10 + 148 + 34);

        let script = bitcoin::Script::from(vec![0x51; 11]);
        assert_eq!(output_size(&OutputIntent::to_script(script, 0)), 20);
        assert_eq!(dust_threshold(FeeRate::from_sat_per_byte(10)), 1480);
    }

    #[test]
    fn test_coin_select_with_change() {
        let utxos = vec![utxo(150_000_000, 0)];

        let result = CoinSelect
            .coin_select(&utxos, &payment(100_000_000), FeeRate::from_sat_per_byte(10))
            .unwrap();

        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected_amount().unwrap(), 150_000_000);
        assert_eq!(result.fee_amount, 2260);
    }

    #[test]
    fn test_coin_select_no_change() {
        let utxos = vec![utxo(10_000, 0), utxo(50_000, 1)];

        let result = CoinSelect
            .coin_select(&utxos, &payment(49_800), FeeRate::from_sat_per_byte(1))
            .unwrap();

        // the leftover is too small for a change output and goes to the fee
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].value, 50_000);
        assert_eq!(result.fee_amount, 200);
    }

    #[test]
    fn test_coin_select_falls_back_to_accumulative() {
        let result = CoinSelect
            .coin_select(&get_test_utxos(), &payment(250_000), FeeRate::from_sat_per_byte(1))
            .unwrap();

        assert_eq!(result.selected.len(), 2);
        assert_eq!(result.selected[0].value, 200_000);
        assert_eq!(result.selected_amount().unwrap(), 300_000);
        assert_eq!(result.fee_amount, 374);
    }

    #[test]
    #[should_panic(expected = "InsufficientFunds")]
    fn test_coin_select_insufficient_funds() {
        CoinSelect
            .coin_select(&get_test_utxos(), &payment(500_000), FeeRate::from_sat_per_byte(1))
            .unwrap();
    }

    #[test]
    fn test_insufficient_funds_amounts() {
        match CoinSelect.coin_select(&get_test_utxos(), &payment(500_000), FeeRate::from_sat_per_byte(1)) {
            Err(Error::InsufficientFunds { needed, available }) => {
                assert_eq!(needed, 500_340);
                assert_eq!(available, 300_000);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "InsufficientFunds")]
    fn test_coin_select_insufficient_funds_high_fees() {
        CoinSelect
            .coin_select(&get_test_utxos(), &payment(250_000), FeeRate::from_sat_per_byte(1000))
            .unwrap();
    }

    #[test]
    fn test_accumulative_skips_dust() {
        let utxos = vec![utxo(1_000, 0), utxo(100_000, 1)];

        let result = Accumulative
            .coin_select(&utxos, &payment(50_000), FeeRate::from_sat_per_byte(10))
            .unwrap();

        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].output_index, 1);
        assert_eq!(result.fee_amount, 2260);
    }

    #[test]
    fn test_blackjack_skips_overshooting_utxos() {
        let utxos = vec![utxo(1_000_000, 0), utxo(50_000, 1)];

        let result = Blackjack
            .coin_select(&utxos, &payment(49_800), FeeRate::from_sat_per_byte(1))
            .unwrap();

        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].output_index, 1);
    }

    #[test]
    fn test_selection_balances() {
        let utxos = vec![utxo(30_000, 0), utxo(70_000, 1), utxo(45_000, 2)];
        let fee_rate = FeeRate::from_sat_per_byte(5);
        let outputs = payment(120_000);

        let result = CoinSelect.coin_select(&utxos, &outputs, fee_rate).unwrap();
        let change = result.selected_amount().unwrap() - sum_output_values(&outputs) - result.fee_amount;

        assert!(
            result.fee_amount
                >= fee_rate.fee_for_bytes(transaction_size(result.selected.len(), &outputs))
        );
        assert!(change == 0 || change > dust_threshold(fee_rate));
    }

    #[derive(Debug)]
    struct SelectNothing;

    impl CoinSelectionAlgorithm for SelectNothing {
        fn coin_select(
            &self,
            _utxos: &[Utxo],
            _outputs: &[OutputIntent],
            _fee_rate: FeeRate,
        ) -> Result<CoinSelectionResult, Error> {
            Ok(CoinSelectionResult {
                selected: vec![],
                fee_amount: 0,
            })
        }
    }

    #[test]
    #[should_panic(expected = "InsufficientFunds")]
    fn test_empty_selection_is_infeasible() {
        select_coins(
            &SelectNothing,
            &get_test_utxos(),
            &payment(1_000),
            FeeRate::from_sat_per_byte(1),
        )
        .unwrap();
    }

    #[test]
    fn test_utxo_sum_overflow() {
        let utxos = vec![utxo(u64::MAX / 2 + 1, 0), utxo(u64::MAX / 2 + 1, 1)];
        let outputs = payment(u64::MAX);

        for result in vec![
            CoinSelect.coin_select(&utxos, &outputs, FeeRate::from_sat_per_byte(1)),
            Accumulative.coin_select(&utxos, &outputs, FeeRate::from_sat_per_byte(1)),
        ] {
            assert!(matches!(result, Err(Error::AmountOverflow)));
        }
    }

    #[test]
    fn test_huge_fee_rate_is_infeasible() {
        let result = CoinSelect.coin_select(
            &get_test_utxos(),
            &payment(1_000),
            FeeRate::from_sat_per_byte(u64::MAX / 100),
        );
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
    }
}
