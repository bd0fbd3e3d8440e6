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

//! Transaction builder
//!
//! ## Example
//!
//! ```
//! # use bitcoin::secp256k1::Secp256k1;
//! # use bcs_wallet::wallet::tx_builder::*;
//! # use bcs_wallet::wallet::coin_selection::Accumulative;
//! # use bcs_wallet::*;
//! # let secp = Secp256k1::new();
//! # let keypair = KeyPair::from_wif("cMbgxCJrTYUqgcmiC1berh5DFrtY1KeU4PXZ6NZxgenniF1mXCRk", Network::Testnet, &secp)?;
//! # let utxos: Vec<Utxo> = vec![];
//! let operation = Operation::Pay {
//!     to: keypair.address(),
//!     amount: 100_000,
//! };
//! let builder = TxBuilder::new().coin_selection(Accumulative);
//!
//! match builder.build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(10)) {
//!     Ok(built) => println!("{}", built.to_hex()),
//!     Err(Error::InsufficientFunds { .. }) => println!("fund the wallet first"),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), bcs_wallet::Error>(())
//! ```

use std::default::Default;

use bitcoin::consensus::encode::serialize_hex;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Script, Transaction, TxIn, TxOut, Txid};

use crate::address::{Address, ContractAddress, Payload};
use crate::error::Error;
use crate::keys::KeyPair;
use crate::types::{Destination, FeeRate, GasParams, OutputIntent, Utxo};
use crate::wallet::coin_selection::{
    select_coins, sum_output_values, CoinSelectionAlgorithm, DefaultCoinSelectionAlgorithm,
};
use crate::wallet::fee::{gas_limit_fee, FeeRateGuard};
use crate::wallet::script::{call_contract_script, create_contract_script};
use crate::wallet::signer::Signer;
use crate::wallet::utils::{sum_utxo_values, SecpCtx};

/// Version of the transactions built by the wallet
pub const TX_VERSION: i32 = 1;
/// Sequence of every input, final
pub const TX_SEQUENCE: u32 = 0xFFFF_FFFF;

/// What a transaction does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Pay `amount` satoshi to an address
    Pay {
        /// Recipient
        to: Address,
        /// Value in satoshi
        amount: u64,
    },
    /// Deploy a contract
    CreateContract {
        /// Contract bytecode
        bytecode: Vec<u8>,
        /// Gas parameters of the deployment
        gas: GasParams,
    },
    /// Call a contract, optionally sending it some value
    SendToContract {
        /// Called contract
        contract: ContractAddress,
        /// ABI encoded call data
        call_data: Vec<u8>,
        /// Value sent to the contract, in satoshi
        amount: u64,
        /// Gas parameters of the call
        gas: GasParams,
    },
}

impl Operation {
    // Outputs to fund, in order: the gas reserve first for contract operations
    fn output_intents(&self) -> Result<(Vec<OutputIntent>, u64), Error> {
        match self {
            Operation::Pay { to, amount } => Ok((vec![OutputIntent::to_address(*to, *amount)], 0)),
            Operation::CreateContract { bytecode, gas } => {
                let gas_fee = gas_limit_fee(gas)?;
                let script = create_contract_script(*gas, bytecode)?;
                Ok((
                    vec![
                        OutputIntent::reserved(gas_fee),
                        OutputIntent::to_script(script, 0),
                    ],
                    gas_fee,
                ))
            }
            Operation::SendToContract {
                contract,
                call_data,
                amount,
                gas,
            } => {
                let gas_fee = gas_limit_fee(gas)?;
                let script = call_contract_script(*gas, call_data, contract)?;
                Ok((
                    vec![
                        OutputIntent::reserved(gas_fee),
                        OutputIntent::to_script(script, *amount),
                    ],
                    gas_fee,
                ))
            }
        }
    }
}

/// A signed transaction and its accounting
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTransaction {
    /// The signed transaction
    pub transaction: Transaction,
    /// Fee paid to the miner, as computed by the coin selection
    pub fee: u64,
    /// Value reserved for contract execution, not assigned to any output
    pub gas_limit_fee: u64,
    /// Value returned to the sender, `0` if there's no change output
    pub change: u64,
}

impl BuiltTransaction {
    /// Serialized transaction, ready to be broadcast
    pub fn to_hex(&self) -> String {
        serialize_hex(&self.transaction)
    }

    /// Id of the transaction
    pub fn txid(&self) -> Txid {
        self.transaction.txid()
    }
}

/// Builds and signs transactions from a set of UTXOs
///
/// The builder holds no UTXO state: every call gets a fresh UTXO set and either returns a fully
/// signed transaction or fails without side effects.
#[derive(Debug)]
pub struct TxBuilder<Cs: CoinSelectionAlgorithm = DefaultCoinSelectionAlgorithm> {
    coin_selection: Cs,
    fee_rate_guard: Option<FeeRateGuard>,
    secp: SecpCtx,
}

impl Default for TxBuilder<DefaultCoinSelectionAlgorithm> {
    fn default() -> Self {
        TxBuilder {
            coin_selection: DefaultCoinSelectionAlgorithm::default(),
            fee_rate_guard: Some(FeeRateGuard::default()),
            secp: Secp256k1::new(),
        }
    }
}

impl TxBuilder<DefaultCoinSelectionAlgorithm> {
    /// Create a builder with the default coin selection and fee rate guard
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Cs: CoinSelectionAlgorithm> TxBuilder<Cs> {
    /// Choose the coin selection algorithm
    ///
    /// Overrides the [`DefaultCoinSelectionAlgorithm`](super::coin_selection::DefaultCoinSelectionAlgorithm).
    pub fn coin_selection<P: CoinSelectionAlgorithm>(self, coin_selection: P) -> TxBuilder<P> {
        TxBuilder {
            coin_selection,
            fee_rate_guard: self.fee_rate_guard,
            secp: self.secp,
        }
    }

    /// Replace the fee rate ceiling, `None` disables it
    pub fn fee_rate_guard(mut self, fee_rate_guard: Option<FeeRateGuard>) -> Self {
        self.fee_rate_guard = fee_rate_guard;
        self
    }

    /// Coin selection algorithm in use
    pub fn get_coin_selection(&self) -> &Cs {
        &self.coin_selection
    }

    /// Fail if `fee_rate` is zero or above the fee rate guard
    ///
    /// [`build`](Self::build) runs this before selecting coins, estimators should too.
    pub fn check_fee_rate(&self, fee_rate: FeeRate) -> Result<(), Error> {
        if fee_rate.as_sat_per_byte() == 0 {
            return Err(Error::InvalidFeeRate(0.0));
        }
        if let Some(guard) = &self.fee_rate_guard {
            guard.check_fee_rate(fee_rate)?;
        }

        Ok(())
    }

    /// Select coins for `operation`, then build and sign the transaction
    ///
    /// Change goes back to the [`Signer::address`], and only if there's some.
    pub fn build<S: Signer + ?Sized>(
        &self,
        utxos: &[Utxo],
        signer: &S,
        operation: &Operation,
        fee_rate: FeeRate,
    ) -> Result<BuiltTransaction, Error> {
        self.check_fee_rate(fee_rate)?;

        let sender = signer.address();
        if let Operation::Pay { to, .. } = operation {
            check_network(to, &sender)?;
        }

        let (intents, gas_fee) = operation.output_intents()?;
        let coin_selection = select_coins(&self.coin_selection, utxos, &intents, fee_rate)?;
        let fee = coin_selection.fee_amount;
        let selected_amount = coin_selection.selected_amount()?;

        let outputs_amount = sum_output_values(&intents);
        let change = selected_amount
            .checked_sub(outputs_amount)
            .and_then(|left| left.checked_sub(fee))
            .ok_or_else(|| Error::InsufficientFunds {
                needed: outputs_amount.saturating_add(fee),
                available: selected_amount,
            })?;

        let input = coin_selection
            .selected
            .iter()
            .map(|utxo| TxIn {
                previous_output: utxo.outpoint(),
                script_sig: Script::new(),
                sequence: TX_SEQUENCE,
                witness: vec![],
            })
            .collect();

        let mut output: Vec<TxOut> = intents
            .iter()
            .filter_map(|intent| match &intent.destination {
                Destination::Address(address) => Some(TxOut {
                    value: intent.value,
                    script_pubkey: address.script_pubkey(),
                }),
                Destination::Script(script) => Some(TxOut {
                    value: intent.value,
                    script_pubkey: script.clone(),
                }),
                Destination::Unassigned => None,
            })
            .collect();
        if change > 0 {
            output.push(TxOut {
                value: change,
                script_pubkey: sender.script_pubkey(),
            });
        }

        let mut tx = Transaction {
            version: TX_VERSION,
            lock_time: 0,
            input,
            output,
        };

        for (index, utxo) in coin_selection.selected.iter().enumerate() {
            let prev_script = utxo.script()?;
            let prev_script = if prev_script.is_empty() {
                sender.script_pubkey()
            } else {
                prev_script
            };

            signer.sign(&mut tx, index, &prev_script, &self.secp)?;
        }

        log::info!(
            "built tx `{}`: `{}` inputs for `{}` sat, fee `{}`, gas `{}`, change `{}`",
            tx.txid(),
            tx.input.len(),
            selected_amount,
            fee,
            gas_fee,
            change
        );

        Ok(BuiltTransaction {
            transaction: tx,
            fee,
            gas_limit_fee: gas_fee,
            change,
        })
    }
}

// Networks sharing version bytes, like testnet and regtest, accept each other's addresses
fn check_network(to: &Address, sender: &Address) -> Result<(), Error> {
    let (version, expected) = match to.payload {
        Payload::PubkeyHash(_) => (
            to.network.info().pubkey_hash,
            sender.network.info().pubkey_hash,
        ),
        Payload::ScriptHash(_) => (
            to.network.info().script_hash,
            sender.network.info().script_hash,
        ),
    };
    if version == expected {
        return Ok(());
    }

    Err(Error::InvalidNetwork {
        expected: sender.network,
        version,
    })
}

/// Build a signed pay-to-pubkey-hash transaction with the default coin selection
pub fn build_pubkey_hash_transaction(
    utxos: &[Utxo],
    keypair: &KeyPair,
    to: &Address,
    amount: u64,
    fee_rate: FeeRate,
) -> Result<String, Error> {
    let operation = Operation::Pay { to: *to, amount };
    Ok(TxBuilder::new()
        .build(utxos, keypair, &operation, fee_rate)?
        .to_hex())
}

/// Build a signed contract deployment with the default coin selection
pub fn build_create_contract_transaction(
    utxos: &[Utxo],
    keypair: &KeyPair,
    bytecode: &[u8],
    gas: GasParams,
    fee_rate: FeeRate,
) -> Result<String, Error> {
    let operation = Operation::CreateContract {
        bytecode: bytecode.to_vec(),
        gas,
    };
    Ok(TxBuilder::new()
        .build(utxos, keypair, &operation, fee_rate)?
        .to_hex())
}

/// Build a signed contract call with the default coin selection
pub fn build_send_to_contract_transaction(
    utxos: &[Utxo],
    keypair: &KeyPair,
    contract: &ContractAddress,
    call_data: &[u8],
    amount: u64,
    gas: GasParams,
    fee_rate: FeeRate,
) -> Result<String, Error> {
    let operation = Operation::SendToContract {
        contract: *contract,
        call_data: call_data.to_vec(),
        amount,
        gas,
    };
    Ok(TxBuilder::new()
        .build(utxos, keypair, &operation, fee_rate)?
        .to_hex())
}

/// Sum of the values spent by a built transaction, looked up in the UTXO set it was built from
pub fn spent_amount(built: &BuiltTransaction, utxos: &[Utxo]) -> Result<u64, Error> {
    sum_utxo_values(utxos.iter().filter(|utxo| {
        built
            .transaction
            .input
            .iter()
            .any(|txin| txin.previous_output == utxo.outpoint())
    }))
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use bitcoin::consensus::encode::deserialize;
    use bitcoin::hashes::hex::{FromHex, ToHex};
    use bitcoin::hashes::Hash;
    use bitcoin::PubkeyHash;

    use super::*;
    use crate::network::Network;
    use crate::wallet::coin_selection::Accumulative;
    use crate::wallet::script::ContractScript;

    const TEST_WIF: &str = "cMbgxCJrTYUqgcmiC1berh5DFrtY1KeU4PXZ6NZxgenniF1mXCRk";
    const CONTRACT: &str = "d9dfd5c1b4c1fce9b9d0b2b94d2cc0ef7fe1eae7";

    fn get_test_keypair() -> KeyPair {
        KeyPair::from_wif(TEST_WIF, Network::Regtest, &Secp256k1::new()).unwrap()
    }

    fn get_test_utxo(keypair: &KeyPair, value: u64, index: u32) -> Utxo {
        Utxo {
            address: keypair.address().to_string(),
            transaction_id: Txid::from_str(
                "ebd9813ecebc57ff8f30797de7c205e3c7498ca950ea4341ee51a685ff2fa30a",
            )
            .unwrap(),
            output_index: index,
            script_pub_key: keypair.address().script_pubkey().as_bytes().to_hex(),
            value,
            is_stake: false,
            height: 100,
            confirmations: 10,
        }
    }

    fn destination() -> Address {
        Address::p2pkh(PubkeyHash::from_slice(&[0x42; 20]).unwrap(), Network::Regtest)
    }

    fn gas() -> GasParams {
        GasParams {
            gas_limit: 250_000,
            gas_price: 40,
        }
    }

    fn output_sum(tx: &Transaction) -> u64 {
        tx.output.iter().map(|o| o.value).sum()
    }

    #[test]
    fn test_pay_with_change() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 100_000_000,
        };

        let built = TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(10))
            .unwrap();
        let tx = &built.transaction;

        assert_eq!(tx.version, 1);
        assert_eq!(tx.lock_time, 0);
        assert_eq!(tx.input.len(), 1);
        assert_eq!(tx.input[0].previous_output, utxos[0].outpoint());
        assert_eq!(tx.input[0].sequence, 0xFFFF_FFFF);
        assert!(!tx.input[0].script_sig.is_empty());

        assert_eq!(tx.output.len(), 2);
        assert_eq!(tx.output[0].value, 100_000_000);
        assert_eq!(tx.output[0].script_pubkey, destination().script_pubkey());
        assert_eq!(built.fee, 2260);
        assert_eq!(tx.output[1].value, 150_000_000 - 2260 - 100_000_000);
        assert_eq!(tx.output[1].script_pubkey, keypair.address().script_pubkey());
        assert_eq!(built.change, tx.output[1].value);

        assert_eq!(spent_amount(&built, &utxos).unwrap(), output_sum(tx) + built.fee);
    }

    #[test]
    fn test_pay_without_change() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 50_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 49_800,
        };

        let built = TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(1))
            .unwrap();

        assert_eq!(built.transaction.output.len(), 1);
        assert_eq!(built.change, 0);
        assert_eq!(built.fee, 200);
        assert_eq!(
            spent_amount(&built, &utxos).unwrap(),
            output_sum(&built.transaction) + built.fee
        );
    }

    #[test]
    fn test_hex_roundtrip() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];

        let hex = build_pubkey_hash_transaction(
            &utxos,
            &keypair,
            &destination(),
            100_000_000,
            FeeRate::from_sat_per_byte(10),
        )
        .unwrap();
        let tx: Transaction = deserialize(&Vec::<u8>::from_hex(&hex).unwrap()).unwrap();

        assert_eq!(tx.output[0].value, 100_000_000);
        assert_eq!(tx.output.len(), 2);
    }

    #[test]
    fn test_insufficient_funds() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 100_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 100_000,
        };

        let result = TxBuilder::new().build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(1));
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
    }

    #[test]
    #[should_panic(expected = "ExcessiveFeeRate")]
    fn test_excessive_fee_rate() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 1_000,
        };

        TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(39_064))
            .unwrap();
    }

    #[test]
    fn test_fee_rate_guard_disabled() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 1_000,
        };

        let built = TxBuilder::new()
            .fee_rate_guard(None)
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(39_064))
            .unwrap();
        assert!(built.fee >= 39_064 * 192);
    }

    #[test]
    #[should_panic(expected = "InvalidFeeRate")]
    fn test_zero_fee_rate() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 1_000,
        };

        TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(0))
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "InvalidNetwork")]
    fn test_pay_wrong_network() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let to = Address::p2pkh(PubkeyHash::from_slice(&[0x42; 20]).unwrap(), Network::Mainnet);
        let operation = Operation::Pay { to, amount: 1_000 };

        TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(1))
            .unwrap();
    }

    #[test]
    fn test_wrong_network_reports_address_version() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let to = Address::p2pkh(PubkeyHash::from_slice(&[0x42; 20]).unwrap(), Network::Mainnet);
        let operation = Operation::Pay { to, amount: 1_000 };

        let result =
            TxBuilder::new().build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(1));
        assert!(matches!(
            result,
            Err(Error::InvalidNetwork {
                expected: Network::Regtest,
                version: 25
            })
        ));
    }

    #[test]
    fn test_pay_testnet_address_from_regtest() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let to = Address::p2pkh(PubkeyHash::from_slice(&[0x42; 20]).unwrap(), Network::Testnet);
        let operation = Operation::Pay { to, amount: 1_000 };

        let built = TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(1))
            .unwrap();
        assert_eq!(built.transaction.output[0].script_pubkey, to.script_pubkey());
    }

    #[test]
    fn test_check_fee_rate() {
        let builder = TxBuilder::new();

        assert!(builder.check_fee_rate(FeeRate::from_sat_per_byte(1)).is_ok());
        assert!(builder.check_fee_rate(FeeRate::from_sat_per_byte(39_063)).is_ok());
        assert!(matches!(
            builder.check_fee_rate(FeeRate::from_sat_per_byte(0)),
            Err(Error::InvalidFeeRate(_))
        ));
        assert!(matches!(
            builder.check_fee_rate(FeeRate::from_sat_per_byte(39_064)),
            Err(Error::ExcessiveFeeRate { .. })
        ));
        assert!(builder
            .fee_rate_guard(None)
            .check_fee_rate(FeeRate::from_sat_per_byte(39_064))
            .is_ok());
    }

    #[test]
    fn test_huge_fee_rate_without_guard() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let operation = Operation::Pay {
            to: destination(),
            amount: 1_000,
        };

        let result = TxBuilder::new().fee_rate_guard(None).build(
            &utxos,
            &keypair,
            &operation,
            FeeRate::from_sat_per_byte(u64::MAX / 100),
        );
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
    }

    #[test]
    fn test_create_contract() {
        let keypair = get_test_keypair();
        let utxos = vec![get_test_utxo(&keypair, 150_000_000, 0)];
        let operation = Operation::CreateContract {
            bytecode: vec![0x60, 0x60, 0x60, 0x40],
            gas: gas(),
        };

        let built = TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(10))
            .unwrap();
        let tx = &built.transaction;

        // the gas reserve has no output of its own
        assert_eq!(tx.output.len(), 2);
        assert_eq!(tx.output[0].value, 0);
        assert_eq!(
            ContractScript::from_script(&tx.output[0].script_pubkey).unwrap(),
            ContractScript::create(gas(), vec![0x60, 0x60, 0x60, 0x40])
        );
        assert_eq!(built.gas_limit_fee, 10_000_000);
        assert_eq!(
            tx.output[1].value,
            150_000_000 - built.fee - built.gas_limit_fee
        );
        assert_eq!(
            spent_amount(&built, &utxos).unwrap(),
            output_sum(tx) + built.fee + built.gas_limit_fee
        );
    }

    #[test]
    fn test_send_to_contract() {
        let keypair = get_test_keypair();
        let utxos = vec![
            get_test_utxo(&keypair, 6_000_000, 0),
            get_test_utxo(&keypair, 7_000_000, 1),
        ];
        let contract = ContractAddress::from_hex(CONTRACT).unwrap();
        let operation = Operation::SendToContract {
            contract,
            call_data: vec![0xa9, 0x05, 0x9c, 0xbb],
            amount: 1_000_000,
            gas: gas(),
        };

        let built = TxBuilder::new()
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(10))
            .unwrap();
        let tx = &built.transaction;

        assert_eq!(tx.input.len(), 2);
        assert_eq!(tx.output[0].value, 1_000_000);
        assert_eq!(
            ContractScript::from_script(&tx.output[0].script_pubkey)
                .unwrap()
                .op,
            crate::wallet::script::ContractOp::Call(contract)
        );
        assert_eq!(
            spent_amount(&built, &utxos).unwrap(),
            output_sum(tx) + built.fee + built.gas_limit_fee
        );
        if built.change > 0 {
            assert_eq!(tx.output.len(), 2);
        } else {
            assert_eq!(tx.output.len(), 1);
        }
    }

    #[test]
    fn test_custom_coin_selection() {
        let keypair = get_test_keypair();
        let utxos = vec![
            get_test_utxo(&keypair, 100_000, 0),
            get_test_utxo(&keypair, 200_000, 1),
        ];
        let operation = Operation::Pay {
            to: destination(),
            amount: 50_000,
        };

        let built = TxBuilder::new()
            .coin_selection(Accumulative)
            .build(&utxos, &keypair, &operation, FeeRate::from_sat_per_byte(1))
            .unwrap();

        // accumulative keeps the given order
        assert_eq!(built.transaction.input.len(), 1);
        assert_eq!(built.transaction.input[0].previous_output.vout, 0);
    }

    #[test]
    fn test_missing_prev_script_uses_sender() {
        let keypair = get_test_keypair();
        let mut utxo = get_test_utxo(&keypair, 150_000_000, 0);
        utxo.script_pub_key = String::new();
        let operation = Operation::Pay {
            to: destination(),
            amount: 1_000_000,
        };

        let built = TxBuilder::new()
            .build(&[utxo], &keypair, &operation, FeeRate::from_sat_per_byte(1))
            .unwrap();
        assert_eq!(built.transaction.input[0].script_sig.instructions().count(), 2);
    }

    #[test]
    #[should_panic(expected = "MissingKey")]
    fn test_foreign_utxo() {
        let keypair = get_test_keypair();
        let mut utxo = get_test_utxo(&keypair, 150_000_000, 0);
        utxo.script_pub_key = destination().script_pubkey().as_bytes().to_hex();
        let operation = Operation::Pay {
            to: destination(),
            amount: 1_000_000,
        };

        TxBuilder::new()
            .build(&[utxo], &keypair, &operation, FeeRate::from_sat_per_byte(1))
            .unwrap();
    }
}
