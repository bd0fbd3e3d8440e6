#![allow(unused)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bcs_wallet::bitcoin::consensus::encode::deserialize;
use bcs_wallet::bitcoin::hashes::hex::{FromHex, ToHex};
use bcs_wallet::bitcoin::hashes::Hash;
use bcs_wallet::bitcoin::secp256k1::{All, Secp256k1};
use bcs_wallet::bitcoin::{PubkeyHash, Transaction, Txid};
use bcs_wallet::blockchain::Indexer;
use bcs_wallet::wallet::coin_selection::{
    CoinSelect, CoinSelectionAlgorithm, CoinSelectionResult,
};
use bcs_wallet::*;
use lazy_static::lazy_static;
use serde_json::json;

lazy_static! {
    static ref SECP: Secp256k1<All> = Secp256k1::new();
}

pub const TEST_WIF: &str = "cMbgxCJrTYUqgcmiC1berh5DFrtY1KeU4PXZ6NZxgenniF1mXCRk";
pub const TEST_CONTRACT: &str = "d9dfd5c1b4c1fce9b9d0b2b94d2cc0ef7fe1eae7";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn get_test_keypair() -> KeyPair {
    KeyPair::from_wif(TEST_WIF, Network::Regtest, &SECP).unwrap()
}

/// A regtest address nobody in the tests owns
pub fn get_test_destination() -> Address {
    Address::p2pkh(PubkeyHash::from_slice(&[0x42; 20]).unwrap(), Network::Regtest)
}

pub fn get_test_utxo(keypair: &KeyPair, value: u64, index: u32) -> Utxo {
    Utxo {
        address: keypair.address().to_string(),
        transaction_id: Txid::from_hex(
            "ebd9813ecebc57ff8f30797de7c205e3c7498ca950ea4341ee51a685ff2fa30a",
        )
        .unwrap(),
        output_index: index,
        script_pub_key: keypair.address().script_pubkey().as_bytes().to_hex(),
        value,
        is_stake: false,
        height: 1_000,
        confirmations: 6,
    }
}

pub fn decode_tx(raw: &str) -> Transaction {
    deserialize(&Vec::<u8>::from_hex(raw).unwrap()).unwrap()
}

/// An indexer serving a fixed UTXO set and recording broadcasts
#[derive(Debug, Default)]
pub struct MockIndexer {
    pub utxos: Vec<Utxo>,
    pub fee_per_kb: Option<u64>,
    pub broadcast: Mutex<Vec<String>>,
}

impl MockIndexer {
    pub fn with_utxos(utxos: Vec<Utxo>) -> Self {
        MockIndexer {
            utxos,
            ..Default::default()
        }
    }

    pub fn broadcast_txs(&self) -> Vec<Transaction> {
        self.broadcast
            .lock()
            .unwrap()
            .iter()
            .map(|raw| decode_tx(raw))
            .collect()
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn list_utxos(&self, _address: &Address) -> Result<Vec<Utxo>, Error> {
        Ok(self.utxos.clone())
    }

    async fn get_info(&self, address: &Address) -> Result<AddressInfo, Error> {
        let balance: u64 = self.utxos.iter().map(|utxo| utxo.value).sum();
        Ok(AddressInfo {
            addr_str: address.to_string(),
            balance: json!(balance),
            ..Default::default()
        })
    }

    async fn send_raw_tx(&self, raw_tx: &str) -> Result<SendRawTxResult, Error> {
        let tx: Transaction = deserialize(&Vec::<u8>::from_hex(raw_tx)?)?;
        self.broadcast.lock().unwrap().push(raw_tx.to_string());

        Ok(SendRawTxResult {
            id: tx.txid().to_string(),
            status: 0,
        })
    }

    async fn contract_call(
        &self,
        contract: &ContractAddress,
        call_data: &[u8],
    ) -> Result<ContractCallResult, Error> {
        Ok(ContractCallResult {
            address: contract.to_string(),
            execution_result: json!({ "output": call_data.to_hex() }),
        })
    }

    async fn estimate_fee(&self, _target: usize) -> Result<u64, Error> {
        self.fee_per_kb.ok_or(Error::FeeRateUnavailable)
    }

    async fn get_transaction_info(&self, txid: &Txid) -> Result<TransactionInfo, Error> {
        Ok(TransactionInfo {
            id: txid.to_string(),
            ..Default::default()
        })
    }

    async fn get_transactions(
        &self,
        _address: &Address,
        _page: u32,
    ) -> Result<TransactionPage, Error> {
        Ok(TransactionPage::default())
    }
}

/// The default coin selection, counting its invocations
#[derive(Debug, Default, Clone)]
pub struct CountingSelection {
    pub calls: Arc<AtomicUsize>,
}

impl CountingSelection {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CoinSelectionAlgorithm for CountingSelection {
    fn coin_select(
        &self,
        utxos: &[Utxo],
        outputs: &[OutputIntent],
        fee_rate: FeeRate,
    ) -> Result<CoinSelectionResult, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CoinSelect.coin_select(utxos, outputs, fee_rate)
    }
}

pub fn get_funded_wallet(values: &[u64]) -> (Wallet<MockIndexer, CountingSelection>, CountingSelection) {
    let keypair = get_test_keypair();
    let utxos = values
        .iter()
        .enumerate()
        .map(|(index, value)| get_test_utxo(&keypair, *value, index as u32))
        .collect();
    let selection = CountingSelection::default();
    let wallet = Wallet::with_tx_builder(
        keypair,
        MockIndexer::with_utxos(utxos),
        TxBuilder::new().coin_selection(selection.clone()),
    );

    (wallet, selection)
}
