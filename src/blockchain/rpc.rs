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

//! Node RPC
//!
//! Regtest nodes mine blocks on request through the `generate` JSON-RPC method, which lets
//! tests confirm the transactions they broadcast.
//!
//! ## Example
//!
//! ```no_run
//! # use bcs_wallet::blockchain::{generate_block, RpcBlockGenerator};
//! # use bcs_wallet::blockchain::rpc::RpcConfig;
//! # use bcs_wallet::Network;
//! # async fn run() -> Result<(), bcs_wallet::Error> {
//! let generator = RpcBlockGenerator::new(RpcConfig::default());
//! generate_block(&generator, Network::Regtest).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::insight::InsightError;
use super::BlockGenerator;
use crate::error::Error;

/// Connection to a node's JSON-RPC interface
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RpcConfig {
    /// The node url
    pub url: String,
    /// RPC user
    pub user: String,
    /// RPC password
    pub pass: String,
}

impl Default for RpcConfig {
    /// A local regtest node, `http://localhost:18332` with user `bcs` and password `test`
    fn default() -> Self {
        RpcConfig {
            url: "http://localhost:18332".to_string(),
            user: "bcs".to_string(),
            pass: "test".to_string(),
        }
    }
}

/// Mines blocks through the `generate` RPC of a regtest node
#[derive(Debug, Clone)]
pub struct RpcBlockGenerator {
    config: RpcConfig,
    client: Client,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

impl RpcBlockGenerator {
    /// Create a generator talking to the node described by `config`
    pub fn new(config: RpcConfig) -> Self {
        RpcBlockGenerator {
            config,
            client: Client::new(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        debug!("RPC {} {}", method, params);

        let response: RpcResponse = self
            .client
            .post(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.pass))
            .json(&json!({
                "jsonrpc": "1.0",
                "id": "bcs-wallet",
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .map_err(InsightError::from)?
            .json()
            .await
            .map_err(InsightError::from)?;

        match response.error {
            Some(err) if !err.is_null() => Err(Error::Generic(format!("RPC error: {}", err))),
            _ => Ok(response.result.unwrap_or(Value::Null)),
        }
    }
}

#[async_trait]
impl BlockGenerator for RpcBlockGenerator {
    async fn generate(&self, nblocks: u32) -> Result<Vec<String>, Error> {
        let result = self.call("generate", json!([nblocks])).await?;
        Ok(serde_json::from_value(result)?)
    }
}
