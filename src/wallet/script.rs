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

//! Contract scripts
//!
//! Deploying or invoking a contract is done by paying to an output script that the execution
//! layer interprets:
//!
//! ```text
//! OP_4 <gas_limit> <gas_price> <bytecode> OP_CREATE
//! OP_4 <gas_limit> <gas_price> <call_data> <contract_address> OP_CALL
//! ```
//!
//! Gas values are minimally encoded script numbers and every push uses the shortest form
//! (single byte values `1..=16` become `OP_1`..`OP_16`), so the bytes match what the network's
//! interpreter expects.
//!
//! ## Example
//!
//! ```
//! # use bcs_wallet::wallet::script::*;
//! # use bcs_wallet::GasParams;
//! let gas = GasParams { gas_limit: 250_000, gas_price: 40 };
//! let script = ContractScript::create(gas, vec![0x60, 0x60]).to_script()?;
//!
//! assert_eq!(ContractScript::from_script(&script)?, ContractScript::create(gas, vec![0x60, 0x60]));
//! # Ok::<(), bcs_wallet::Error>(())
//! ```

use std::convert::TryFrom;

use bitcoin::blockdata::opcodes::{self, all::OP_PUSHNUM_1, all::OP_PUSHNUM_16, all::OP_PUSHNUM_NEG1};
use bitcoin::blockdata::script::{Builder, Instruction, Script};

use crate::address::ContractAddress;
use crate::error::Error;
use crate::types::GasParams;

/// Version of the contract virtual machine, pushed as `OP_4`
pub const CONTRACT_VM_VERSION: i64 = 4;
/// Opcode deploying a new contract
pub const OP_CREATE: u8 = 0xc1;
/// Opcode calling an existing contract
pub const OP_CALL: u8 = 0xc2;

/// Kind of contract operation encoded in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractOp {
    /// Deploy the payload as contract bytecode
    Create,
    /// Call the contract at the given address with the payload as call data
    Call(ContractAddress),
}

impl ContractOp {
    fn opcode(&self) -> opcodes::All {
        match self {
            ContractOp::Create => opcodes::All::from(OP_CREATE),
            ContractOp::Call(_) => opcodes::All::from(OP_CALL),
        }
    }
}

/// Decoded content of a contract output script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractScript {
    /// Gas parameters
    pub gas: GasParams,
    /// Bytecode for a create, ABI encoded call data for a call
    pub payload: Vec<u8>,
    /// Operation
    pub op: ContractOp,
}

impl ContractScript {
    /// Describe a contract deployment
    pub fn create(gas: GasParams, bytecode: Vec<u8>) -> Self {
        ContractScript {
            gas,
            payload: bytecode,
            op: ContractOp::Create,
        }
    }

    /// Describe a contract call
    pub fn call(gas: GasParams, call_data: Vec<u8>, contract: ContractAddress) -> Self {
        ContractScript {
            gas,
            payload: call_data,
            op: ContractOp::Call(contract),
        }
    }

    /// Encode the output script
    pub fn to_script(&self) -> Result<Script, Error> {
        let gas_limit = script_int(self.gas.gas_limit, "gas limit")?;
        let gas_price = script_int(self.gas.gas_price, "gas price")?;

        let mut builder = Builder::new()
            .push_int(CONTRACT_VM_VERSION)
            .push_int(gas_limit)
            .push_int(gas_price);
        builder = push_data(builder, &self.payload);
        if let ContractOp::Call(contract) = &self.op {
            builder = push_data(builder, contract.as_bytes());
        }

        Ok(builder.push_opcode(self.op.opcode()).into_script())
    }

    /// Decode a create or call script
    pub fn from_script(script: &Script) -> Result<Self, Error> {
        let instructions = script
            .instructions()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidContractScript(format!("{:?}", e)))?;

        let (last, rest) = instructions
            .split_last()
            .ok_or_else(|| Error::InvalidContractScript("empty script".into()))?;
        let expected_len = match last {
            Instruction::Op(op) if op.into_u8() == OP_CREATE => 4,
            Instruction::Op(op) if op.into_u8() == OP_CALL => 5,
            _ => {
                return Err(Error::InvalidContractScript(
                    "missing OP_CREATE or OP_CALL".into(),
                ))
            }
        };
        if rest.len() != expected_len {
            return Err(Error::InvalidContractScript(format!(
                "expected {} pushes, found {}",
                expected_len,
                rest.len()
            )));
        }

        if read_number(&rest[0])? != CONTRACT_VM_VERSION {
            return Err(Error::InvalidContractScript("unknown VM version".into()));
        }
        let gas = GasParams {
            gas_limit: read_gas(&rest[1])?,
            gas_price: read_gas(&rest[2])?,
        };
        let payload = read_data(&rest[3])?;
        let op = match rest.get(4) {
            Some(address) => ContractOp::Call(ContractAddress::from_slice(&read_data(address)?)?),
            None => ContractOp::Create,
        };

        Ok(ContractScript { gas, payload, op })
    }
}

/// Build the output script of a contract deployment
pub fn create_contract_script(gas: GasParams, bytecode: &[u8]) -> Result<Script, Error> {
    ContractScript::create(gas, bytecode.to_vec()).to_script()
}

/// Build the output script of a contract call
pub fn call_contract_script(
    gas: GasParams,
    call_data: &[u8],
    contract: &ContractAddress,
) -> Result<Script, Error> {
    ContractScript::call(gas, call_data.to_vec(), *contract).to_script()
}

fn script_int(value: u64, what: &str) -> Result<i64, Error> {
    i64::try_from(value)
        .map_err(|_| Error::InvalidContractScript(format!("{} `{}` out of range", what, value)))
}

// Same as `push_slice`, except that single byte numbers use the dedicated opcodes
fn push_data(builder: Builder, data: &[u8]) -> Builder {
    match data {
        [n @ 1..=16] => builder.push_int(*n as i64),
        [0x81] => builder.push_opcode(OP_PUSHNUM_NEG1),
        _ => builder.push_slice(data),
    }
}

fn read_data(instruction: &Instruction) -> Result<Vec<u8>, Error> {
    match instruction {
        Instruction::PushBytes(bytes) => Ok(bytes.to_vec()),
        Instruction::Op(op) => {
            let code = op.into_u8();
            if code == OP_PUSHNUM_NEG1.into_u8() {
                Ok(vec![0x81])
            } else if (OP_PUSHNUM_1.into_u8()..=OP_PUSHNUM_16.into_u8()).contains(&code) {
                Ok(vec![code - OP_PUSHNUM_1.into_u8() + 1])
            } else {
                Err(Error::InvalidContractScript(format!(
                    "unexpected opcode {:?}",
                    op
                )))
            }
        }
    }
}

fn read_number(instruction: &Instruction) -> Result<i64, Error> {
    if let Instruction::Op(op) = instruction {
        if *op == OP_PUSHNUM_NEG1 {
            return Ok(-1);
        }
    }

    decode_script_num(&read_data(instruction)?)
}

fn read_gas(instruction: &Instruction) -> Result<u64, Error> {
    let value = read_number(instruction)?;
    u64::try_from(value)
        .map_err(|_| Error::InvalidContractScript(format!("negative gas value `{}`", value)))
}

// Little endian, sign bit on the most significant byte. Up to 8 bytes since gas values can be
// larger than the 4 bytes the arithmetic opcodes accept.
fn decode_script_num(bytes: &[u8]) -> Result<i64, Error> {
    if bytes.len() > 8 {
        return Err(Error::InvalidContractScript(format!(
            "number of {} bytes",
            bytes.len()
        )));
    }
    let last = match bytes.last() {
        Some(last) => *last,
        None => return Ok(0),
    };

    let mut magnitude: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        magnitude |= (*byte as u64) << (8 * i);
    }

    if last & 0x80 != 0 {
        magnitude &= !(0x80u64 << (8 * (bytes.len() - 1)));
        Ok(-(magnitude as i64))
    } else {
        Ok(magnitude as i64)
    }
}
