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

//! Fee and gas arithmetic
//!
//! Everything here works on integer satoshi, floats are rejected or floored before reaching
//! this module.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{FeeRate, GasParams};

/// Reference fee of the network, in satoshi per kilobyte (0.004 BCS/KB)
pub const DEFAULT_REFERENCE_FEE_PER_KB: u64 = 400_000;

/// Number of times the reference fee a transaction may pay before being refused
pub const MAX_FEE_MULTIPLIER: u64 = 100;

/// Satoshi reserved to pay for the execution of a contract, `gas_limit * gas_price`
pub fn gas_limit_fee(gas: &GasParams) -> Result<u64, Error> {
    gas.gas_limit
        .checked_mul(gas.gas_price)
        .ok_or(Error::GasLimitFeeOverflow)
}

/// Fee rate used when neither the caller nor the indexer provide one
pub fn default_fee_rate() -> FeeRate {
    FeeRate::from_sat_per_kb(DEFAULT_REFERENCE_FEE_PER_KB)
}

/// Sanity ceiling on fee rates
///
/// Rates above [`MAX_FEE_MULTIPLIER`] times the reference fee are almost always a unit mix-up
/// (BCS instead of satoshi, per KB instead of per byte) and are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRateGuard {
    /// Reference fee in satoshi per kilobyte
    pub reference_fee_per_kb: u64,
}

impl Default for FeeRateGuard {
    fn default() -> Self {
        FeeRateGuard {
            reference_fee_per_kb: DEFAULT_REFERENCE_FEE_PER_KB,
        }
    }
}

impl FeeRateGuard {
    /// Highest accepted fee rate, `ceil(reference * 100 / 1024)` satoshi/byte
    pub fn max_fee_rate(&self) -> FeeRate {
        FeeRate::from_sat_per_kb(self.reference_fee_per_kb.saturating_mul(MAX_FEE_MULTIPLIER))
    }

    /// Fail with [`Error::ExcessiveFeeRate`] if `fee_rate` is above [`max_fee_rate`](Self::max_fee_rate)
    pub fn check_fee_rate(&self, fee_rate: FeeRate) -> Result<(), Error> {
        let max = self.max_fee_rate();
        if fee_rate > max {
            log::debug!("refusing fee rate `{}`, max is `{}`", fee_rate, max);

            return Err(Error::ExcessiveFeeRate {
                fee_rate: fee_rate.as_sat_per_byte(),
                max: max.as_sat_per_byte(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gas_limit_fee() {
        let gas = GasParams {
            gas_limit: 250_000,
            gas_price: 40,
        };
        assert_eq!(gas_limit_fee(&gas).unwrap(), 10_000_000);
    }

    #[test]
    #[should_panic(expected = "GasLimitFeeOverflow")]
    fn test_gas_limit_fee_overflow() {
        let gas = GasParams {
            gas_limit: u64::MAX,
            gas_price: 2,
        };
        gas_limit_fee(&gas).unwrap();
    }

    #[test]
    fn test_default_fee_rate() {
        assert_eq!(default_fee_rate().as_sat_per_byte(), 391);
    }

    #[test]
    fn test_max_fee_rate() {
        assert_eq!(FeeRateGuard::default().max_fee_rate().as_sat_per_byte(), 39_063);
    }

    #[test]
    fn test_check_fee_rate_boundary() {
        let guard = FeeRateGuard::default();

        assert!(guard.check_fee_rate(FeeRate::from_sat_per_byte(1)).is_ok());
        assert!(guard
            .check_fee_rate(FeeRate::from_sat_per_byte(39_063))
            .is_ok());
        match guard.check_fee_rate(FeeRate::from_sat_per_byte(39_064)) {
            Err(Error::ExcessiveFeeRate { fee_rate, max }) => {
                assert_eq!(fee_rate, 39_064);
                assert_eq!(max, 39_063);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_custom_reference() {
        let guard = FeeRateGuard {
            reference_fee_per_kb: 1024,
        };

        assert!(guard.check_fee_rate(FeeRate::from_sat_per_byte(100)).is_ok());
        assert!(guard.check_fee_rate(FeeRate::from_sat_per_byte(101)).is_err());
    }

    #[test]
    fn test_huge_reference_fee() {
        let guard = FeeRateGuard {
            reference_fee_per_kb: u64::MAX,
        };

        assert_eq!(guard.max_fee_rate().as_sat_per_byte(), u64::MAX / 1024 + 1);
        assert!(guard
            .check_fee_rate(FeeRate::from_sat_per_byte(u64::MAX / 1024))
            .is_ok());
    }
}
