// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::constants::AMOUNT_DECIMAL_FACTOR;
use crate::StakeError;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stake or balance, counted in microunits.
/// The underlying `u64` is the raw count of the smallest currency unit, `AMOUNT_DECIMAL_FACTOR` of them
/// making one unit. Serialized as the raw integer so that snapshots and feeds stay exact.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Ord, PartialOrd, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// The minimal amount
    pub const MIN: Amount = Amount(0);
    /// The maximal amount
    pub const MAX: Amount = Amount(u64::MAX);

    /// Create a zero Amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Obtains the raw microunit count
    pub const fn to_raw(&self) -> u64 {
        self.0
    }

    /// Builds an `Amount` from a raw microunit count
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// safely add self to another amount, saturating the result on overflow
    #[must_use]
    pub fn saturating_add(self, amount: Amount) -> Self {
        Amount(self.0.saturating_add(amount.0))
    }

    /// safely subtract another amount from self, saturating the result on underflow
    #[must_use]
    pub fn saturating_sub(self, amount: Amount) -> Self {
        Amount(self.0.saturating_sub(amount.0))
    }

    /// safely add self to another amount, returning None on overflow
    /// ```
    /// # use online_stake_exports::Amount;
    /// let res = Amount::from_raw(42).checked_add(Amount::from_raw(7)).unwrap();
    /// assert_eq!(res, Amount::from_raw(49));
    /// assert!(Amount::MAX.checked_add(Amount::from_raw(1)).is_none());
    /// ```
    pub fn checked_add(self, amount: Amount) -> Option<Self> {
        self.0.checked_add(amount.0).map(Amount)
    }

    /// safely subtract another amount from self, returning None on underflow
    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        self.0.checked_sub(amount.0).map(Amount)
    }

    /// returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Share of `self` in `total`, zero when `total` is zero
    /// ```
    /// # use online_stake_exports::Amount;
    /// assert_eq!(Amount::from_raw(25).fraction_of(Amount::from_raw(100)), 0.25);
    /// assert_eq!(Amount::from_raw(25).fraction_of(Amount::zero()), 0.0);
    /// ```
    pub fn fraction_of(&self, total: Amount) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        self.0 as f64 / total.0 as f64
    }
}

/// display an Amount in decimal unit form (like "10.33")
///
/// ```
/// # use online_stake_exports::Amount;
/// assert_eq!(format!("{}", Amount::from_raw(11_111_000)), "11.111")
/// ```
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let res = Decimal::from_u64(self.0)
            .and_then(|raw| raw.checked_div(AMOUNT_DECIMAL_FACTOR.into()))
            .map(|units| units.normalize());
        match res {
            Some(units) => write!(f, "{}", units),
            None => write!(f, "{}µ", self.0),
        }
    }
}

/// build an Amount from decimal unit form (like "10.33")
/// note that this will fail if the string format is invalid
/// or if the conversion would cause an overflow, underflow or precision loss
///
/// ```
/// # use online_stake_exports::Amount;
/// # use std::str::FromStr;
/// assert_eq!(Amount::from_str("30000").unwrap(), Amount::from_raw(30_000_000_000));
/// assert!(Amount::from_str("11.1").is_ok());
/// assert!(Amount::from_str("11.1111111").is_err());
/// assert!(Amount::from_str("-11.1").is_err());
/// assert!(Amount::from_str("abc").is_err());
/// ```
impl FromStr for Amount {
    type Err = StakeError;

    fn from_str(str_amount: &str) -> Result<Self, Self::Err> {
        let res = Decimal::from_str(str_amount)
            .map_err(|err| StakeError::AmountParse(err.to_string()))?
            .checked_mul(AMOUNT_DECIMAL_FACTOR.into())
            .ok_or_else(|| StakeError::AmountParse("amount is too large".to_string()))?;
        if res.is_sign_negative() {
            return Err(StakeError::AmountParse(
                "amounts cannot be strictly negative".to_string(),
            ));
        }
        if !res.fract().is_zero() {
            return Err(StakeError::AmountParse(format!(
                "amounts cannot be more precise than 1/{}",
                AMOUNT_DECIMAL_FACTOR
            )));
        }
        let res = res.to_u64().ok_or_else(|| {
            StakeError::AmountParse("amount is too large to be represented as u64".to_string())
        })?;
        Ok(Amount(res))
    }
}
