// Copyright (c) 2026 Veilstake
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Core value types (amounts, identifiers) and canonical encoding helpers.

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Number of fractional digits carried by [`Amount`].
pub const AMOUNT_DECIMALS: u32 = 18;

const AMOUNT_SCALE: u128 = 10u128.pow(AMOUNT_DECIMALS);

/// Canonical serialization error.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    // Fixint encoding provides a stable integer representation.
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode with deterministic rules.
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// Wall-clock milliseconds since UNIX epoch.
pub fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Amount parsing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("malformed decimal amount")]
    Malformed,
    #[error("more than 18 fractional digits")]
    TooPrecise,
    #[error("amount overflow")]
    Overflow,
}

/// Non-negative fixed-point quantity with 18 fractional digits.
///
/// Stored as base units (`1.0 == 10^18`), so all ledger arithmetic stays exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(0);

    /// Construct from raw base units.
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Construct from a whole number of units.
    pub const fn from_whole(units: u64) -> Self {
        Self(units as u128 * AMOUNT_SCALE)
    }

    /// Raw base units.
    pub const fn base_units(&self) -> u128 {
        self.0
    }

    /// True when the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Lossy conversion to whole units, for ratios and gauges only.
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / AMOUNT_SCALE as f64
    }

    /// Parse a plain decimal string such as `"12547.8"`.
    ///
    /// Signs, exponents, separators and surrounding whitespace are rejected.
    pub fn parse_decimal(s: &str) -> Result<Self, AmountError> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (s, None),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed);
        }

        let mut units: u128 = 0;
        for b in int_part.bytes() {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add((b - b'0') as u128))
                .ok_or(AmountError::Overflow)?;
        }
        units = units
            .checked_mul(AMOUNT_SCALE)
            .ok_or(AmountError::Overflow)?;

        if let Some(frac) = frac_part {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::Malformed);
            }
            if frac.len() > AMOUNT_DECIMALS as usize {
                return Err(AmountError::TooPrecise);
            }
            let mut frac_units: u128 = 0;
            for b in frac.bytes() {
                frac_units = frac_units * 10 + (b - b'0') as u128;
            }
            frac_units *= 10u128.pow(AMOUNT_DECIMALS - frac.len() as u32);
            units = units
                .checked_add(frac_units)
                .ok_or(AmountError::Overflow)?;
        }
        Ok(Self(units))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / AMOUNT_SCALE;
        let frac = self.0 % AMOUNT_SCALE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Identifier validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("invalid pool id")]
    InvalidPoolId,
    #[error("invalid participant address")]
    InvalidParticipant,
}

/// Pool identifier (e.g. `"001"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(String);

impl PoolId {
    /// Validate and wrap a pool id: 1..=64 chars of `[A-Za-z0-9_-]`.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        let ok = !raw.is_empty()
            && raw.len() <= 64
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !ok {
            return Err(IdError::InvalidPoolId);
        }
        Ok(Self(raw))
    }

    /// Borrow as str.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant identity: a 20-byte wallet address resolved by the identity layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId([u8; 20]);

impl ParticipantId {
    /// Construct from raw address bytes.
    pub const fn from_bytes(b: [u8; 20]) -> Self {
        Self(b)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a `0x`-prefixed hex address (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(IdError::InvalidParticipant)?;
        let bytes = hex::decode(body).map_err(|_| IdError::InvalidParticipant)?;
        if bytes.len() != 20 {
            return Err(IdError::InvalidParticipant);
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl FromStr for ParticipantId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_decimals() {
        assert_eq!(Amount::parse_decimal("60").unwrap(), Amount::from_whole(60));
        assert_eq!(
            Amount::parse_decimal("0.5").unwrap().base_units(),
            AMOUNT_SCALE / 2
        );
        assert_eq!(
            Amount::parse_decimal("0.000000000000000001").unwrap(),
            Amount::from_base_units(1)
        );
    }

    #[test]
    fn rejects_malformed_decimals() {
        for bad in ["", " 1", "1 ", "-1", "+1", "1e3", "1,000", ".5", "1.", "1.2.3", "abc"] {
            assert!(Amount::parse_decimal(bad).is_err(), "accepted {bad:?}");
        }
        assert_eq!(
            Amount::parse_decimal("1.0000000000000000001"),
            Err(AmountError::TooPrecise)
        );
        assert_eq!(
            Amount::parse_decimal("999999999999999999999999999999999999999"),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn displays_trimmed() {
        assert_eq!(Amount::from_whole(100).to_string(), "100");
        assert_eq!(Amount::parse_decimal("12547.80").unwrap().to_string(), "12547.8");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn participant_address_is_normalised() {
        let p = ParticipantId::parse("0xABCDEF0000000000000000000000000000000001").unwrap();
        assert_eq!(p.to_string(), "0xabcdef0000000000000000000000000000000001");
        assert!(ParticipantId::parse("abcdef0000000000000000000000000000000001").is_err());
        assert!(ParticipantId::parse("0x1234").is_err());
    }

    #[test]
    fn pool_id_charset() {
        assert!(PoolId::new("001").is_ok());
        assert!(PoolId::new("").is_err());
        assert!(PoolId::new("a/b").is_err());
    }
}
