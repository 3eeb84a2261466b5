//! Typed contract bindings.
//!
//! Thin wrappers over [`ContractHandle`] that fix method names and argument
//! types. Read-only calls take any transport; mutating calls go through a
//! [`TxSubmitter`](client_blockchain_core::TxSubmitter) and return the
//! confirmed receipt.

pub mod abi;
pub mod erc20;
pub mod rock_paper_scissors;

pub use erc20::{Erc20, TokenMetadata};
pub use rock_paper_scissors::{PlayerRecord, RockPaperScissors};

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, I256, U256};
use client_blockchain_core::{BindingError, ContractHandle};

fn decoding(method: &str, reason: impl Into<String>) -> BindingError {
    BindingError::Decoding {
        method: method.to_string(),
        reason: reason.into(),
    }
}

fn output<'a>(
    method: &str,
    values: &'a [DynSolValue],
    index: usize,
) -> Result<&'a DynSolValue, BindingError> {
    values
        .get(index)
        .ok_or_else(|| decoding(method, format!("missing return value {index}")))
}

pub(crate) fn uint_at(method: &str, values: &[DynSolValue], index: usize) -> Result<U256, BindingError> {
    output(method, values, index)?
        .as_uint()
        .map(|(value, _)| value)
        .ok_or_else(|| decoding(method, "expected uint"))
}

pub(crate) fn int_at(method: &str, values: &[DynSolValue], index: usize) -> Result<I256, BindingError> {
    output(method, values, index)?
        .as_int()
        .map(|(value, _)| value)
        .ok_or_else(|| decoding(method, "expected int"))
}

pub(crate) fn bool_at(method: &str, values: &[DynSolValue], index: usize) -> Result<bool, BindingError> {
    output(method, values, index)?
        .as_bool()
        .ok_or_else(|| decoding(method, "expected bool"))
}

pub(crate) fn string_at(method: &str, values: &[DynSolValue], index: usize) -> Result<String, BindingError> {
    output(method, values, index)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| decoding(method, "expected string"))
}

pub(crate) fn addresses_at(
    method: &str,
    values: &[DynSolValue],
    index: usize,
) -> Result<Vec<Address>, BindingError> {
    output(method, values, index)?
        .as_array()
        .ok_or_else(|| decoding(method, "expected address[]"))?
        .iter()
        .map(|value| {
            value
                .as_address()
                .ok_or_else(|| decoding(method, "expected address"))
        })
        .collect()
}

pub(crate) fn uint(value: U256, bits: usize) -> DynSolValue {
    DynSolValue::Uint(value, bits)
}

pub(crate) fn bind(address: Address, signatures: &[&str]) -> Result<ContractHandle, BindingError> {
    ContractHandle::from_signatures(address, signatures.iter().copied())
}
