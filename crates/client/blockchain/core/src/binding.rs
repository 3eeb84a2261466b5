//! ABI-driven contract proxy.
//!
//! A [`ContractHandle`] is an address plus the contract's ABI. It resolves
//! methods by name, checks argument arity against the ABI before anything is
//! dispatched, and routes read-only calls through `eth_call` and mutating
//! calls through a [`TxSubmitter`].

use std::sync::Arc;

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi, StateMutability};
use alloy_primitives::{Address, Bytes, U256};

use crate::submitter::TxSubmitter;
use crate::traits::{BlockchainTransport, SubmitError, TransportError};
use crate::types::{CallRequest, TxReceipt};

/// Contract binding errors.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Method {method} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Method {0} is not payable but a value was attached")]
    NotPayable(String),

    #[error("Method {0} is read-only; use a call instead of a transaction")]
    ReadOnly(String),

    #[error("Contract has no constructor but arguments were given")]
    NoConstructor,

    #[error("Failed to encode arguments for {method}: {reason}")]
    Encoding { method: String, reason: String },

    #[error("Failed to decode output of {method}: {reason}")]
    Decoding { method: String, reason: String },

    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),

    #[error("Submission error: {0}")]
    SubmitError(#[from] SubmitError),
}

impl BindingError {
    /// Decoded revert reason if the remote execution reverted.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            BindingError::TransportError(TransportError::CallReverted { reason, .. })
            | BindingError::SubmitError(SubmitError::TransportError(
                TransportError::CallReverted { reason, .. },
            )) => reason.as_deref(),
            _ => None,
        }
    }

    pub fn is_call_reverted(&self) -> bool {
        matches!(
            self,
            BindingError::TransportError(TransportError::CallReverted { .. })
                | BindingError::SubmitError(SubmitError::TransportError(
                    TransportError::CallReverted { .. }
                ))
        )
    }
}

/// Deployed contract: address + ABI.
///
/// Immutable once bound and cheap to clone; sessions share it read-only.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
}

impl ContractHandle {
    pub fn new(address: Address, abi: Arc<JsonAbi>) -> Self {
        Self { address, abi }
    }

    /// Bind from human-readable signatures, e.g. `"function approve(address,uint256) returns (bool)"`.
    pub fn from_signatures<'a>(
        address: Address,
        signatures: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, BindingError> {
        let abi = parse_abi(signatures)?;
        Ok(Self::new(address, Arc::new(abi)))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Arc<JsonAbi> {
        &self.abi
    }

    /// Resolve a method by name and argument count.
    ///
    /// Overloads are disambiguated by arity only.
    pub fn function(&self, method: &str, arity: usize) -> Result<&Function, BindingError> {
        let overloads = self
            .abi
            .function(method)
            .filter(|overloads| !overloads.is_empty())
            .ok_or_else(|| BindingError::UnknownMethod(method.to_string()))?;

        overloads
            .iter()
            .find(|function| function.inputs.len() == arity)
            .ok_or_else(|| BindingError::ArityMismatch {
                method: method.to_string(),
                expected: overloads[0].inputs.len(),
                got: arity,
            })
    }

    /// ABI-encode a call including its selector.
    pub fn encode(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, BindingError> {
        let function = self.function(method, args.len())?;
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| BindingError::Encoding {
                method: method.to_string(),
                reason: e.to_string(),
            })
    }

    /// Build the request for a state-mutating call.
    pub fn call_request(
        &self,
        method: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<CallRequest, BindingError> {
        let function = self.function(method, args.len())?;

        if is_read_only(function) {
            return Err(BindingError::ReadOnly(method.to_string()));
        }

        let value = value.unwrap_or(U256::ZERO);
        if !value.is_zero() && function.state_mutability != StateMutability::Payable {
            return Err(BindingError::NotPayable(method.to_string()));
        }

        let input = self.encode(method, args)?;
        Ok(CallRequest::new(self.address, input).with_value(value))
    }

    /// Decode return data of a method.
    pub fn decode_output(
        &self,
        method: &str,
        arity: usize,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, BindingError> {
        let function = self.function(method, arity)?;
        function
            .abi_decode_output(data)
            .map_err(|e| BindingError::Decoding {
                method: method.to_string(),
                reason: e.to_string(),
            })
    }

    /// Execute a read-only method; no transaction, no confirmation wait.
    pub async fn read<T>(
        &self,
        transport: &T,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        let input = self.encode(method, args)?;
        let output = transport
            .call(&CallRequest::new(self.address, input))
            .await?;
        self.decode_output(method, args.len(), &output)
    }

    /// Send a state-mutating method and wait for the configured confirmations.
    pub async fn send<T>(
        &self,
        submitter: &TxSubmitter<T>,
        method: &str,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<TxReceipt, BindingError>
    where
        T: BlockchainTransport + ?Sized,
    {
        let request = self.call_request(method, args, value)?;
        tracing::debug!(
            contract = %self.address,
            method,
            value = %request.value,
            "Sending contract call"
        );
        Ok(submitter.send(request).await?)
    }
}

/// Parse a human-readable ABI.
pub fn parse_abi<'a>(signatures: impl IntoIterator<Item = &'a str>) -> Result<JsonAbi, BindingError> {
    JsonAbi::parse(signatures).map_err(|e| BindingError::InvalidAbi(e.to_string()))
}

/// Build init code for a deployment: bytecode followed by encoded constructor args.
pub fn deploy_request(
    abi: &JsonAbi,
    bytecode: &[u8],
    args: &[DynSolValue],
) -> Result<CallRequest, BindingError> {
    let mut init_code = bytecode.to_vec();

    match abi.constructor() {
        Some(constructor) => {
            if constructor.inputs.len() != args.len() {
                return Err(BindingError::ArityMismatch {
                    method: "constructor".to_string(),
                    expected: constructor.inputs.len(),
                    got: args.len(),
                });
            }
            let encoded = constructor
                .abi_encode_input(args)
                .map_err(|e| BindingError::Encoding {
                    method: "constructor".to_string(),
                    reason: e.to_string(),
                })?;
            init_code.extend_from_slice(&encoded);
        }
        None if !args.is_empty() => return Err(BindingError::NoConstructor),
        None => {}
    }

    Ok(CallRequest::deploy(init_code))
}

fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::View | StateMutability::Pure
    )
}
