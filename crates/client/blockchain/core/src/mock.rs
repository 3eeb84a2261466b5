//! In-memory chain for testing.
//!
//! Simulates accounts, native balances, contract execution, block production
//! and receipts without a network. Contracts are plugged in as
//! [`MockContract`] implementations that receive raw calldata, exactly like a
//! real node would forward it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{Address, Bytes, Log, LogData, U256, keccak256};
use async_trait::async_trait;

use crate::traits::{BlockchainTransport, TransportError};
use crate::types::{CallRequest, LogQuery, TransactionStatus, TxHash, TxReceipt};

/// Execution context handed to a mock contract.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub contract: Address,
    pub sender: Address,
    pub value: U256,
    pub block_number: u64,
}

/// Effects of a successful mock execution.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    /// Logs emitted by the contract
    pub logs: Vec<LogData>,

    /// Native payouts from the contract's balance
    pub transfers: Vec<(Address, U256)>,
}

impl Execution {
    pub fn with_log(mut self, log: LogData) -> Self {
        self.logs.push(log);
        self
    }

    pub fn with_transfer(mut self, to: Address, amount: U256) -> Self {
        self.transfers.push((to, amount));
        self
    }
}

/// Contract logic plugged into the mock chain.
///
/// `Err` carries ABI-encoded revert data.
pub trait MockContract: Send {
    fn execute(&mut self, ctx: &CallContext, input: &[u8]) -> Result<Execution, Bytes>;

    fn view(&self, ctx: &CallContext, input: &[u8]) -> Result<Bytes, Bytes>;
}

/// Builds a contract from its init code on deployment.
pub type ContractFactory = Box<dyn FnMut(&CallContext, &[u8]) -> Box<dyn MockContract> + Send>;

/// A transaction as broadcast by a mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub tx_hash: TxHash,
    pub from: Address,
    pub nonce: u64,
    pub call: CallRequest,
}

#[derive(Default)]
struct ChainState {
    head: u64,
    contracts: HashMap<Address, Box<dyn MockContract>>,
    factory: Option<ContractFactory>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<TxHash, TxReceipt>,
    withheld: Vec<TxReceipt>,
    logs: Vec<(u64, Log)>,
    sent: Vec<SentTransaction>,
    withhold_receipts: bool,
    include_reverts: bool,
    advance_on_poll: bool,
}

/// Shared in-memory chain; clone freely.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    #[cfg(test)]
    fn head(&self) -> u64 {
        self.state().head
    }

    /// Signer-bound transport for `account`.
    pub fn transport(&self, account: Address) -> MockTransport {
        MockTransport {
            chain: self.clone(),
            account,
            submit_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn register_contract(&self, address: Address, contract: impl MockContract + 'static) {
        self.state().contracts.insert(address, Box::new(contract));
    }

    /// Contract to instantiate for deployment transactions.
    pub fn on_deploy(&self, factory: ContractFactory) {
        self.state().factory = Some(factory);
    }

    pub fn set_balance(&self, account: Address, amount: U256) {
        self.state().balances.insert(account, amount);
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state().balances.get(&account).copied().unwrap_or_default()
    }

    /// Keep receipts of new transactions invisible until released.
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state().withhold_receipts = withhold;
    }

    /// Make withheld receipts visible.
    pub fn release_withheld(&self) {
        let mut state = self.state();
        let withheld = std::mem::take(&mut state.withheld);
        for receipt in withheld {
            state.receipts.insert(receipt.tx_hash, receipt);
        }
    }

    /// Include reverting transactions with a failed receipt instead of
    /// rejecting them at submission (as gas estimation would).
    pub fn include_reverts(&self, include: bool) {
        self.state().include_reverts = include;
    }

    /// Mine one block on every head query, so confirmations accrue while polling.
    pub fn advance_on_poll(&self, advance: bool) {
        self.state().advance_on_poll = advance;
    }

    /// Every transaction broadcast so far, in submission order.
    pub fn sent_transactions(&self) -> Vec<SentTransaction> {
        self.state().sent.clone()
    }

    /// Read-only call into a registered contract.
    pub fn view(&self, contract: Address, sender: Address, input: &[u8]) -> Result<Bytes, Bytes> {
        let state = self.state();
        let ctx = CallContext {
            contract,
            sender,
            value: U256::ZERO,
            block_number: state.head,
        };
        match state.contracts.get(&contract) {
            Some(code) => code.view(&ctx, input),
            None => Ok(Bytes::new()),
        }
    }

    fn execute(&self, from: Address, call: CallRequest) -> Result<TxHash, TransportError> {
        let mut guard = self.state();
        let state = &mut *guard;

        let available = state.balances.get(&from).copied().unwrap_or_default();
        if available < call.value {
            return Err(TransportError::BackendError(format!(
                "insufficient funds for transfer: have {available}, want {}",
                call.value
            )));
        }

        let nonce = state.nonces.get(&from).copied().unwrap_or_default();
        let mut preimage = from.to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let tx_hash = keccak256(&preimage);

        let block_number = state.head + 1;
        let contract = call.to.unwrap_or_else(|| from.create(nonce));
        let ctx = CallContext {
            contract,
            sender: from,
            value: call.value,
            block_number,
        };

        let outcome = match call.to {
            Some(to) => match state.contracts.get_mut(&to) {
                Some(code) => code.execute(&ctx, &call.input),
                None => Ok(Execution::default()),
            },
            None => match state.factory.as_mut() {
                Some(factory) => {
                    let code = factory(&ctx, &call.input);
                    state.contracts.insert(contract, code);
                    Ok(Execution::default())
                }
                None => Err(Bytes::new()),
            },
        };

        // A revert without inclusion mirrors gas estimation failing: the node
        // never accepts the transaction and the nonce is not consumed.
        if let Err(revert) = &outcome
            && !state.include_reverts
        {
            return Err(TransportError::reverted(revert.clone()));
        }

        state.nonces.insert(from, nonce + 1);
        state.head = block_number;

        let (status, logs) = match outcome {
            Ok(execution) => {
                apply_value(state, from, contract, call.value);
                for (to, amount) in &execution.transfers {
                    apply_value(state, contract, *to, *amount);
                }
                let logs: Vec<Log> = execution
                    .logs
                    .into_iter()
                    .map(|data| Log {
                        address: contract,
                        data,
                    })
                    .collect();
                state
                    .logs
                    .extend(logs.iter().map(|log| (block_number, log.clone())));
                (TransactionStatus::Success, logs)
            }
            Err(_) => (TransactionStatus::Reverted, Vec::new()),
        };

        let receipt = TxReceipt {
            tx_hash,
            block_number,
            status,
            contract_address: call.to.is_none().then_some(contract),
            gas_used: 21_000,
            logs,
        };

        state.sent.push(SentTransaction {
            tx_hash,
            from,
            nonce,
            call,
        });

        if state.withhold_receipts {
            state.withheld.push(receipt);
        } else {
            state.receipts.insert(tx_hash, receipt);
        }

        Ok(tx_hash)
    }
}

fn apply_value(state: &mut ChainState, from: Address, to: Address, amount: U256) {
    if amount.is_zero() {
        return;
    }
    let source = state.balances.entry(from).or_default();
    *source = source.saturating_sub(amount);
    let target = state.balances.entry(to).or_default();
    *target = target.saturating_add(amount);
}

/// Transport for one account on a [`MockChain`].
pub struct MockTransport {
    chain: MockChain,
    account: Address,
    submit_lock: tokio::sync::Mutex<()>,
}

impl MockTransport {
    pub fn chain(&self) -> &MockChain {
        &self.chain
    }
}

#[async_trait]
impl BlockchainTransport for MockTransport {
    fn sender(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, call: CallRequest) -> Result<TxHash, TransportError> {
        let _guard = self.submit_lock.lock().await;
        self.chain.execute(self.account, call)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, TransportError> {
        Ok(self.chain.state().receipts.get(&tx_hash).cloned())
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        let mut state = self.chain.state();
        if state.advance_on_poll {
            state.head += 1;
        }
        Ok(state.head)
    }

    async fn call(&self, call: &CallRequest) -> Result<Bytes, TransportError> {
        let to = call
            .to
            .ok_or_else(|| TransportError::BackendError("call without target".to_string()))?;
        self.chain
            .view(to, self.account, &call.input)
            .map_err(TransportError::reverted)
    }

    async fn balance(&self, account: Address) -> Result<U256, TransportError> {
        Ok(self.chain.balance_of(account))
    }

    async fn logs(&self, query: &LogQuery) -> Result<Vec<Log>, TransportError> {
        Ok(self
            .chain
            .state()
            .logs
            .iter()
            .filter(|(block, log)| *block >= query.from_block && query.matches(log))
            .map(|(_, log)| log.clone())
            .collect())
    }
}
