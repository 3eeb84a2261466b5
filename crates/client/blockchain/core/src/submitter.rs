//! Transaction submission and confirmation tracking.
//!
//! The submitter never resubmits. When a deadline passes it reports
//! [`SubmitError::Timeout`] with the transaction hash and leaves it to the
//! caller to re-query remote state.

use std::sync::Arc;
use std::time::Duration;

use crate::decoder::LogDecoder;
use crate::traits::{BlockchainTransport, SubmitError};
use crate::types::{CallRequest, LogQuery, PendingTx, TxHash, TxReceipt};

/// Confirmation and polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitterConfig {
    /// Blocks (inclusion block included) required before a receipt is final
    pub confirmations: u64,

    /// Deadline for a submitted transaction to reach `confirmations`
    pub timeout: Duration,

    /// Interval between receipt / log polls
    pub poll_interval: Duration,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl SubmitterConfig {
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Sends calls through one transport and waits for their confirmation.
pub struct TxSubmitter<T: ?Sized> {
    transport: Arc<T>,
    config: SubmitterConfig,
}

impl<T: ?Sized> Clone for TxSubmitter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config,
        }
    }
}

impl<T> TxSubmitter<T>
where
    T: BlockchainTransport + ?Sized,
{
    pub fn new(transport: Arc<T>, config: SubmitterConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Broadcast a call. Returns as soon as the node accepted it.
    pub async fn submit(&self, call: CallRequest) -> Result<PendingTx, SubmitError> {
        let tx_hash = self.transport.send_transaction(call).await?;
        tracing::info!(%tx_hash, from = %self.transport.sender(), "Transaction submitted");
        Ok(PendingTx { tx_hash })
    }

    /// Wait until `pending` has `confirmations` confirmations.
    ///
    /// Suspends cooperatively between polls. Fails with `TransactionReverted`
    /// as soon as a failed receipt is seen, or `Timeout` once the configured
    /// deadline passes.
    pub async fn await_receipt(
        &self,
        pending: PendingTx,
        confirmations: u64,
    ) -> Result<TxReceipt, SubmitError> {
        let deadline = self.config.timeout;
        let confirmations = confirmations.max(1);

        match tokio::time::timeout(deadline, self.poll_receipt(pending.tx_hash, confirmations))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    tx_hash = %pending.tx_hash,
                    ?deadline,
                    "Confirmation deadline passed; transaction outcome unknown"
                );
                Err(SubmitError::Timeout {
                    tx_hash: pending.tx_hash,
                    waited: deadline,
                })
            }
        }
    }

    /// Submit and wait for the configured number of confirmations.
    pub async fn send(&self, call: CallRequest) -> Result<TxReceipt, SubmitError> {
        let pending = self.submit(call).await?;
        self.await_receipt(pending, self.config.confirmations).await
    }

    async fn poll_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<TxReceipt, SubmitError> {
        loop {
            if let Some(receipt) = self.transport.transaction_receipt(tx_hash).await? {
                if !receipt.is_success() {
                    tracing::warn!(%tx_hash, block = receipt.block_number, "Transaction reverted");
                    return Err(SubmitError::TransactionReverted {
                        tx_hash,
                        receipt: Box::new(receipt),
                    });
                }

                let head = self.transport.block_number().await?;
                let observed = receipt.confirmations_at(head);
                if observed >= confirmations {
                    tracing::info!(
                        %tx_hash,
                        block = receipt.block_number,
                        confirmations = observed,
                        logs = receipt.logs.len(),
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }

                tracing::debug!(%tx_hash, observed, required = confirmations, "Waiting for confirmations");
            } else {
                tracing::debug!(%tx_hash, "Transaction pending");
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Wait for a log matching `query` that `decoder` accepts and `predicate` keeps.
    ///
    /// Used for results delivered by a later transaction (e.g. an oracle
    /// callback) rather than by the receipt of the caller's own transaction.
    pub async fn await_event<E, F>(
        &self,
        query: &LogQuery,
        decoder: &LogDecoder<E>,
        timeout: Duration,
        mut predicate: F,
    ) -> Result<E, SubmitError>
    where
        F: FnMut(&E) -> bool,
    {
        let poll = async {
            loop {
                let logs = self.transport.logs(query).await?;
                if let Some(event) = decoder.decode_first(&logs, &mut predicate) {
                    return Ok::<E, SubmitError>(event);
                }
                tracing::debug!(
                    address = %query.address,
                    from_block = query.from_block,
                    "Waiting for event"
                );
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(SubmitError::EventTimeout { waited: timeout }),
        }
    }
}
