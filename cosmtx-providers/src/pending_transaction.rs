use crate::{JsonRpcClient, Middleware, PinBoxFut, Provider, ProviderError};
use cosmtx_core::types::{ConfirmationResult, TxHash};
use futures_timer::Delay;
use std::{
    fmt,
    future::Future,
    ops::Deref,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tracing::{debug, trace, warn};

/// The number of `tx` queries a [`PendingTransaction`] makes before giving up
pub const DEFAULT_POLL_ATTEMPTS: usize = 10;

/// A pending transaction is a transaction which has been accepted by a node but may not
/// be included in a block yet.
///
/// `await`'ing on a pending transaction queries the node for the transaction up to
/// [`retries`](Self::retries) times, pausing [`interval`](Self::interval) between two
/// queries. It resolves to the [`ConfirmationResult`] of the first query that finds the
/// transaction, even if its execution failed, and to
/// [`ProviderError::ConfirmationTimeout`] once every query came back empty.
///
/// Failed queries count as attempts and are retried.
#[must_use = "pending transactions do nothing unless awaited"]
pub struct PendingTransaction<'a, P> {
    tx_hash: TxHash,
    max_attempts: usize,
    attempts: usize,
    interval: Duration,
    state: PendingTxState<'a>,
    provider: &'a Provider<P>,
}

impl<'a, P: JsonRpcClient> PendingTransaction<'a, P> {
    /// Creates a new pending transaction poller from a hash and a provider
    pub fn new(tx_hash: TxHash, provider: &'a Provider<P>) -> Self {
        Self {
            tx_hash,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            attempts: 0,
            interval: provider.get_interval(),
            state: PendingTxState::Idle,
            provider,
        }
    }

    /// Sets the maximum number of `tx` queries
    pub fn retries(mut self, retries: usize) -> Self {
        self.max_attempts = retries;
        self
    }

    /// Sets the pause between two queries
    pub fn interval<T: Into<Duration>>(mut self, duration: T) -> Self {
        self.interval = duration.into();
        self
    }

    /// The hash of the transaction being polled for
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// The provider used for polling
    pub fn provider(&self) -> &'a Provider<P> {
        self.provider
    }

    fn timeout(&self) -> ProviderError {
        ProviderError::ConfirmationTimeout { tx_hash: self.tx_hash, attempts: self.attempts }
    }
}

impl<'a, P> PartialEq for PendingTransaction<'a, P> {
    fn eq(&self, other: &Self) -> bool {
        self.tx_hash == other.tx_hash
    }
}

impl<'a, P> PartialEq<TxHash> for PendingTransaction<'a, P> {
    fn eq(&self, other: &TxHash) -> bool {
        &self.tx_hash == other
    }
}

impl<'a, P> Eq for PendingTransaction<'a, P> {}

impl<'a, P> Deref for PendingTransaction<'a, P> {
    type Target = TxHash;

    fn deref(&self) -> &Self::Target {
        &self.tx_hash
    }
}

impl<'a, P> fmt::Debug for PendingTransaction<'a, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .field("max_attempts", &self.max_attempts)
            .field("attempts", &self.attempts)
            .field("interval", &self.interval)
            .field("state", &self.state)
            .finish()
    }
}

impl<'a, P: JsonRpcClient> Future for PendingTransaction<'a, P> {
    type Output = Result<ConfirmationResult, ProviderError>;

    fn poll(self: Pin<&mut Self>, ctx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                PendingTxState::Idle => {
                    if this.attempts >= this.max_attempts {
                        this.state = PendingTxState::Completed;
                        return Poll::Ready(Err(this.timeout()))
                    }
                    this.attempts += 1;
                    trace!(tx_hash = %this.tx_hash, attempt = this.attempts, "querying transaction");
                    let provider = this.provider;
                    this.state = PendingTxState::GettingTx(provider.get_tx(this.tx_hash));
                }
                PendingTxState::GettingTx(fut) => {
                    match futures_util::ready!(fut.as_mut().poll(ctx)) {
                        Ok(Some(result)) => {
                            debug!(
                                tx_hash = %this.tx_hash,
                                height = result.height,
                                code = result.code,
                                attempts = this.attempts,
                                "transaction included"
                            );
                            this.state = PendingTxState::Completed;
                            return Poll::Ready(Ok(result))
                        }
                        Ok(None) => {
                            trace!(tx_hash = %this.tx_hash, attempt = this.attempts, "not included yet")
                        }
                        Err(err) => {
                            warn!(
                                tx_hash = %this.tx_hash,
                                attempt = this.attempts,
                                %err,
                                "querying transaction failed"
                            )
                        }
                    }

                    // no pause after the last attempt
                    if this.attempts >= this.max_attempts {
                        this.state = PendingTxState::Completed;
                        return Poll::Ready(Err(this.timeout()))
                    }
                    this.state = PendingTxState::Paused(Delay::new(this.interval));
                }
                PendingTxState::Paused(delay) => {
                    futures_util::ready!(Pin::new(delay).poll(ctx));
                    this.state = PendingTxState::Idle;
                }
                PendingTxState::Completed => {
                    panic!("polled pending transaction future after completion")
                }
            }
        }
    }
}

enum PendingTxState<'a> {
    /// Ready to send the next query
    Idle,

    /// Waiting for the node to answer a `tx` query
    GettingTx(PinBoxFut<'a, Option<ConfirmationResult>>),

    /// Pausing between two queries
    Paused(Delay),

    /// Future has completed and should panic if polled again
    Completed,
}

impl<'a> fmt::Debug for PendingTxState<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            PendingTxState::Idle => "Idle",
            PendingTxState::GettingTx(_) => "GettingTx",
            PendingTxState::Paused(_) => "Paused",
            PendingTxState::Completed => "Completed",
        };
        f.write_str(state)
    }
}
