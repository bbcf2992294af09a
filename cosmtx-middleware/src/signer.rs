use cosmtx_core::types::{
    transaction::{
        DraftBuilder, Drafted, SignedDocument, SignerData, SignersGathered, TransactionError,
        UnsignedDocument,
    },
    AccountState, Address, AddressError, BroadcastMode, OperationRegistry, PublicKey,
    SubmissionReceipt, DEFAULT_ADDRESS_PREFIX,
};
use cosmtx_providers::{Middleware, MiddlewareError, PendingTransaction, DEFAULT_POLL_ATTEMPTS};
use cosmtx_signers::KeyStore;
use std::{fmt, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::SignerConfig;

/// Broadcast result code of the `sdk` codespace for an account sequence mismatch
const WRONG_SEQUENCE_CODE: u32 = 32;
const SDK_CODESPACE: &str = "sdk";

#[derive(Clone, Debug)]
/// Middleware used for locally signing Cosmos transactions with a named key of any
/// [`KeyStore`] implementer.
///
/// Signing runs in two rounds. Round 1 resolves the account state and records the signer
/// info with a placeholder signature, without producing any signature bytes. Round 2
/// encodes the canonical `SIGN_MODE_DIRECT` sign-bytes and asks the key store to sign them.
///
/// # Example
///
/// ```no_run
/// use cosmtx_core::types::{Coin, MsgSend, Operation};
/// use cosmtx_middleware::SignerMiddleware;
/// use cosmtx_providers::{Http, Provider};
/// use cosmtx_signers::LocalKeyring;
/// use std::{convert::TryFrom, time::Duration};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Provider::<Http>::try_from("http://localhost:26657")?
///     .interval(Duration::from_secs(1));
///
/// let keyring = LocalKeyring::new();
/// keyring.import_mnemonic(
///     "alice",
///     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
///     None,
/// )?;
///
/// let client = SignerMiddleware::new(provider, keyring, "alice", "local-1").await?;
///
/// let send = MsgSend::new(client.address(), client.address(), vec![Coin::new(1, "utest")?]);
/// let mut draft = client.draft();
/// draft
///     .set_operations(vec![Operation::from_msg(&send)])?
///     .set_gas_limit(100_000)?
///     .set_fee(vec![Coin::new(750, "utest")?])?;
///
/// // sign, broadcast and wait until the transaction is part of a block
/// let confirmation = client.send_document(draft.finalize()?).await?.await?;
/// assert!(confirmation.is_success());
/// # Ok(())
/// # }
/// ```
pub struct SignerMiddleware<M, K> {
    inner: M,
    keystore: K,
    key_name: String,
    public_key: PublicKey,
    address: Address,
    chain_id: String,
    registry: OperationRegistry,
    poll_attempts: usize,
    /// Overrides the provider's interval when polling for inclusion
    poll_interval: Option<Duration>,
}

/// The signing round in which an error happened
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Round {
    /// Gathering the signer infos
    One,
    /// Encoding the sign-bytes and signing them
    Two,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::One => f.write_str("1"),
            Round::Two => f.write_str("2"),
        }
    }
}

#[derive(Error, Debug)]
/// Error thrown when the client signs or submits a transaction
pub enum SignerMiddlewareError<M: Middleware, K: KeyStore> {
    #[error("{0}")]
    /// Thrown when an internal middleware errors
    MiddlewareError(M::Error),

    /// The signing key could not be looked up when the client was created
    #[error("could not look up key {key_name:?}: {source}")]
    KeyLookup {
        key_name: String,
        #[source]
        source: K::Error,
    },

    /// Thrown when the internal call to the key store fails
    #[error("key store failed in round {round}: {source}")]
    KeyStore {
        round: Round,
        #[source]
        source: K::Error,
    },

    /// The document was rejected by the signing protocol
    #[error("signing failed in round {round}: {source}")]
    Transaction {
        round: Round,
        #[source]
        source: TransactionError,
    },

    /// The signer's account number and sequence could not be fetched
    #[error("account resolution failed in round {round}: {error}")]
    AccountResolution { round: Round, error: M::Error },

    /// Round 1 was started without the signer's account state
    #[error("no account state for {0}")]
    MissingAccountState(Address),

    /// The key store answered with a different key than the one being signed for
    #[error("key {key_name:?} is {actual} in round {round}, expected {expected}")]
    KeyMismatch { round: Round, key_name: String, expected: PublicKey, actual: PublicKey },

    /// The node rejected the transaction because its sequence is not the account's
    /// current one
    #[error("account sequence mismatch: {raw_log}")]
    StaleSequence { raw_log: String },

    /// The node rejected the transaction during `CheckTx`
    #[error("transaction rejected with code {code} ({codespace}): {raw_log}")]
    Rejected { code: u32, codespace: String, raw_log: String },

    #[error(transparent)]
    Address(#[from] AddressError),
}

impl<M: Middleware, K: KeyStore> MiddlewareError for SignerMiddlewareError<M, K> {
    type Inner = M::Error;

    fn from_err(src: M::Error) -> Self {
        SignerMiddlewareError::MiddlewareError(src)
    }

    fn as_inner(&self) -> Option<&Self::Inner> {
        match self {
            SignerMiddlewareError::MiddlewareError(e) |
            SignerMiddlewareError::AccountResolution { error: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl<M, K> SignerMiddleware<M, K>
where
    M: Middleware,
    K: KeyStore,
{
    /// Creates a new client signing with `key_name` on `chain_id`, for accounts with the
    /// `cosmos` address prefix.
    ///
    /// The key's public key is looked up once, so a missing key fails here rather than in
    /// the middle of a transaction.
    pub async fn new(
        inner: M,
        keystore: K,
        key_name: impl Into<String>,
        chain_id: impl Into<String>,
    ) -> Result<Self, SignerMiddlewareError<M, K>> {
        Self::with_prefix(inner, keystore, key_name, chain_id, DEFAULT_ADDRESS_PREFIX).await
    }

    /// Same as [`new`](Self::new), for chains with a different address prefix
    pub async fn with_prefix(
        inner: M,
        keystore: K,
        key_name: impl Into<String>,
        chain_id: impl Into<String>,
        prefix: &str,
    ) -> Result<Self, SignerMiddlewareError<M, K>> {
        let key_name = key_name.into();
        let public_key = keystore.public_key(&key_name).await.map_err(|source| {
            SignerMiddlewareError::KeyLookup { key_name: key_name.clone(), source }
        })?;
        let address = public_key.to_address(prefix)?;

        Ok(Self {
            inner,
            keystore,
            key_name,
            public_key,
            address,
            chain_id: chain_id.into(),
            registry: OperationRegistry::default(),
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: None,
        })
    }

    /// Creates a client from the key name, chain id, address prefix and polling settings of
    /// `config`
    pub async fn from_config(
        inner: M,
        keystore: K,
        config: &SignerConfig,
    ) -> Result<Self, SignerMiddlewareError<M, K>> {
        let mut client = Self::with_prefix(
            inner,
            keystore,
            config.key_name.as_str(),
            config.chain_id.as_str(),
            &config.address_prefix,
        )
        .await?;
        client.poll_attempts = config.poll_attempts;
        client.poll_interval = Some(config.poll_interval());
        Ok(client)
    }

    /// Replaces the registry of operation types this client is willing to sign
    #[must_use]
    pub fn with_registry(mut self, registry: OperationRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets how many times [`send_document`](Self::send_document) queries for the
    /// transaction
    #[must_use]
    pub fn poll_attempts(mut self, attempts: usize) -> Self {
        self.poll_attempts = attempts;
        self
    }

    /// Sets the delay between queries of [`send_document`](Self::send_document). Without it
    /// the provider's interval is used.
    #[must_use]
    pub fn poll_interval<T: Into<Duration>>(mut self, interval: T) -> Self {
        self.poll_interval = Some(interval.into());
        self
    }

    /// The address of the signing key
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn keystore(&self) -> &K {
        &self.keystore
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// An empty draft with this client as the signer
    pub fn draft(&self) -> DraftBuilder {
        let mut builder = DraftBuilder::new();
        builder.set_signer_address(self.address.clone());
        builder
    }

    /// Fetches the current account number and sequence of the signing key. A failure
    /// belongs to round 1: the document never leaves the `Drafted` state.
    pub async fn resolve_account(&self) -> Result<AccountState, SignerMiddlewareError<M, K>> {
        self.inner
            .get_account(&self.address)
            .await
            .map_err(|error| SignerMiddlewareError::AccountResolution { round: Round::One, error })
    }

    /// Round 1: attaches this client's signer info at `account`'s sequence.
    ///
    /// Only the key store's public key lookup is called; nothing is signed. On failure
    /// `drafted` is left untouched.
    pub async fn gather_signers(
        &self,
        drafted: &Drafted,
        account: Option<AccountState>,
    ) -> Result<SignersGathered, SignerMiddlewareError<M, K>> {
        let Some(account) = account else {
            return Err(SignerMiddlewareError::MissingAccountState(self.address.clone()))
        };

        let public_key = self
            .keystore
            .public_key(&self.key_name)
            .await
            .map_err(|source| SignerMiddlewareError::KeyStore { round: Round::One, source })?;
        if public_key != self.public_key {
            return Err(SignerMiddlewareError::KeyMismatch {
                round: Round::One,
                key_name: self.key_name.clone(),
                expected: self.public_key,
                actual: public_key,
            })
        }

        let signer = SignerData::new(public_key, account, self.chain_id.as_str());
        let gathered = drafted
            .clone()
            .gather_signers(vec![signer])
            .map_err(|source| SignerMiddlewareError::Transaction { round: Round::One, source })?;
        debug!(
            signer = %self.address,
            account_number = account.account_number,
            sequence = account.sequence,
            "gathered signers"
        );
        Ok(gathered)
    }

    /// Round 2: encodes the sign-bytes of every signer and replaces the placeholders with
    /// the key store's signatures. On failure `gathered` is left untouched.
    pub async fn sign_gathered(
        &self,
        gathered: &SignersGathered,
    ) -> Result<SignedDocument, SignerMiddlewareError<M, K>> {
        let round_two = |source: TransactionError| SignerMiddlewareError::<M, K>::Transaction {
            round: Round::Two,
            source,
        };
        let payload = gathered.encode(&self.registry).map_err(round_two)?;

        let mut signatures = Vec::with_capacity(payload.len());
        for index in 0..payload.len() {
            let signer_data = payload
                .signer_data(index)
                .ok_or_else(|| round_two(TransactionError::SignerIndex(index)))?;
            if signer_data.public_key != self.public_key {
                return Err(SignerMiddlewareError::KeyMismatch {
                    round: Round::Two,
                    key_name: self.key_name.clone(),
                    expected: signer_data.public_key,
                    actual: self.public_key,
                })
            }

            let sign_bytes = payload.sign_bytes(index).map_err(round_two)?;
            let (signature, public_key) = self
                .keystore
                .sign(&self.key_name, &sign_bytes, signer_data)
                .await
                .map_err(|source| SignerMiddlewareError::KeyStore { round: Round::Two, source })?;
            if public_key != signer_data.public_key {
                return Err(SignerMiddlewareError::KeyMismatch {
                    round: Round::Two,
                    key_name: self.key_name.clone(),
                    expected: signer_data.public_key,
                    actual: public_key,
                })
            }
            signatures.push(signature);
        }

        let signed = gathered.clone().attach_signatures(payload, signatures).map_err(round_two)?;
        debug!(tx_hash = %signed.hash(), signatures = signed.signatures().len(), "signed document");
        Ok(signed)
    }

    /// Resolves the signer's account and runs both signing rounds
    pub async fn sign_document(
        &self,
        document: UnsignedDocument,
    ) -> Result<SignedDocument, SignerMiddlewareError<M, K>> {
        let account = self.resolve_account().await?;
        let gathered = self.gather_signers(&Drafted::new(document), Some(account)).await?;
        self.sign_gathered(&gathered).await
    }

    /// Submits a signed document.
    ///
    /// A rejected transaction is an error: [`SignerMiddlewareError::StaleSequence`] when the
    /// signed sequence is no longer the account's, [`SignerMiddlewareError::Rejected`]
    /// otherwise.
    pub async fn broadcast(
        &self,
        signed: &SignedDocument,
        mode: BroadcastMode,
    ) -> Result<SubmissionReceipt, SignerMiddlewareError<M, K>> {
        let receipt = self
            .inner
            .broadcast_tx(&signed.to_bytes(), mode)
            .await
            .map_err(SignerMiddlewareError::MiddlewareError)?;
        if receipt.accepted {
            debug!(tx_hash = %receipt.tx_hash, "transaction accepted");
            return Ok(receipt)
        }

        warn!(
            tx_hash = %receipt.tx_hash,
            code = receipt.code,
            codespace = %receipt.codespace,
            raw_log = %receipt.raw_log,
            "transaction rejected"
        );
        if receipt.code == WRONG_SEQUENCE_CODE && receipt.codespace == SDK_CODESPACE {
            return Err(SignerMiddlewareError::StaleSequence { raw_log: receipt.raw_log })
        }
        Err(SignerMiddlewareError::Rejected {
            code: receipt.code,
            codespace: receipt.codespace,
            raw_log: receipt.raw_log,
        })
    }

    /// Signs `document`, broadcasts it in sync mode and returns a future resolving once
    /// the transaction is found in a block
    pub async fn send_document(
        &self,
        document: UnsignedDocument,
    ) -> Result<PendingTransaction<'_, M::Provider>, SignerMiddlewareError<M, K>> {
        let signed = self.sign_document(document).await?;
        let receipt = self.broadcast(&signed, BroadcastMode::Sync).await?;
        let pending =
            PendingTransaction::new(receipt.tx_hash, self.provider()).retries(self.poll_attempts);
        Ok(match self.poll_interval {
            Some(interval) => pending.interval(interval),
            None => pending,
        })
    }
}

#[async_trait]
impl<M, K> Middleware for SignerMiddleware<M, K>
where
    M: Middleware,
    K: KeyStore,
{
    type Error = SignerMiddlewareError<M, K>;
    type Provider = M::Provider;
    type Inner = M;

    /// Returns a reference to the inner middleware
    fn inner(&self) -> &M {
        &self.inner
    }
}
