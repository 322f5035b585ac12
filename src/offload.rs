//! Async wrappers that run engine operations on tokio's blocking pool.
//!
//! Signing and decryption are CPU-bound. On a cooperative runtime, call these
//! instead of the engine directly so a burst of RSA or ECDH work does not stall
//! other tasks. Each wrapper needs a running tokio runtime.

use std::sync::Arc;

use thiserror::Error;
use tokenseal_jose::{
    ContentEncryptionAlgorithm, Header, JoseError, JwsAlgorithm, Key, KeyManagementAlgorithm,
    TokenEngine,
};
use tracing::warn;

#[derive(Debug, Error)]
pub enum OffloadError {
    #[error(transparent)]
    Jose(#[from] JoseError),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl OffloadError {
    /// The engine's error, if the task ran to completion.
    pub fn as_jose(&self) -> Option<&JoseError> {
        match self {
            OffloadError::Jose(err) => Some(err),
            OffloadError::Join(_) => None,
        }
    }
}

pub async fn sign(
    engine: Arc<TokenEngine>,
    header: Header,
    payload: Vec<u8>,
    key: Arc<Key>,
) -> Result<String, OffloadError> {
    run("sign", move || engine.sign(&header, &payload, &key)).await
}

pub async fn verify(
    engine: Arc<TokenEngine>,
    token: String,
    expected: JwsAlgorithm,
    key: Arc<Key>,
) -> Result<Vec<u8>, OffloadError> {
    run("verify", move || engine.verify(&token, expected, &key)).await
}

pub async fn encrypt(
    engine: Arc<TokenEngine>,
    header: Header,
    payload: Vec<u8>,
    key: Arc<Key>,
) -> Result<String, OffloadError> {
    run("encrypt", move || engine.encrypt(&header, &payload, &key)).await
}

pub async fn decrypt(
    engine: Arc<TokenEngine>,
    token: String,
    expected_alg: KeyManagementAlgorithm,
    expected_enc: ContentEncryptionAlgorithm,
    key: Arc<Key>,
) -> Result<Vec<u8>, OffloadError> {
    run("decrypt", move || {
        engine.decrypt(&token, expected_alg, expected_enc, &key)
    })
    .await
}

async fn run<T, F>(operation: &'static str, work: F) -> Result<T, OffloadError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, JoseError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => Ok(result?),
        Err(err) => {
            warn!(operation, error = %err, "offloaded token operation did not complete");
            Err(err.into())
        }
    }
}
