//! Strategy submission seam.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rangebook_core::EncodedOrder;
use serde::{Deserialize, Serialize};

use crate::error::SubmitError;
use crate::resolver::BoxFuture;

/// Optional transaction parameters forwarded untouched to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

/// Handle to a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: String,
}

/// Contracts backend that turns encoded orders into a transaction.
pub trait ContractsApi: Send + Sync {
    fn create_strategy<'a>(
        &'a self,
        token0: &'a str,
        token1: &'a str,
        orders: (EncodedOrder, EncodedOrder),
        overrides: TxOverrides,
    ) -> BoxFuture<'a, Result<TxHandle, SubmitError>>;
}

/// Arc wrapper for contracts trait objects.
pub type DynContractsApi = Arc<dyn ContractsApi>;

/// One recorded `create_strategy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedStrategy {
    pub token0: String,
    pub token1: String,
    pub orders: (EncodedOrder, EncodedOrder),
    pub overrides: TxOverrides,
}

/// Mock contracts backend for testing.
#[derive(Debug, Default)]
pub struct MockContractsApi {
    /// Recorded submissions for verification.
    submissions: parking_lot::Mutex<Vec<SubmittedStrategy>>,
    /// Error to return on the next call, if any.
    next_error: parking_lot::Mutex<Option<SubmitError>>,
    counter: AtomicU64,
}

impl MockContractsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next submission with `error`.
    pub fn set_next_error(&self, error: SubmitError) {
        *self.next_error.lock() = Some(error);
    }

    pub fn get_submissions(&self) -> Vec<SubmittedStrategy> {
        self.submissions.lock().clone()
    }
}

impl ContractsApi for MockContractsApi {
    fn create_strategy<'a>(
        &'a self,
        token0: &'a str,
        token1: &'a str,
        orders: (EncodedOrder, EncodedOrder),
        overrides: TxOverrides,
    ) -> BoxFuture<'a, Result<TxHandle, SubmitError>> {
        Box::pin(async move {
            self.submissions.lock().push(SubmittedStrategy {
                token0: token0.to_string(),
                token1: token1.to_string(),
                orders,
                overrides,
            });
            if let Some(error) = self.next_error.lock().take() {
                return Err(error);
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TxHandle {
                hash: format!("0x{n:064x}"),
            })
        })
    }
}
