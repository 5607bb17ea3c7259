//! # Sale Coordinator
//!
//! Runs a sale end to end against an injected [`SaleStore`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  execute_sale(request)                                                 │
//! │       │                                                                 │
//! │       ├── validate_request ──────────► EmptyRequest / InvalidAmount    │
//! │       │   (no I/O yet)                                                  │
//! │       ▼                                                                 │
//! │  store.begin()                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unit.load_snapshot(request ids)                                       │
//! │       │                                                                 │
//! │       ├── plan_sale ─────────────────► InsufficientStock / Inconsistent│
//! │       │   (unit dropped = rollback)                                     │
//! │       ▼                                                                 │
//! │  unit.commit_sale(updates, lines) ───► Persistence(Conflict | ...)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TransactionRecord                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator keeps no state between sales and never retries; a
//! conflicting commit surfaces as [`SaleError::Persistence`] and the caller
//! decides whether to run the whole sale again.

use tracing::{debug, info, warn};

use crate::error::{SaleError, SaleResult};
use crate::sale::{plan_sale, validate_request};
use crate::store::{SaleStore, SaleUnit};
use crate::types::{SaleRequest, TransactionRecord};

/// Orchestrates sales over a persistence collaborator.
///
/// ## Usage
/// ```rust,ignore
/// let coordinator = SaleCoordinator::new(db.sales());
/// let record = coordinator
///     .execute_sale(&SaleRequest::from_lines([(1, 2), (2, 1)])?)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleCoordinator<S> {
    store: S,
}

impl<S: SaleStore> SaleCoordinator<S> {
    /// Creates a coordinator over the given store.
    pub fn new(store: S) -> Self {
        SaleCoordinator { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sells every product in `request` or nothing at all.
    pub async fn execute_sale(&self, request: &SaleRequest) -> SaleResult<TransactionRecord> {
        validate_request(request)?;

        debug!(products = request.len(), "Executing sale");

        let mut unit = self.store.begin().await?;
        let snapshot = unit.load_snapshot(&request.product_ids()).await?;

        let plan = match plan_sale(request, &snapshot) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "Sale rejected");
                return Err(err);
            }
        };

        debug!(
            articles = plan.updates.len(),
            lines = plan.lines.len(),
            "Sale planned"
        );

        let record = unit
            .commit_sale(plan.updates, plan.lines)
            .await
            .map_err(|err| {
                warn!(error = %err, "Sale commit failed");
                SaleError::from(err)
            })?;

        info!(
            transaction_id = record.id,
            units = record.total_quantity(),
            "Sale committed"
        );

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
