//! # Stock Movement Planning
//!
//! The pure half of the inventory ledger: given the current on-hand quantity
//! and a requested change, decide the new quantity and the transaction that
//! must be appended with it. The database crate executes the plan inside one
//! SQLite transaction; nothing here touches storage.
//!
//! ## Planning Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kind        delta    new quantity          ledger entry               │
//! │  ──────────  ───────  ────────────────────  ─────────────────────────  │
//! │  Sale        ≠ 0      current - |delta|     sale    × |delta|          │
//! │  Restock     ≠ 0      current + |delta|     restock × |delta|          │
//! │  Adjustment  > 0      current + delta       restock × delta            │
//! │  Adjustment  < 0      current + delta       sale    × |delta|          │
//! │  Adjustment  = 0      current (no-op)       none                       │
//! │  Sale/Restock = 0     rejected: InvalidQuantity                        │
//! │                                                                         │
//! │  Any plan whose new quantity would be < 0 is rejected with             │
//! │  InsufficientStock { current, requested } before anything is written.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Replay
//! Every committed movement satisfies `new = previous + signed(entry)`, so
//! replaying a product's transactions from its opening quantity must land on
//! the stored quantity. [`reconcile`] performs that check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{StockTransaction, TransactionType};
use crate::validation::validate_stock_level;

// =============================================================================
// Requests
// =============================================================================

/// How a requested delta should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChangeKind {
    /// Remove `|delta|` units; must not go below zero.
    Sale,
    /// Add `|delta|` units.
    Restock,
    /// Apply `delta` as signed; zero is a no-op.
    Adjustment,
}

/// A fully specified change request handed to the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    pub product_id: i64,
    pub delta: i64,
    pub kind: StockChangeKind,
    pub notes: Option<String>,
    /// Timestamp to record; `None` means "now".
    pub recorded_at: Option<DateTime<Utc>>,
}

impl StockRequest {
    pub fn new(product_id: i64, delta: i64, kind: StockChangeKind) -> Self {
        StockRequest {
            product_id,
            delta,
            kind,
            notes: None,
            recorded_at: None,
        }
    }

    pub fn sale(product_id: i64, quantity: i64) -> Self {
        Self::new(product_id, quantity, StockChangeKind::Sale)
    }

    pub fn restock(product_id: i64, quantity: i64) -> Self {
        Self::new(product_id, quantity, StockChangeKind::Restock)
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }
}

// =============================================================================
// Plans
// =============================================================================

/// The transaction row a movement must append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_type: TransactionType,
    /// Magnitude, always > 0.
    pub quantity: i64,
}

impl LedgerEntry {
    #[inline]
    pub fn signed_quantity(&self) -> i64 {
        self.transaction_type.signed(self.quantity)
    }
}

/// The outcome of planning one change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    /// `None` exactly when the net change is zero.
    pub entry: Option<LedgerEntry>,
}

impl StockMovement {
    fn unchanged(product_id: i64, current: i64) -> Self {
        StockMovement {
            product_id,
            previous_quantity: current,
            new_quantity: current,
            entry: None,
        }
    }

    /// True when nothing needs to be written.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.entry.is_none()
    }

    /// Signed net change.
    #[inline]
    pub fn delta(&self) -> i64 {
        self.new_quantity - self.previous_quantity
    }
}

/// Plans a relative change of `delta` units.
///
/// ## Example
/// ```rust
/// use stockroom_core::stock::{plan_delta, StockChangeKind};
/// use stockroom_core::CoreError;
///
/// let err = plan_delta(1, 100, 150, StockChangeKind::Sale).unwrap_err();
/// assert_eq!(
///     err,
///     CoreError::InsufficientStock { product_id: 1, current: 100, requested: 150 }
/// );
/// ```
pub fn plan_delta(
    product_id: i64,
    current: i64,
    delta: i64,
    kind: StockChangeKind,
) -> CoreResult<StockMovement> {
    let magnitude = delta
        .checked_abs()
        .ok_or_else(|| CoreError::invalid_quantity("quantity", delta, "out of range"))?;

    let transaction_type = match kind {
        StockChangeKind::Sale | StockChangeKind::Restock if delta == 0 => {
            return Err(CoreError::invalid_quantity(
                "quantity",
                delta,
                "must be a positive number of units",
            ));
        }
        StockChangeKind::Adjustment if delta == 0 => {
            return Ok(StockMovement::unchanged(product_id, current));
        }
        StockChangeKind::Sale => TransactionType::Sale,
        StockChangeKind::Restock => TransactionType::Restock,
        StockChangeKind::Adjustment if delta > 0 => TransactionType::Restock,
        StockChangeKind::Adjustment => TransactionType::Sale,
    };

    let new_quantity = match transaction_type {
        TransactionType::Sale => {
            if magnitude > current {
                return Err(CoreError::InsufficientStock {
                    product_id,
                    current,
                    requested: magnitude,
                });
            }
            current - magnitude
        }
        TransactionType::Restock => current.checked_add(magnitude).ok_or_else(|| {
            CoreError::invalid_quantity("quantity", delta, "stock level would overflow")
        })?,
    };

    Ok(StockMovement {
        product_id,
        previous_quantity: current,
        new_quantity,
        entry: Some(LedgerEntry {
            transaction_type,
            quantity: magnitude,
        }),
    })
}

/// Plans an absolute correction to `target` units.
///
/// A non-zero net change is recorded like an adjustment (restock when the
/// level goes up, sale when it goes down). Setting the level it already has
/// plans nothing.
pub fn plan_set(product_id: i64, current: i64, target: i64) -> CoreResult<StockMovement> {
    validate_stock_level(target)?;

    let delta = target
        .checked_sub(current)
        .ok_or_else(|| CoreError::invalid_quantity("stock level", target, "out of range"))?;

    plan_delta(product_id, current, delta, StockChangeKind::Adjustment)
}

// =============================================================================
// Replay
// =============================================================================

/// Replays transactions on top of an opening quantity.
///
/// ```rust
/// use stockroom_core::stock::replay;
/// use stockroom_core::TransactionType;
///
/// let moves = [(TransactionType::Sale, 5), (TransactionType::Restock, 10)];
/// assert_eq!(replay(20, moves), 25);
/// ```
pub fn replay<I>(opening: i64, movements: I) -> i64
where
    I: IntoIterator<Item = (TransactionType, i64)>,
{
    movements
        .into_iter()
        .fold(opening, |qty, (kind, magnitude)| qty + kind.signed(magnitude))
}

/// Result of comparing the stored level against a replay of its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub product_id: i64,
    pub opening_quantity: i64,
    pub stored_quantity: i64,
    pub replayed_quantity: i64,
    pub transaction_count: usize,
}

impl Reconciliation {
    /// `stored - replayed`; zero when the ledger is consistent.
    #[inline]
    pub fn drift(&self) -> i64 {
        self.stored_quantity - self.replayed_quantity
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.drift() == 0
    }
}

/// Builds a [`Reconciliation`] from a product's full transaction history.
pub fn reconcile(
    product_id: i64,
    opening_quantity: i64,
    stored_quantity: i64,
    history: &[StockTransaction],
) -> Reconciliation {
    let replayed_quantity = replay(
        opening_quantity,
        history
            .iter()
            .map(|t| (t.transaction_type, t.quantity)),
    );

    Reconciliation {
        product_id,
        opening_quantity,
        stored_quantity,
        replayed_quantity,
        transaction_count: history.len(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(movement: &StockMovement) -> LedgerEntry {
        movement.entry.expect("movement should record a transaction")
    }

    #[test]
    fn test_sale_reduces_stock() {
        let movement = plan_delta(1, 20, 5, StockChangeKind::Sale).unwrap();
        assert_eq!(movement.new_quantity, 15);
        assert_eq!(
            entry(&movement),
            LedgerEntry {
                transaction_type: TransactionType::Sale,
                quantity: 5
            }
        );
    }

    #[test]
    fn test_sale_sign_is_ignored() {
        // "sale of -5" still means five units out
        let movement = plan_delta(1, 20, -5, StockChangeKind::Sale).unwrap();
        assert_eq!(movement.new_quantity, 15);
        assert_eq!(entry(&movement).quantity, 5);
    }

    #[test]
    fn test_sale_of_entire_stock_is_allowed() {
        let movement = plan_delta(1, 7, 7, StockChangeKind::Sale).unwrap();
        assert_eq!(movement.new_quantity, 0);
    }

    #[test]
    fn test_oversell_is_rejected() {
        let err = plan_delta(3, 100, 150, StockChangeKind::Sale).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product_id: 3,
                current: 100,
                requested: 150
            }
        );
    }

    #[test]
    fn test_restock_adds_stock() {
        let movement = plan_delta(2, 30, 10, StockChangeKind::Restock).unwrap();
        assert_eq!(movement.new_quantity, 40);
        assert_eq!(entry(&movement).transaction_type, TransactionType::Restock);
        assert_eq!(entry(&movement).quantity, 10);
    }

    #[test]
    fn test_restock_overflow_is_rejected() {
        let err = plan_delta(2, i64::MAX, 1, StockChangeKind::Restock).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_zero_sale_or_restock_is_invalid() {
        for kind in [StockChangeKind::Sale, StockChangeKind::Restock] {
            let err = plan_delta(1, 10, 0, kind).unwrap_err();
            assert!(matches!(err, CoreError::InvalidQuantity { value: 0, .. }));
        }
    }

    #[test]
    fn test_zero_adjustment_is_noop() {
        let movement = plan_delta(1, 10, 0, StockChangeKind::Adjustment).unwrap();
        assert!(movement.is_noop());
        assert_eq!(movement.new_quantity, 10);
        assert_eq!(movement.delta(), 0);
    }

    #[test]
    fn test_adjustment_direction_follows_sign() {
        let up = plan_delta(1, 10, 4, StockChangeKind::Adjustment).unwrap();
        assert_eq!(up.new_quantity, 14);
        assert_eq!(entry(&up).transaction_type, TransactionType::Restock);

        let down = plan_delta(1, 10, -4, StockChangeKind::Adjustment).unwrap();
        assert_eq!(down.new_quantity, 6);
        assert_eq!(entry(&down).transaction_type, TransactionType::Sale);
        assert_eq!(entry(&down).quantity, 4);

        let err = plan_delta(1, 10, -11, StockChangeKind::Adjustment).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { current: 10, requested: 11, .. }));
    }

    #[test]
    fn test_plan_set() {
        let up = plan_set(1, 10, 25).unwrap();
        assert_eq!(up.new_quantity, 25);
        assert_eq!(entry(&up).transaction_type, TransactionType::Restock);
        assert_eq!(entry(&up).quantity, 15);

        let down = plan_set(1, 10, 0).unwrap();
        assert_eq!(entry(&down).transaction_type, TransactionType::Sale);
        assert_eq!(entry(&down).quantity, 10);

        assert!(plan_set(1, 10, 10).unwrap().is_noop());
        assert!(matches!(
            plan_set(1, 10, -1),
            Err(CoreError::InvalidQuantity { value: -1, .. })
        ));
    }

    #[test]
    fn test_reconcile_detects_drift() {
        let now = Utc::now();
        let tx = |id, kind, quantity| StockTransaction {
            id,
            product_id: 1,
            quantity,
            transaction_type: kind,
            transaction_date: now,
            notes: None,
        };
        let history = vec![
            tx(1, TransactionType::Sale, 5),
            tx(2, TransactionType::Restock, 10),
        ];

        let ok = reconcile(1, 20, 25, &history);
        assert!(ok.is_consistent());
        assert_eq!(ok.transaction_count, 2);

        let drifted = reconcile(1, 20, 22, &history);
        assert_eq!(drifted.drift(), -3);
        assert!(!drifted.is_consistent());
    }

    #[test]
    fn test_request_builder() {
        let at = Utc::now();
        let request = StockRequest::sale(4, 2).with_notes("counter sale").at(at);
        assert_eq!(request.kind, StockChangeKind::Sale);
        assert_eq!(request.notes.as_deref(), Some("counter sale"));
        assert_eq!(request.recorded_at, Some(at));
    }
}
