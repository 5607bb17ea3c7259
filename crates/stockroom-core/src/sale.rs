//! # Sale Planning
//!
//! The pure half of a sale: validate the request, check availability
//! against a snapshot, and turn it into guarded stock writes plus ledger
//! lines. Nothing here touches storage; see [`crate::coordinator`] for the
//! orchestration around it.
//!
//! ## Shared Articles Add Up
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Article X: stock 10                                                   │
//! │  Product A needs 2 × X      Product B needs 3 × X                      │
//! │                                                                         │
//! │  Request { A: 2, B: 1 }                                                │
//! │                                                                         │
//! │  consumption[X] = 2×2 + 1×3 = 7        (accumulated per article)       │
//! │  new stock X    = 10 - 7    = 3                                        │
//! │                                                                         │
//! │  ❌ never 10 - 3 (last product wins) or 10 - 4 (first product wins)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{SaleError, SaleResult};
use crate::stock::available_quantity;
use crate::store::{SaleSnapshot, StockUpdate};
use crate::types::{ArticleId, LedgerLine, SaleRequest};

/// Everything needed to commit a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    /// One guarded write per affected article, ordered by article id.
    pub updates: Vec<StockUpdate>,
    /// One ledger line per requested product, ordered by product id.
    pub lines: Vec<LedgerLine>,
}

/// Rejects empty requests and non-positive quantities.
///
/// Runs before any I/O.
pub fn validate_request(request: &SaleRequest) -> SaleResult<()> {
    if request.is_empty() {
        return Err(SaleError::EmptyRequest);
    }

    for (product_id, requested) in request.iter() {
        if requested <= 0 {
            return Err(SaleError::InvalidAmount {
                product_id,
                requested,
            });
        }
    }

    Ok(())
}

/// Fails with the first product whose request cannot be covered.
///
/// Products are checked in ascending id order against the stock left over
/// by the products before them, so two products that each fit alone but
/// together overdraw a shared article are rejected here as
/// [`SaleError::InsufficientStock`] on the later product.
pub fn check_availability(request: &SaleRequest, snapshot: &SaleSnapshot) -> SaleResult<()> {
    let mut remaining = snapshot.stocks.clone();

    for (product_id, requested) in request.iter() {
        let Some(product) = snapshot.product(product_id) else {
            return Err(SaleError::InsufficientStock {
                product_id,
                available: 0,
                requested,
            });
        };

        let availability = available_quantity(&product.bill_of_materials, &remaining);
        if !availability.covers(requested) {
            return Err(SaleError::InsufficientStock {
                product_id,
                available: availability.limit().unwrap_or(0),
                requested,
            });
        }

        for entry in &product.bill_of_materials {
            let stock = remaining.entry(entry.article_id).or_insert(0);
            *stock -= requested * entry.amount_required;
        }
    }

    Ok(())
}

/// Total units of each article the request consumes.
///
/// Every product's `quantity × amount_required` is added to the running
/// total of its article.
pub fn aggregate_consumption(
    request: &SaleRequest,
    snapshot: &SaleSnapshot,
) -> BTreeMap<ArticleId, i64> {
    let mut consumption: BTreeMap<ArticleId, i64> = BTreeMap::new();

    for (product_id, requested) in request.iter() {
        let Some(product) = snapshot.product(product_id) else {
            continue;
        };

        for entry in &product.bill_of_materials {
            let total = consumption.entry(entry.article_id).or_insert(0);
            *total = total.saturating_add(requested.saturating_mul(entry.amount_required));
        }
    }

    consumption
}

/// Turns per-article consumption into guarded writes against the snapshot.
///
/// A computed stock below zero is reported as [`SaleError::Inconsistent`]
/// and never clamped.
pub fn build_updates(
    consumption: &BTreeMap<ArticleId, i64>,
    snapshot: &SaleSnapshot,
) -> SaleResult<Vec<StockUpdate>> {
    let mut updates = Vec::with_capacity(consumption.len());

    for (&article_id, &consumed) in consumption {
        let current = snapshot.stock(article_id);
        let new_stock = current - consumed;

        if new_stock < 0 {
            return Err(SaleError::Inconsistent {
                article_id,
                current,
                consumed,
                new_stock,
            });
        }

        updates.push(StockUpdate {
            article_id,
            previous: current,
            new_stock,
        });
    }

    Ok(updates)
}

/// Validates, checks availability, and builds the writes and ledger lines
/// for a sale.
pub fn plan_sale(request: &SaleRequest, snapshot: &SaleSnapshot) -> SaleResult<SalePlan> {
    validate_request(request)?;
    check_availability(request, snapshot)?;

    let consumption = aggregate_consumption(request, snapshot);
    let updates = build_updates(&consumption, snapshot)?;

    let mut lines = Vec::with_capacity(request.len());
    for (product_id, quantity) in request.iter() {
        // check_availability already rejected unknown products.
        let product = snapshot
            .product(product_id)
            .ok_or(SaleError::InsufficientStock {
                product_id,
                available: 0,
                requested: quantity,
            })?;

        lines.push(LedgerLine {
            product_id,
            product_name: product.name.clone(),
            quantity,
        });
    }

    Ok(SalePlan { updates, lines })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::ArticleStocks;
    use crate::store::ProductDefinition;
    use crate::types::BomEntry;

    const X: ArticleId = 100;
    const Y: ArticleId = 200;

    fn product(id: i64, name: &str, bom: Vec<BomEntry>) -> (i64, ProductDefinition) {
        (
            id,
            ProductDefinition {
                id,
                name: name.to_string(),
                bill_of_materials: bom,
            },
        )
    }

    fn shared_article_snapshot() -> SaleSnapshot {
        SaleSnapshot {
            products: BTreeMap::from([
                product(1, "A", vec![BomEntry::new(X, 2)]),
                product(2, "B", vec![BomEntry::new(X, 3)]),
            ]),
            stocks: ArticleStocks::from([(X, 10)]),
        }
    }

    #[test]
    fn test_validate_request() {
        assert!(matches!(
            validate_request(&SaleRequest::new()),
            Err(SaleError::EmptyRequest)
        ));
        assert!(matches!(
            validate_request(&SaleRequest::new().with(1, 0)),
            Err(SaleError::InvalidAmount { product_id: 1, requested: 0 })
        ));
        assert!(matches!(
            validate_request(&SaleRequest::new().with(1, 2).with(2, -1)),
            Err(SaleError::InvalidAmount { product_id: 2, requested: -1 })
        ));
        assert!(validate_request(&SaleRequest::new().with(1, 1)).is_ok());
    }

    #[test]
    fn test_shared_article_consumption_is_additive() {
        let snapshot = shared_article_snapshot();
        let request = SaleRequest::new().with(1, 2).with(2, 1);

        let consumption = aggregate_consumption(&request, &snapshot);
        assert_eq!(consumption.get(&X), Some(&7));

        let plan = plan_sale(&request, &snapshot).unwrap();
        assert_eq!(
            plan.updates,
            vec![StockUpdate {
                article_id: X,
                previous: 10,
                new_stock: 3
            }]
        );
    }

    #[test]
    fn test_plan_lines_snapshot_names() {
        let snapshot = shared_article_snapshot();
        let request = SaleRequest::new().with(2, 1).with(1, 2);

        let plan = plan_sale(&request, &snapshot).unwrap();
        assert_eq!(
            plan.lines,
            vec![
                LedgerLine {
                    product_id: 1,
                    product_name: "A".to_string(),
                    quantity: 2
                },
                LedgerLine {
                    product_id: 2,
                    product_name: "B".to_string(),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_each_product_fits_but_combined_does_not() {
        // A alone can take 5 and B alone can take 3, but 3×A + 2×B needs 12 of X.
        let snapshot = shared_article_snapshot();
        let request = SaleRequest::new().with(1, 3).with(2, 2);

        let err = plan_sale(&request, &snapshot).unwrap_err();
        assert!(matches!(
            err,
            SaleError::InsufficientStock {
                product_id: 2,
                available: 1,
                requested: 2
            }
        ));
    }

    #[test]
    fn test_combined_request_that_exactly_fits() {
        let snapshot = shared_article_snapshot();
        let request = SaleRequest::new().with(1, 2).with(2, 2);

        let plan = plan_sale(&request, &snapshot).unwrap();
        assert_eq!(plan.updates[0].new_stock, 0);
    }

    #[test]
    fn test_negative_stock_is_inconsistent_not_clamped() {
        let snapshot = shared_article_snapshot();
        let consumption = BTreeMap::from([(X, 12)]);

        let err = build_updates(&consumption, &snapshot).unwrap_err();
        assert!(matches!(
            err,
            SaleError::Inconsistent {
                article_id: X,
                current: 10,
                consumed: 12,
                new_stock: -2
            }
        ));
    }

    #[test]
    fn test_insufficient_stock() {
        let snapshot = SaleSnapshot {
            products: BTreeMap::from([product(1, "P", vec![BomEntry::new(X, 2)])]),
            stocks: ArticleStocks::from([(X, 8)]),
        };

        assert!(plan_sale(&SaleRequest::new().with(1, 4), &snapshot).is_ok());

        let err = plan_sale(&SaleRequest::new().with(1, 5), &snapshot).unwrap_err();
        assert!(matches!(
            err,
            SaleError::InsufficientStock {
                product_id: 1,
                available: 4,
                requested: 5
            }
        ));
    }

    #[test]
    fn test_unknown_product_is_insufficient_stock() {
        let snapshot = shared_article_snapshot();
        let err = plan_sale(&SaleRequest::new().with(42, 1), &snapshot).unwrap_err();
        assert!(matches!(
            err,
            SaleError::InsufficientStock {
                product_id: 42,
                available: 0,
                requested: 1
            }
        ));
    }

    #[test]
    fn test_unconstrained_product_needs_no_updates() {
        let snapshot = SaleSnapshot {
            products: BTreeMap::from([product(5, "Gift wrap", vec![])]),
            stocks: ArticleStocks::new(),
        };

        let plan = plan_sale(&SaleRequest::new().with(5, 1_000), &snapshot).unwrap();
        assert!(plan.updates.is_empty());
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].quantity, 1_000);
    }

    #[test]
    fn test_multiple_articles_per_product() {
        let snapshot = SaleSnapshot {
            products: BTreeMap::from([
                product(1, "Chair", vec![BomEntry::new(X, 4), BomEntry::new(Y, 1)]),
                product(2, "Stool", vec![BomEntry::new(X, 3)]),
            ]),
            stocks: ArticleStocks::from([(X, 20), (Y, 5)]),
        };
        let request = SaleRequest::new().with(1, 2).with(2, 3);

        let plan = plan_sale(&request, &snapshot).unwrap();
        assert_eq!(
            plan.updates,
            vec![
                StockUpdate {
                    article_id: X,
                    previous: 20,
                    new_stock: 3
                },
                StockUpdate {
                    article_id: Y,
                    previous: 5,
                    new_stock: 3
                },
            ]
        );
    }
}
