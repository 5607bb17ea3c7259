//! # Stock Calculator
//!
//! Derives how many units of a product can be sold from the current stock
//! of the articles in its bill of materials.
//!
//! ## Bottleneck Yield
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product "Dining Chair"                                                 │
//! │                                                                         │
//! │  article        stock   required   stock / required                    │
//! │  ─────────────  ─────   ────────   ────────────────                    │
//! │  leg              12        4             3                            │
//! │  screw            17        8             2   ◄── bottleneck           │
//! │  seat              2        1             2                            │
//! │                                                                         │
//! │  available = min(3, 2, 2) = 2                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A product with an empty bill of materials is [`Availability::Unconstrained`],
//! which is not the same thing as a large number.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{ArticleId, BomEntry, Product};

/// Current stock per article, as read in one snapshot.
pub type ArticleStocks = BTreeMap<ArticleId, i64>;

/// How many units of a product are currently sellable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum Availability {
    /// No articles back this product; stock checks are skipped.
    Unconstrained,
    /// At most this many units can be produced from current stock.
    Limited(i64),
}

impl Availability {
    /// Whether `quantity` units can be sold.
    #[inline]
    pub fn covers(&self, quantity: i64) -> bool {
        match self {
            Availability::Unconstrained => true,
            Availability::Limited(available) => *available >= quantity,
        }
    }

    /// The numeric limit, or `None` when unconstrained.
    #[inline]
    pub fn limit(&self) -> Option<i64> {
        match self {
            Availability::Unconstrained => None,
            Availability::Limited(available) => Some(*available),
        }
    }

    #[inline]
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Availability::Unconstrained)
    }
}

/// Computes the sellable quantity for a bill of materials.
///
/// Articles missing from `stocks` count as zero stock. Entries with a
/// non-positive `amount_required` never reach here through the catalog;
/// if one does, the product yields zero rather than dividing by it.
///
/// ## Example
/// ```rust
/// use stockroom_core::stock::{available_quantity, ArticleStocks, Availability};
/// use stockroom_core::BomEntry;
///
/// let stocks = ArticleStocks::from([(1, 8)]);
/// let bom = [BomEntry::new(1, 2)];
/// assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(4));
/// assert_eq!(available_quantity(&[], &stocks), Availability::Unconstrained);
/// ```
pub fn available_quantity(bill_of_materials: &[BomEntry], stocks: &ArticleStocks) -> Availability {
    if bill_of_materials.is_empty() {
        return Availability::Unconstrained;
    }

    let mut available = i64::MAX;

    for entry in bill_of_materials {
        let stock = stocks.get(&entry.article_id).copied().unwrap_or(0);

        if entry.amount_required <= 0 || entry.amount_required > stock {
            // Not even one unit can be assembled.
            return Availability::Limited(0);
        }

        available = available.min(stock / entry.amount_required);
    }

    Availability::Limited(available)
}

impl Product {
    /// Availability of this product against a stock snapshot.
    pub fn availability(&self, stocks: &ArticleStocks) -> Availability {
        available_quantity(&self.bill_of_materials, stocks)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_bill_is_unconstrained() {
        let stocks = ArticleStocks::new();
        assert_eq!(available_quantity(&[], &stocks), Availability::Unconstrained);

        let stocks = ArticleStocks::from([(1, 0), (2, 1_000)]);
        assert_eq!(available_quantity(&[], &stocks), Availability::Unconstrained);
    }

    #[test]
    fn test_single_article_ratio() {
        let stocks = ArticleStocks::from([(1, 8)]);
        let bom = [BomEntry::new(1, 2)];
        assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(4));
    }

    #[test]
    fn test_floor_division() {
        let stocks = ArticleStocks::from([(1, 9)]);
        let bom = [BomEntry::new(1, 2)];
        assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(4));
    }

    #[test]
    fn test_bottleneck_article_wins() {
        let stocks = ArticleStocks::from([(1, 12), (2, 17), (3, 2)]);
        let bom = [BomEntry::new(1, 4), BomEntry::new(2, 8), BomEntry::new(3, 1)];
        assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(2));
    }

    #[test]
    fn test_required_exceeds_stock_is_zero() {
        let stocks = ArticleStocks::from([(1, 100), (2, 3)]);
        let bom = [BomEntry::new(1, 1), BomEntry::new(2, 4)];
        assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(0));
    }

    #[test]
    fn test_missing_article_counts_as_zero() {
        let stocks = ArticleStocks::from([(1, 100)]);
        let bom = [BomEntry::new(1, 1), BomEntry::new(99, 1)];
        assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(0));
    }

    #[test]
    fn test_zero_amount_required_does_not_panic() {
        let stocks = ArticleStocks::from([(1, 10)]);
        let bom = [BomEntry::new(1, 0)];
        assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(0));
    }

    #[test]
    fn test_covers() {
        assert!(Availability::Unconstrained.covers(1_000_000));
        assert!(Availability::Limited(4).covers(4));
        assert!(!Availability::Limited(4).covers(5));
        assert_eq!(Availability::Limited(4).limit(), Some(4));
        assert_eq!(Availability::Unconstrained.limit(), None);
    }

    #[test]
    fn test_availability_serialization() {
        let json = serde_json::to_string(&Availability::Limited(3)).unwrap();
        assert_eq!(json, r#"{"kind":"limited","quantity":3}"#);

        let json = serde_json::to_string(&Availability::Unconstrained).unwrap();
        assert_eq!(json, r#"{"kind":"unconstrained"}"#);
    }

    fn bom_strategy() -> impl Strategy<Value = Vec<BomEntry>> {
        prop::collection::btree_map(1i64..6, 1i64..10, 1..5).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(article_id, amount)| BomEntry::new(article_id, amount))
                .collect()
        })
    }

    fn stocks_strategy() -> impl Strategy<Value = ArticleStocks> {
        prop::collection::btree_map(1i64..6, 0i64..200, 0..6)
    }

    proptest! {
        #[test]
        fn prop_monotonic_in_article_stock(
            bom in bom_strategy(),
            stocks in stocks_strategy(),
            article_id in 1i64..6,
            extra in 0i64..100,
        ) {
            let before = available_quantity(&bom, &stocks);

            let mut restocked = stocks.clone();
            *restocked.entry(article_id).or_insert(0) += extra;
            let after = available_quantity(&bom, &restocked);

            prop_assert!(after.limit() >= before.limit());
        }

        #[test]
        fn prop_repeated_reads_agree(bom in bom_strategy(), stocks in stocks_strategy()) {
            prop_assert_eq!(available_quantity(&bom, &stocks), available_quantity(&bom, &stocks));
        }

        #[test]
        fn prop_shortfall_means_zero(bom in bom_strategy(), stocks in stocks_strategy()) {
            let short = bom.iter().any(|entry| {
                entry.amount_required > stocks.get(&entry.article_id).copied().unwrap_or(0)
            });
            if short {
                prop_assert_eq!(available_quantity(&bom, &stocks), Availability::Limited(0));
            }
        }

        #[test]
        fn prop_available_units_fit_in_stock(bom in bom_strategy(), stocks in stocks_strategy()) {
            if let Availability::Limited(units) = available_quantity(&bom, &stocks) {
                for entry in &bom {
                    let stock = stocks.get(&entry.article_id).copied().unwrap_or(0);
                    prop_assert!(units * entry.amount_required <= stock);
                }
            }
        }
    }
}
