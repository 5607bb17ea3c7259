//! # Import Parsing
//!
//! Turns loosely-typed inventory, product, and sale payloads into typed
//! domain values. Numeric fields in inventory and product files arrive as
//! strings; they are parsed here and never reach the rest of the crate as
//! text.
//!
//! ## File Formats
//! ```text
//! inventory.json                          products.json
//! ──────────────                          ─────────────
//! {                                       {
//!   "inventory": [                          "products": [
//!     { "art_id": "1",                        { "name": "Dining Chair",
//!       "name": "leg",                          "price": 49.99,
//!       "stock": "12" }                         "contain_articles": [
//!   ]                                             { "art_id": "1",
//! }                                                 "amount_of": "4" } ] }
//!                                           ]
//!                                         }
//! ```
//!
//! Unlike a lenient parser, a malformed number is an error here, not a zero.

use serde::Deserialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{BomEntry, NewArticle, NewProduct, SaleRequest};
use crate::validation::{validate_new_article, validate_new_product};

#[derive(Debug, Deserialize)]
struct RawInventoryFile {
    inventory: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    art_id: String,
    name: String,
    stock: String,
}

#[derive(Debug, Deserialize)]
struct RawProductFile {
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    name: String,
    price: f64,
    #[serde(default)]
    contain_articles: Vec<RawBomEntry>,
}

#[derive(Debug, Deserialize)]
struct RawBomEntry {
    art_id: String,
    amount_of: String,
}

#[derive(Debug, Deserialize)]
struct RawSaleRequest {
    data: Vec<RawSaleLine>,
}

#[derive(Debug, Deserialize)]
struct RawSaleLine {
    #[serde(rename = "productID")]
    product_id: i64,
    amount: i64,
}

/// Parses an inventory file into validated articles.
pub fn parse_inventory(json: &str) -> CoreResult<Vec<NewArticle>> {
    let file: RawInventoryFile = serde_json::from_str(json).map_err(|e| malformed("inventory", e))?;

    file.inventory
        .into_iter()
        .map(|raw| {
            let article = NewArticle {
                id: parse_integer("art_id", &raw.art_id)?,
                name: raw.name.trim().to_string(),
                stock: parse_integer("stock", &raw.stock)?,
            };
            validate_new_article(&article)?;
            Ok(article)
        })
        .collect()
}

/// Parses a product file into validated products.
pub fn parse_products(json: &str) -> CoreResult<Vec<NewProduct>> {
    let file: RawProductFile = serde_json::from_str(json).map_err(|e| malformed("products", e))?;

    file.products
        .into_iter()
        .map(|raw| {
            let bill_of_materials = raw
                .contain_articles
                .iter()
                .map(|entry| {
                    Ok(BomEntry::new(
                        parse_integer("art_id", &entry.art_id)?,
                        parse_integer("amount_of", &entry.amount_of)?,
                    ))
                })
                .collect::<Result<Vec<_>, ValidationError>>()?;

            let product = NewProduct {
                name: raw.name.trim().to_string(),
                price_cents: price_to_cents(raw.price)?,
                bill_of_materials,
            };
            validate_new_product(&product)?;
            Ok(product)
        })
        .collect()
}

/// Parses a `{"data": [{"productID": 1, "amount": 2}]}` sale payload.
///
/// Lines for the same product are summed; non-positive amounts are rejected.
pub fn parse_sale_request(json: &str) -> CoreResult<SaleRequest> {
    let raw: RawSaleRequest = serde_json::from_str(json).map_err(|e| malformed("sale", e))?;

    SaleRequest::from_lines(raw.data.into_iter().map(|line| (line.product_id, line.amount)))
        .map_err(|_| {
            CoreError::Validation(ValidationError::MustBePositive {
                field: "amount".to_string(),
            })
        })
}

/// Parses a base-10 integer carried as a string.
pub fn parse_integer(field: &str, value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not an integer ({})", value, e),
        })
}

/// Converts a decimal price to cents, rounding half away from zero.
pub fn price_to_cents(price: f64) -> Result<i64, ValidationError> {
    if !price.is_finite() || price < 0.0 || price > (i64::MAX / 100) as f64 {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("{} is not a valid price", price),
        });
    }

    Ok((price * 100.0).round() as i64)
}

fn malformed(what: &str, err: serde_json::Error) -> CoreError {
    CoreError::Validation(ValidationError::InvalidFormat {
        field: what.to_string(),
        reason: err.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inventory() {
        let json = r#"{
            "inventory": [
                { "art_id": "1", "name": "leg", "stock": "12" },
                { "art_id": "2", "name": "screw", "stock": "17" }
            ]
        }"#;

        let articles = parse_inventory(json).unwrap();
        assert_eq!(
            articles,
            vec![
                NewArticle { id: 1, name: "leg".to_string(), stock: 12 },
                NewArticle { id: 2, name: "screw".to_string(), stock: 17 },
            ]
        );
    }

    #[test]
    fn test_parse_inventory_rejects_bad_numbers() {
        let json = r#"{ "inventory": [ { "art_id": "1", "name": "leg", "stock": "twelve" } ] }"#;
        let err = parse_inventory(json).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { ref field, .. }) if field == "stock"
        ));

        let json = r#"{ "inventory": [ { "art_id": "1", "name": "leg", "stock": "-4" } ] }"#;
        assert!(parse_inventory(json).is_err());
    }

    #[test]
    fn test_parse_products() {
        let json = r#"{
            "products": [
                {
                    "name": "Dining Chair",
                    "price": 49.99,
                    "contain_articles": [
                        { "art_id": "1", "amount_of": "4" },
                        { "art_id": "2", "amount_of": "8" }
                    ]
                },
                { "name": "Gift card", "price": 25 }
            ]
        }"#;

        let products = parse_products(json).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price_cents, 4999);
        assert_eq!(
            products[0].bill_of_materials,
            vec![BomEntry::new(1, 4), BomEntry::new(2, 8)]
        );
        assert!(products[1].bill_of_materials.is_empty());
        assert_eq!(products[1].price_cents, 2500);
    }

    #[test]
    fn test_parse_products_rejects_zero_amount() {
        let json = r#"{ "products": [ { "name": "Table", "price": 1,
            "contain_articles": [ { "art_id": "1", "amount_of": "0" } ] } ] }"#;
        assert!(parse_products(json).is_err());
    }

    #[test]
    fn test_parse_sale_request() {
        let json = r#"{ "data": [
            { "productID": 1, "amount": 2 },
            { "productID": 2, "amount": 1 },
            { "productID": 1, "amount": 1 }
        ] }"#;

        let request = parse_sale_request(json).unwrap();
        assert_eq!(request.quantity(1), Some(3));
        assert_eq!(request.quantity(2), Some(1));

        let json = r#"{ "data": [ { "productID": 1, "amount": 0 } ] }"#;
        assert!(parse_sale_request(json).is_err());

        assert!(parse_sale_request("not json").is_err());
    }

    #[test]
    fn test_price_to_cents() {
        assert_eq!(price_to_cents(10.99).unwrap(), 1099);
        assert_eq!(price_to_cents(0.0).unwrap(), 0);
        assert!(price_to_cents(-1.0).is_err());
        assert!(price_to_cents(f64::NAN).is_err());
    }
}
