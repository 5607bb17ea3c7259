//! # Product Repository
//!
//! Database operations for products and their bills of materials.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                      product_articles                         │
//! │  ┌────┬──────────┬───────┐     ┌────────────┬────────────┬──────────┐  │
//! │  │ id │ name     │ price │     │ product_id │ article_id │ amount   │  │
//! │  ├────┼──────────┼───────┤     ├────────────┼────────────┼──────────┤  │
//! │  │ 1  │ Chair    │ 4999  │◄────│ 1          │ 1 (leg)    │ 4        │  │
//! │  │    │          │       │◄────│ 1          │ 2 (screw)  │ 8        │  │
//! │  │ 2  │ Gift box │ 500   │     │ (none → unconstrained)             │  │
//! │  └────┴──────────┴───────┘     └────────────┴────────────┴──────────┘  │
//! │                                                                         │
//! │  Availability is never stored; it is computed from articles.stock      │
//! │  every time a product is read for display.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use stockroom_core::validation::{validate_id, validate_new_product};
use stockroom_core::{
    available_quantity, ArticleStocks, BomEntry, CoreError, NewProduct, Page, Product,
    ProductDefinition, ProductId, ProductView,
};

use super::article::fetch_stocks;
use super::push_id_list;
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, bill_of_materials: Vec<BomEntry>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price_cents: self.price_cents,
            bill_of_materials,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BomRow {
    product_id: i64,
    article_id: i64,
    amount_required: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product together with its bill of materials.
    ///
    /// ## Errors
    /// - `Core(Validation)` for an empty name, negative price, non-positive
    ///   amount or an article listed twice
    /// - `Core(ArticleNotFound)` if the bill references an unknown article
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        let mut tx = self.pool.begin().await?;
        let created = insert_in(&mut tx, product, Utc::now()).await?;
        tx.commit().await?;

        Ok(created)
    }

    /// Creates every product of an import file in one transaction.
    pub async fn create_many(&self, products: &[NewProduct]) -> DbResult<Vec<Product>> {
        for product in products {
            validate_new_product(product)?;
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(products.len());
        for product in products {
            created.push(insert_in(&mut tx, product, now).await?);
        }

        tx.commit().await?;

        info!(count = created.len(), "Products imported");
        Ok(created)
    }

    /// Gets a product by id, without availability.
    pub async fn get(&self, id: ProductId) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut boms = fetch_bill_of_materials(&mut conn, &BTreeSet::from([id])).await?;
        let bom = boms.remove(&id).unwrap_or_default();

        Ok(Some(row.into_product(bom)))
    }

    /// Lists products by ascending id, each with its current availability.
    pub async fn list(&self, page: Page) -> DbResult<Vec<ProductView>> {
        // One transaction so every product sees the same stock levels.
        let mut tx = self.pool.begin().await?;

        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, created_at, updated_at
            FROM products
            ORDER BY id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *tx)
        .await?;

        let views = with_availability(&mut tx, rows).await?;
        tx.commit().await?;

        Ok(views)
    }

    /// Gets the given products with availability. Unknown ids are skipped.
    pub async fn get_many(&self, ids: &BTreeSet<ProductId>) -> DbResult<Vec<ProductView>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::new(
            "SELECT id, name, price_cents, created_at, updated_at FROM products WHERE id",
        );
        push_id_list(&mut builder, ids.iter().copied());
        builder.push(" ORDER BY id");

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&mut *tx).await?;

        let views = with_availability(&mut tx, rows).await?;
        tx.commit().await?;

        Ok(views)
    }

    /// Deletes a product and its bill of materials.
    ///
    /// Ledger lines keep their own product name, so history is untouched.
    pub async fn delete(&self, id: ProductId) -> DbResult<()> {
        validate_id("product_id", id)?;
        debug!(id = id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_in(
    conn: &mut SqliteConnection,
    product: &NewProduct,
    now: DateTime<Utc>,
) -> DbResult<Product> {
    debug!(name = %product.name, articles = product.bill_of_materials.len(), "Creating product");

    let wanted: BTreeSet<i64> = product
        .bill_of_materials
        .iter()
        .map(|entry| entry.article_id)
        .collect();
    let existing = fetch_stocks(conn, &wanted).await?;
    if let Some(missing) = wanted.iter().find(|id| !existing.contains_key(id)) {
        return Err(CoreError::ArticleNotFound(*missing).into());
    }

    let row: ProductRow = sqlx::query_as(
        r#"
        INSERT INTO products (name, price_cents, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?3)
        RETURNING id, name, price_cents, created_at, updated_at
        "#,
    )
    .bind(product.name.trim())
    .bind(product.price_cents)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    for entry in &product.bill_of_materials {
        sqlx::query(
            r#"
            INSERT INTO product_articles (product_id, article_id, amount_required)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(row.id)
        .bind(entry.article_id)
        .bind(entry.amount_required)
        .execute(&mut *conn)
        .await?;
    }

    Ok(row.into_product(product.bill_of_materials.clone()))
}

/// Attaches bills of materials and availability to product rows.
async fn with_availability(
    conn: &mut SqliteConnection,
    rows: Vec<ProductRow>,
) -> DbResult<Vec<ProductView>> {
    let ids: BTreeSet<ProductId> = rows.iter().map(|row| row.id).collect();
    let mut boms = fetch_bill_of_materials(conn, &ids).await?;

    let article_ids: BTreeSet<i64> = boms
        .values()
        .flatten()
        .map(|entry| entry.article_id)
        .collect();
    let stocks: ArticleStocks = fetch_stocks(conn, &article_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let bom = boms.remove(&row.id).unwrap_or_default();
            let availability = available_quantity(&bom, &stocks);
            ProductView {
                product: row.into_product(bom),
                availability,
            }
        })
        .collect())
}

/// Bills of materials for `ids`, ordered by article id.
///
/// Products without entries are absent from the map.
pub(crate) async fn fetch_bill_of_materials(
    conn: &mut SqliteConnection,
    ids: &BTreeSet<ProductId>,
) -> DbResult<BTreeMap<ProductId, Vec<BomEntry>>> {
    let mut boms: BTreeMap<ProductId, Vec<BomEntry>> = BTreeMap::new();
    if ids.is_empty() {
        return Ok(boms);
    }

    let mut builder = QueryBuilder::new(
        "SELECT product_id, article_id, amount_required FROM product_articles WHERE product_id",
    );
    push_id_list(&mut builder, ids.iter().copied());
    builder.push(" ORDER BY product_id, article_id");

    let rows: Vec<BomRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    for row in rows {
        boms.entry(row.product_id)
            .or_default()
            .push(BomEntry::new(row.article_id, row.amount_required));
    }

    Ok(boms)
}

/// Product definitions for a sale snapshot. Unknown ids are absent.
pub(crate) async fn fetch_definitions(
    conn: &mut SqliteConnection,
    ids: &BTreeSet<ProductId>,
) -> DbResult<BTreeMap<ProductId, ProductDefinition>> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut builder = QueryBuilder::new("SELECT id, name FROM products WHERE id");
    push_id_list(&mut builder, ids.iter().copied());

    let rows: Vec<(i64, String)> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let found: BTreeSet<ProductId> = rows.iter().map(|(id, _)| *id).collect();
    let mut boms = fetch_bill_of_materials(conn, &found).await?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| {
            let definition = ProductDefinition {
                id,
                name,
                bill_of_materials: boms.remove(&id).unwrap_or_default(),
            };
            (id, definition)
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
