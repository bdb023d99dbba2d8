//! Order repository for database operations.
//!
//! An order header and its lines are always written together, inside the
//! transaction opened by the order service; there is no partial insert path.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use pomelo_core::{OrderId, OrderStatus, ProductId, UserId};

use super::{PgTx, RepositoryError};
use crate::models::order::{Order, OrderLine, ProductSummary};

/// Insert payload for one order line.
///
/// `price` is the snapshot taken from the product row inside the same
/// transaction; `product` carries the display fields for the returned order.
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: i64,
    pub product: ProductSummary,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order header plus all of its lines as one unit.
    ///
    /// Runs inside the caller's transaction; nothing becomes visible until
    /// that transaction commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails (the caller's
    /// transaction then rolls back the lot).
    pub async fn insert_with_lines(
        tx: &mut PgTx<'_>,
        address_id: pomelo_core::AddressId,
        lines: Vec<NewOrderLine>,
    ) -> Result<Order, RepositoryError> {
        let header = sqlx::query(
            "INSERT INTO \"order\" (address_id)
             VALUES ($1)
             RETURNING id, address_id, status, status_date, created_at, updated_at",
        )
        .bind(address_id)
        .fetch_one(&mut **tx)
        .await?;

        let order_id: OrderId = header.try_get("id")?;

        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query(
                "INSERT INTO order_line (order_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut **tx)
            .await?;

            inserted.push(OrderLine {
                id: row.try_get("id")?,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
                product: line.product,
            });
        }

        map_order_row(&header, inserted)
    }

    /// Get one of the user's orders by id, with its lines.
    ///
    /// Ownership is established through the order's address: a user only
    /// sees orders shipped to their own addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is
    /// unknown.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query(
            "SELECT o.id, o.address_id, o.status, o.status_date, o.created_at, o.updated_at
             FROM \"order\" o
             JOIN address a ON a.id = o.address_id
             WHERE o.id = $1 AND a.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            "SELECT l.id, l.product_id, l.quantity, l.price, p.category, p.info
             FROM order_line l
             JOIN product p ON p.id = l.product_id
             WHERE l.order_id = $1
             ORDER BY l.id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let mut lines = Vec::with_capacity(line_rows.len());
        for row in &line_rows {
            lines.push(OrderLine {
                id: row.try_get("id")?,
                product_id: row.try_get("product_id")?,
                quantity: row.try_get("quantity")?,
                price: row.try_get("price")?,
                product: ProductSummary {
                    category: row.try_get("category")?,
                    info: row.try_get("info")?,
                },
            });
        }

        Ok(Some(map_order_row(&header, lines)?))
    }
}

/// Map an `"order"` header row plus assembled lines into the domain type.
fn map_order_row(row: &PgRow, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status: OrderStatus = status.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
    })?;

    Ok(Order {
        id: row.try_get("id")?,
        address_id: row.try_get("address_id")?,
        status,
        status_date: row.try_get("status_date")?,
        lines,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
