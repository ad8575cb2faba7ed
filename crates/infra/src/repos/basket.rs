use rust_decimal::Decimal;
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{BasketLineRow, BasketRow, BasketTotalsRow, LineAttributeRow, VoucherRow},
    pagination::LimitOffset,
};

#[derive(Debug, Clone)]
pub struct AddLineData {
    pub basket_id: Uuid,
    pub product_id: Uuid,
    pub stockrecord_id: Uuid,
    pub quantity: i32,
    pub price_currency: String,
    pub price_excl_tax: Option<Decimal>,
    pub price_incl_tax: Option<Decimal>,
}

impl AddLineData {
    /// Lines are unique per product and stock record within a basket.
    pub fn line_reference(&self) -> String {
        format!("{}_{}", self.product_id, self.stockrecord_id)
    }
}

// ── Baskets ──

pub async fn list_baskets<'e>(
    executor: impl PgExecutor<'e>,
    owner_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<BasketRow>> {
    sqlx::query_as::<_, BasketRow>(
        r#"
        SELECT id, owner_id, status, date_created, date_merged, date_submitted
        FROM baskets
        WHERE owner_id = $1
        ORDER BY date_created DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_baskets<'e>(executor: impl PgExecutor<'e>, owner_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM baskets WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(executor)
        .await
}

/// Fetch a basket only if it belongs to `owner_id`.
pub async fn get_basket<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    owner_id: Uuid,
) -> SqlxResult<Option<BasketRow>> {
    sqlx::query_as::<_, BasketRow>(
        r#"
        SELECT id, owner_id, status, date_created, date_merged, date_submitted
        FROM baskets
        WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_basket_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BasketRow>> {
    sqlx::query_as::<_, BasketRow>(
        r#"
        SELECT id, owner_id, status, date_created, date_merged, date_submitted
        FROM baskets
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Return the owner's open basket, creating it when there is none.
///
/// The no-op update on conflict makes the statement return the existing row
/// even when a concurrent transaction created it after our snapshot.
pub async fn get_or_create_open_basket<'e>(
    executor: impl PgExecutor<'e>,
    owner_id: Uuid,
) -> SqlxResult<BasketRow> {
    sqlx::query_as::<_, BasketRow>(
        r#"
        INSERT INTO baskets (owner_id, status)
        VALUES ($1, 'Open')
        ON CONFLICT (owner_id) WHERE status = 'Open'
            DO UPDATE SET status = EXCLUDED.status
        RETURNING id, owner_id, status, date_created, date_merged, date_submitted
        "#,
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await
}

pub async fn basket_totals<'e>(
    executor: impl PgExecutor<'e>,
    basket_id: Uuid,
) -> SqlxResult<BasketTotalsRow> {
    sqlx::query_as::<_, BasketTotalsRow>(
        r#"
        SELECT COUNT(l.id) AS num_lines,
               COALESCE(SUM(l.quantity), 0)::BIGINT AS num_items,
               COALESCE(SUM(l.quantity * l.price_excl_tax), 0) AS total_excl_tax,
               COALESCE(SUM(l.quantity * l.price_incl_tax), 0) AS total_incl_tax,
               COALESCE(BOOL_OR(COALESCE(pc.requires_shipping, TRUE)), FALSE) AS is_shipping_required
        FROM basket_lines l
        JOIN products p ON p.id = l.product_id
        LEFT JOIN product_classes pc ON pc.id = p.product_class_id
        WHERE l.basket_id = $1
        "#,
    )
    .bind(basket_id)
    .fetch_one(executor)
    .await
}

pub async fn list_basket_vouchers<'e>(
    executor: impl PgExecutor<'e>,
    basket_id: Uuid,
) -> SqlxResult<Vec<VoucherRow>> {
    sqlx::query_as::<_, VoucherRow>(
        r#"
        SELECT v.id, v.name, v.code, v.usage, v.start_datetime, v.end_datetime,
               v.num_basket_additions, v.num_orders, v.total_discount, v.voucher_set_id,
               v.date_created
        FROM vouchers v
        JOIN basket_vouchers bv ON bv.voucher_id = v.id
        WHERE bv.basket_id = $1
        ORDER BY v.code ASC
        "#,
    )
    .bind(basket_id)
    .fetch_all(executor)
    .await
}

// ── Lines ──

pub async fn list_lines<'e>(
    executor: impl PgExecutor<'e>,
    owner_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<BasketLineRow>> {
    sqlx::query_as::<_, BasketLineRow>(
        r#"
        SELECT l.id, l.basket_id, l.line_reference, l.product_id, l.stockrecord_id, l.quantity,
               l.price_currency, l.price_excl_tax, l.price_incl_tax, l.tax_code,
               l.date_created, l.date_updated
        FROM basket_lines l
        JOIN baskets b ON b.id = l.basket_id
        WHERE b.owner_id = $1
        ORDER BY l.date_created DESC, l.id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_lines<'e>(executor: impl PgExecutor<'e>, owner_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM basket_lines l
        JOIN baskets b ON b.id = l.basket_id
        WHERE b.owner_id = $1
        "#,
    )
    .bind(owner_id)
    .fetch_one(executor)
    .await
}

/// Fetch a line only if its basket belongs to `owner_id`.
pub async fn get_line<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    owner_id: Uuid,
) -> SqlxResult<Option<BasketLineRow>> {
    sqlx::query_as::<_, BasketLineRow>(
        r#"
        SELECT l.id, l.basket_id, l.line_reference, l.product_id, l.stockrecord_id, l.quantity,
               l.price_currency, l.price_excl_tax, l.price_incl_tax, l.tax_code,
               l.date_created, l.date_updated
        FROM basket_lines l
        JOIN baskets b ON b.id = l.basket_id
        WHERE l.id = $1 AND b.owner_id = $2
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_line_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BasketLineRow>> {
    sqlx::query_as::<_, BasketLineRow>(
        r#"
        SELECT id, basket_id, line_reference, product_id, stockrecord_id, quantity,
               price_currency, price_excl_tax, price_incl_tax, tax_code, date_created,
               date_updated
        FROM basket_lines
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_lines_for_basket<'e>(
    executor: impl PgExecutor<'e>,
    basket_id: Uuid,
) -> SqlxResult<Vec<BasketLineRow>> {
    sqlx::query_as::<_, BasketLineRow>(
        r#"
        SELECT id, basket_id, line_reference, product_id, stockrecord_id, quantity,
               price_currency, price_excl_tax, price_incl_tax, tax_code, date_created,
               date_updated
        FROM basket_lines
        WHERE basket_id = $1
        ORDER BY date_created ASC, id ASC
        "#,
    )
    .bind(basket_id)
    .fetch_all(executor)
    .await
}

/// Insert a line, or merge the quantity into the line with the same reference.
pub async fn add_line<'e>(
    executor: impl PgExecutor<'e>,
    data: AddLineData,
) -> SqlxResult<BasketLineRow> {
    sqlx::query_as::<_, BasketLineRow>(
        r#"
        INSERT INTO basket_lines (basket_id, line_reference, product_id, stockrecord_id,
                                  quantity, price_currency, price_excl_tax, price_incl_tax)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (basket_id, line_reference) DO UPDATE
            SET quantity = basket_lines.quantity + EXCLUDED.quantity,
                price_excl_tax = EXCLUDED.price_excl_tax,
                price_incl_tax = EXCLUDED.price_incl_tax,
                date_updated = NOW()
        RETURNING id, basket_id, line_reference, product_id, stockrecord_id, quantity,
                  price_currency, price_excl_tax, price_incl_tax, tax_code, date_created,
                  date_updated
        "#,
    )
    .bind(data.basket_id)
    .bind(data.line_reference())
    .bind(data.product_id)
    .bind(data.stockrecord_id)
    .bind(data.quantity)
    .bind(&data.price_currency)
    .bind(data.price_excl_tax)
    .bind(data.price_incl_tax)
    .fetch_one(executor)
    .await
}

pub async fn update_line_quantity<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    quantity: i32,
) -> SqlxResult<Option<BasketLineRow>> {
    sqlx::query_as::<_, BasketLineRow>(
        r#"
        UPDATE basket_lines
        SET quantity = $2, date_updated = NOW()
        WHERE id = $1
        RETURNING id, basket_id, line_reference, product_id, stockrecord_id, quantity,
                  price_currency, price_excl_tax, price_incl_tax, tax_code, date_created,
                  date_updated
        "#,
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(executor)
    .await
}

pub async fn delete_line<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM basket_lines WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_line_attributes<'e>(
    executor: impl PgExecutor<'e>,
    line_id: Uuid,
) -> SqlxResult<Vec<LineAttributeRow>> {
    sqlx::query_as::<_, LineAttributeRow>(
        r#"
        SELECT id, line_id, option_id, value
        FROM basket_line_attributes
        WHERE line_id = $1
        "#,
    )
    .bind(line_id)
    .fetch_all(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_reference_joins_product_and_stock_record() {
        let product_id = Uuid::new_v4();
        let stockrecord_id = Uuid::new_v4();
        let data = AddLineData {
            basket_id: Uuid::new_v4(),
            product_id,
            stockrecord_id,
            quantity: 1,
            price_currency: "GBP".to_string(),
            price_excl_tax: None,
            price_incl_tax: None,
        };

        assert_eq!(data.line_reference(), format!("{product_id}_{stockrecord_id}"));
    }
}
