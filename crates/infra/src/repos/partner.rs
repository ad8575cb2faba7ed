use rust_decimal::Decimal;
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{PartnerAddressRow, PartnerRow, StockAlertRow, StockRecordRow, UserRow},
    pagination::LimitOffset,
};

#[derive(Debug, Clone)]
pub struct CreateStockRecordData {
    pub partner_id: Uuid,
    pub product_id: Uuid,
    pub partner_sku: String,
    pub price_currency: String,
    pub price: Decimal,
    pub num_in_stock: i32,
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateStockRecordData {
    pub price: Option<Decimal>,
    pub num_in_stock: Option<i32>,
    pub low_stock_threshold: Option<i32>,
}

// ── Partners ──

pub async fn list_partners<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<PartnerRow>> {
    sqlx::query_as::<_, PartnerRow>(
        r#"
        SELECT id, code, name
        FROM partners
        ORDER BY name ASC, code ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_partners<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM partners")
        .fetch_one(executor)
        .await
}

pub async fn get_partner<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<PartnerRow>> {
    sqlx::query_as::<_, PartnerRow>("SELECT id, code, name FROM partners WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn get_partners_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<PartnerRow>> {
    sqlx::query_as::<_, PartnerRow>(
        "SELECT id, code, name FROM partners WHERE id = ANY($1::uuid[])",
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn create_partner<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    code: &str,
) -> SqlxResult<PartnerRow> {
    sqlx::query_as::<_, PartnerRow>(
        r#"
        INSERT INTO partners (name, code)
        VALUES ($1, $2)
        RETURNING id, code, name
        "#,
    )
    .bind(name)
    .bind(code)
    .fetch_one(executor)
    .await
}

pub async fn update_partner<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    name: Option<&str>,
    code: Option<&str>,
) -> SqlxResult<Option<PartnerRow>> {
    sqlx::query_as::<_, PartnerRow>(
        r#"
        UPDATE partners
        SET name = COALESCE($2, name),
            code = COALESCE($3, code)
        WHERE id = $1
        RETURNING id, code, name
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(code)
    .fetch_optional(executor)
    .await
}

pub async fn list_partner_users<'e>(
    executor: impl PgExecutor<'e>,
    partner_id: Uuid,
) -> SqlxResult<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name, u.is_active,
               u.is_staff, u.date_joined
        FROM users u
        JOIN partner_users pu ON pu.user_id = u.id
        WHERE pu.partner_id = $1
        ORDER BY u.email ASC
        "#,
    )
    .bind(partner_id)
    .fetch_all(executor)
    .await
}

/// The partner's first address, if any.
pub async fn get_primary_address<'e>(
    executor: impl PgExecutor<'e>,
    partner_id: Uuid,
) -> SqlxResult<Option<PartnerAddressRow>> {
    sqlx::query_as::<_, PartnerAddressRow>(
        r#"
        SELECT id, partner_id, title, first_name, last_name, line1, line2, line3, line4,
               state, postcode, country_id
        FROM partner_addresses
        WHERE partner_id = $1
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .bind(partner_id)
    .fetch_optional(executor)
    .await
}

// ── Stock records ──

pub async fn list_stock_records<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<StockRecordRow>> {
    sqlx::query_as::<_, StockRecordRow>(
        r#"
        SELECT id, product_id, partner_id, partner_sku, price_currency, price, num_in_stock,
               num_allocated, low_stock_threshold, date_created, date_updated
        FROM stock_records
        ORDER BY date_created DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_stock_records<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM stock_records")
        .fetch_one(executor)
        .await
}

pub async fn get_stock_record<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<StockRecordRow>> {
    sqlx::query_as::<_, StockRecordRow>(
        r#"
        SELECT id, product_id, partner_id, partner_sku, price_currency, price, num_in_stock,
               num_allocated, low_stock_threshold, date_created, date_updated
        FROM stock_records
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_stock_records_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<StockRecordRow>> {
    sqlx::query_as::<_, StockRecordRow>(
        r#"
        SELECT id, product_id, partner_id, partner_sku, price_currency, price, num_in_stock,
               num_allocated, low_stock_threshold, date_created, date_updated
        FROM stock_records
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

/// Stock record used to price a product: the oldest one with a price.
pub async fn get_pricing_record_for_product<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<Option<StockRecordRow>> {
    sqlx::query_as::<_, StockRecordRow>(
        r#"
        SELECT id, product_id, partner_id, partner_sku, price_currency, price, num_in_stock,
               num_allocated, low_stock_threshold, date_created, date_updated
        FROM stock_records
        WHERE product_id = $1 AND price IS NOT NULL
        ORDER BY date_created ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(product_id)
    .fetch_optional(executor)
    .await
}

pub async fn create_stock_record<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateStockRecordData,
) -> SqlxResult<StockRecordRow> {
    sqlx::query_as::<_, StockRecordRow>(
        r#"
        INSERT INTO stock_records (partner_id, product_id, partner_sku, price_currency, price,
                                   num_in_stock, low_stock_threshold)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, product_id, partner_id, partner_sku, price_currency, price, num_in_stock,
                  num_allocated, low_stock_threshold, date_created, date_updated
        "#,
    )
    .bind(data.partner_id)
    .bind(data.product_id)
    .bind(&data.partner_sku)
    .bind(&data.price_currency)
    .bind(data.price)
    .bind(data.num_in_stock)
    .bind(data.low_stock_threshold)
    .fetch_one(executor)
    .await
}

pub async fn update_stock_record<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateStockRecordData,
) -> SqlxResult<Option<StockRecordRow>> {
    sqlx::query_as::<_, StockRecordRow>(
        r#"
        UPDATE stock_records
        SET price = COALESCE($2, price),
            num_in_stock = COALESCE($3, num_in_stock),
            low_stock_threshold = COALESCE($4, low_stock_threshold),
            date_updated = NOW()
        WHERE id = $1
        RETURNING id, product_id, partner_id, partner_sku, price_currency, price, num_in_stock,
                  num_allocated, low_stock_threshold, date_created, date_updated
        "#,
    )
    .bind(id)
    .bind(data.price)
    .bind(data.num_in_stock)
    .bind(data.low_stock_threshold)
    .fetch_optional(executor)
    .await
}

// ── Stock alerts ──

pub async fn list_stock_alerts<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<StockAlertRow>> {
    sqlx::query_as::<_, StockAlertRow>(
        r#"
        SELECT id, stockrecord_id, threshold, status, date_created, date_closed
        FROM stock_alerts
        ORDER BY date_created DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_stock_alerts<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM stock_alerts")
        .fetch_one(executor)
        .await
}

pub async fn get_stock_alert<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<StockAlertRow>> {
    sqlx::query_as::<_, StockAlertRow>(
        r#"
        SELECT id, stockrecord_id, threshold, status, date_created, date_closed
        FROM stock_alerts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_open_stock_alert<'e>(
    executor: impl PgExecutor<'e>,
    stockrecord_id: Uuid,
) -> SqlxResult<Option<StockAlertRow>> {
    sqlx::query_as::<_, StockAlertRow>(
        r#"
        SELECT id, stockrecord_id, threshold, status, date_created, date_closed
        FROM stock_alerts
        WHERE stockrecord_id = $1 AND status = 'Open'
        ORDER BY date_created DESC
        LIMIT 1
        "#,
    )
    .bind(stockrecord_id)
    .fetch_optional(executor)
    .await
}

pub async fn open_stock_alert<'e>(
    executor: impl PgExecutor<'e>,
    stockrecord_id: Uuid,
    threshold: i32,
) -> SqlxResult<StockAlertRow> {
    sqlx::query_as::<_, StockAlertRow>(
        r#"
        INSERT INTO stock_alerts (stockrecord_id, threshold)
        VALUES ($1, $2)
        RETURNING id, stockrecord_id, threshold, status, date_created, date_closed
        "#,
    )
    .bind(stockrecord_id)
    .bind(threshold)
    .fetch_one(executor)
    .await
}

pub async fn close_stock_alerts<'e>(
    executor: impl PgExecutor<'e>,
    stockrecord_id: Uuid,
) -> SqlxResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE stock_alerts
        SET status = 'Closed', date_closed = NOW()
        WHERE stockrecord_id = $1 AND status = 'Open'
        "#,
    )
    .bind(stockrecord_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
