use rust_decimal::Decimal;
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{CountryRow, OrderAndItemChargesRow, WeightBandRow, WeightBasedRow},
    pagination::LimitOffset,
};

#[derive(Debug, Clone)]
pub struct CreateOrderAndItemChargesData {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price_per_order: Decimal,
    pub price_per_item: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct CreateWeightBasedData {
    pub code: String,
    pub name: String,
    pub description: String,
    pub weight_attribute: String,
    pub default_weight: Decimal,
}

/// Which country table a method's availability is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    OrderAndItemCharges,
    WeightBased,
}

impl MethodKind {
    fn countries_table(&self) -> &'static str {
        match self {
            MethodKind::OrderAndItemCharges => "order_and_item_charges_countries",
            MethodKind::WeightBased => "weight_based_countries",
        }
    }
}

// ── Countries ──

pub async fn list_method_countries<'e>(
    executor: impl PgExecutor<'e>,
    kind: MethodKind,
    method_id: Uuid,
) -> SqlxResult<Vec<CountryRow>> {
    let sql = format!(
        r#"
        SELECT c.iso_3166_1_a2, c.iso_3166_1_a3, c.iso_3166_1_numeric, c.printable_name, c.name,
               c.display_order, c.is_shipping_country
        FROM countries c
        JOIN {} mc ON mc.country_id = c.iso_3166_1_a2
        WHERE mc.method_id = $1
        ORDER BY c.display_order DESC, c.name ASC
        "#,
        kind.countries_table()
    );

    sqlx::query_as::<_, CountryRow>(&sql)
        .bind(method_id)
        .fetch_all(executor)
        .await
}

pub async fn set_method_countries<'e>(
    executor: impl PgExecutor<'e>,
    kind: MethodKind,
    method_id: Uuid,
    country_codes: &[String],
) -> SqlxResult<u64> {
    let sql = format!(
        r#"
        INSERT INTO {} (method_id, country_id)
        SELECT $1, UPPER(code) FROM UNNEST($2::text[]) AS code
        ON CONFLICT DO NOTHING
        "#,
        kind.countries_table()
    );

    let result = sqlx::query(&sql)
        .bind(method_id)
        .bind(country_codes)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// ── Order and item charges ──

pub async fn list_order_and_item_charges<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<OrderAndItemChargesRow>> {
    sqlx::query_as::<_, OrderAndItemChargesRow>(
        r#"
        SELECT id, code, name, description, price_per_order, price_per_item,
               free_shipping_threshold
        FROM order_and_item_charges
        ORDER BY name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_order_and_item_charges<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_and_item_charges")
        .fetch_one(executor)
        .await
}

pub async fn get_order_and_item_charges<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<OrderAndItemChargesRow>> {
    sqlx::query_as::<_, OrderAndItemChargesRow>(
        r#"
        SELECT id, code, name, description, price_per_order, price_per_item,
               free_shipping_threshold
        FROM order_and_item_charges
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_order_and_item_charges<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateOrderAndItemChargesData,
) -> SqlxResult<OrderAndItemChargesRow> {
    sqlx::query_as::<_, OrderAndItemChargesRow>(
        r#"
        INSERT INTO order_and_item_charges (code, name, description, price_per_order,
                                            price_per_item, free_shipping_threshold)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, code, name, description, price_per_order, price_per_item,
                  free_shipping_threshold
        "#,
    )
    .bind(&data.code)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price_per_order)
    .bind(data.price_per_item)
    .bind(data.free_shipping_threshold)
    .fetch_one(executor)
    .await
}

// ── Weight based ──

pub async fn list_weight_based<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<WeightBasedRow>> {
    sqlx::query_as::<_, WeightBasedRow>(
        r#"
        SELECT w.id, w.code, w.name, w.description, w.weight_attribute, w.default_weight,
               (SELECT COUNT(*) FROM weight_bands b WHERE b.method_id = w.id) AS num_bands,
               (SELECT b.id FROM weight_bands b WHERE b.method_id = w.id
                ORDER BY b.upper_limit DESC LIMIT 1) AS top_band_id
        FROM weight_based w
        ORDER BY w.name ASC, w.id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_weight_based<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM weight_based")
        .fetch_one(executor)
        .await
}

pub async fn get_weight_based<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<WeightBasedRow>> {
    sqlx::query_as::<_, WeightBasedRow>(
        r#"
        SELECT w.id, w.code, w.name, w.description, w.weight_attribute, w.default_weight,
               (SELECT COUNT(*) FROM weight_bands b WHERE b.method_id = w.id) AS num_bands,
               (SELECT b.id FROM weight_bands b WHERE b.method_id = w.id
                ORDER BY b.upper_limit DESC LIMIT 1) AS top_band_id
        FROM weight_based w
        WHERE w.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_weight_based<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateWeightBasedData,
) -> SqlxResult<WeightBasedRow> {
    sqlx::query_as::<_, WeightBasedRow>(
        r#"
        INSERT INTO weight_based (code, name, description, weight_attribute, default_weight)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, code, name, description, weight_attribute, default_weight,
                  0::BIGINT AS num_bands, NULL::UUID AS top_band_id
        "#,
    )
    .bind(&data.code)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.weight_attribute)
    .bind(data.default_weight)
    .fetch_one(executor)
    .await
}

// ── Weight bands ──
// A band covers (weight_from, upper_limit], where weight_from is the upper
// limit of the next band down, or zero for the lightest band.

pub async fn list_bands_for_method<'e>(
    executor: impl PgExecutor<'e>,
    method_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<WeightBandRow>> {
    sqlx::query_as::<_, WeightBandRow>(
        r#"
        SELECT id, method_id, upper_limit, charge,
               COALESCE(LAG(upper_limit) OVER (ORDER BY upper_limit ASC), 0) AS weight_from
        FROM weight_bands
        WHERE method_id = $1
        ORDER BY upper_limit ASC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(method_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_bands_for_method<'e>(
    executor: impl PgExecutor<'e>,
    method_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM weight_bands WHERE method_id = $1")
        .bind(method_id)
        .fetch_one(executor)
        .await
}

pub async fn get_band<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<WeightBandRow>> {
    sqlx::query_as::<_, WeightBandRow>(
        r#"
        SELECT id, method_id, upper_limit, charge, weight_from
        FROM (
            SELECT id, method_id, upper_limit, charge,
                   COALESCE(LAG(upper_limit) OVER (PARTITION BY method_id ORDER BY upper_limit ASC), 0)
                       AS weight_from
            FROM weight_bands
            WHERE method_id = (SELECT method_id FROM weight_bands WHERE id = $1)
        ) bands
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_band<'e>(
    executor: impl PgExecutor<'e>,
    method_id: Uuid,
    upper_limit: Decimal,
    charge: Decimal,
) -> SqlxResult<Uuid> {
    sqlx::query_scalar(
        r#"
        INSERT INTO weight_bands (method_id, upper_limit, charge)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(method_id)
    .bind(upper_limit)
    .bind(charge)
    .fetch_one(executor)
    .await
}
