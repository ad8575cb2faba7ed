use rust_decimal::Decimal;
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{BenefitRow, ConditionRow, ConditionalOfferRow, RangeProductRow, RangeRow},
    pagination::LimitOffset,
};

pub const CONDITION_TYPES: &[&str] = &["Count", "Value", "Coverage"];
pub const BENEFIT_TYPES: &[&str] = &[
    "Percentage",
    "Absolute",
    "Multibuy",
    "Fixed price",
    "Shipping absolute",
    "Shipping fixed price",
    "Shipping percentage",
];

#[derive(Debug, Clone)]
pub struct CreateOfferData {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub offer_type: String,
    pub condition_id: Uuid,
    pub benefit_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOfferData {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub offer_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateRangeData {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_public: bool,
}

/// Shared by conditions and benefits.
#[derive(Debug, Clone)]
pub struct CreateRuleData {
    pub range_id: Option<Uuid>,
    pub rule_type: String,
    pub value: Option<Decimal>,
    pub max_affected_items: Option<i32>,
}

// ── Offers ──

pub async fn list_offers<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<ConditionalOfferRow>> {
    sqlx::query_as::<_, ConditionalOfferRow>(
        r#"
        SELECT id, name, slug, description, offer_type, exclusive, status, condition_id,
               benefit_id, priority, start_datetime, end_datetime, max_global_applications,
               max_user_applications, max_basket_applications, max_discount, total_discount,
               num_applications, num_orders, redirect_url, date_created
        FROM conditional_offers
        ORDER BY priority DESC, date_created DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_offers<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM conditional_offers")
        .fetch_one(executor)
        .await
}

pub async fn get_offer<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ConditionalOfferRow>> {
    sqlx::query_as::<_, ConditionalOfferRow>(
        r#"
        SELECT id, name, slug, description, offer_type, exclusive, status, condition_id,
               benefit_id, priority, start_datetime, end_datetime, max_global_applications,
               max_user_applications, max_basket_applications, max_discount, total_discount,
               num_applications, num_orders, redirect_url, date_created
        FROM conditional_offers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_offer<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateOfferData,
) -> SqlxResult<ConditionalOfferRow> {
    sqlx::query_as::<_, ConditionalOfferRow>(
        r#"
        INSERT INTO conditional_offers (name, slug, description, offer_type, condition_id, benefit_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, slug, description, offer_type, exclusive, status, condition_id,
                  benefit_id, priority, start_datetime, end_datetime, max_global_applications,
                  max_user_applications, max_basket_applications, max_discount, total_discount,
                  num_applications, num_orders, redirect_url, date_created
        "#,
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(&data.offer_type)
    .bind(data.condition_id)
    .bind(data.benefit_id)
    .fetch_one(executor)
    .await
}

pub async fn update_offer<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateOfferData,
) -> SqlxResult<Option<ConditionalOfferRow>> {
    sqlx::query_as::<_, ConditionalOfferRow>(
        r#"
        UPDATE conditional_offers
        SET name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            offer_type = COALESCE($5, offer_type)
        WHERE id = $1
        RETURNING id, name, slug, description, offer_type, exclusive, status, condition_id,
                  benefit_id, priority, start_datetime, end_datetime, max_global_applications,
                  max_user_applications, max_basket_applications, max_discount, total_discount,
                  num_applications, num_orders, redirect_url, date_created
        "#,
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(&data.offer_type)
    .fetch_optional(executor)
    .await
}

pub async fn delete_offer<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM conditional_offers WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Conditions ──

pub async fn list_conditions<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<ConditionRow>> {
    sqlx::query_as::<_, ConditionRow>(
        r#"
        SELECT id, range_id, type, value, proxy_class
        FROM conditions
        ORDER BY id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_conditions<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM conditions")
        .fetch_one(executor)
        .await
}

pub async fn get_condition<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ConditionRow>> {
    sqlx::query_as::<_, ConditionRow>(
        "SELECT id, range_id, type, value, proxy_class FROM conditions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_condition<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateRuleData,
) -> SqlxResult<ConditionRow> {
    sqlx::query_as::<_, ConditionRow>(
        r#"
        INSERT INTO conditions (range_id, type, value)
        VALUES ($1, $2, $3)
        RETURNING id, range_id, type, value, proxy_class
        "#,
    )
    .bind(data.range_id)
    .bind(&data.rule_type)
    .bind(data.value)
    .fetch_one(executor)
    .await
}

// ── Benefits ──

pub async fn list_benefits<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<BenefitRow>> {
    sqlx::query_as::<_, BenefitRow>(
        r#"
        SELECT id, range_id, type, value, max_affected_items, proxy_class
        FROM benefits
        ORDER BY id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_benefits<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM benefits")
        .fetch_one(executor)
        .await
}

pub async fn get_benefit<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BenefitRow>> {
    sqlx::query_as::<_, BenefitRow>(
        r#"
        SELECT id, range_id, type, value, max_affected_items, proxy_class
        FROM benefits
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_benefit<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateRuleData,
) -> SqlxResult<BenefitRow> {
    sqlx::query_as::<_, BenefitRow>(
        r#"
        INSERT INTO benefits (range_id, type, value, max_affected_items)
        VALUES ($1, $2, $3, $4)
        RETURNING id, range_id, type, value, max_affected_items, proxy_class
        "#,
    )
    .bind(data.range_id)
    .bind(&data.rule_type)
    .bind(data.value)
    .bind(data.max_affected_items)
    .fetch_one(executor)
    .await
}

// ── Ranges ──

pub async fn list_ranges<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<RangeRow>> {
    sqlx::query_as::<_, RangeRow>(
        r#"
        SELECT id, name, slug, description, is_public, includes_all_products, date_created
        FROM ranges
        ORDER BY name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_ranges<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ranges")
        .fetch_one(executor)
        .await
}

pub async fn get_range<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<RangeRow>> {
    sqlx::query_as::<_, RangeRow>(
        r#"
        SELECT id, name, slug, description, is_public, includes_all_products, date_created
        FROM ranges
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_range<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateRangeData,
) -> SqlxResult<RangeRow> {
    sqlx::query_as::<_, RangeRow>(
        r#"
        INSERT INTO ranges (name, slug, description, is_public)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, slug, description, is_public, includes_all_products, date_created
        "#,
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(data.is_public)
    .fetch_one(executor)
    .await
}

pub async fn list_range_products<'e>(
    executor: impl PgExecutor<'e>,
    range_id: Uuid,
) -> SqlxResult<Vec<RangeProductRow>> {
    sqlx::query_as::<_, RangeProductRow>(
        r#"
        SELECT id, range_id, product_id, display_order
        FROM range_products
        WHERE range_id = $1
        ORDER BY display_order ASC, id ASC
        "#,
    )
    .bind(range_id)
    .fetch_all(executor)
    .await
}

/// Adding a product already in the range is a no-op.
pub async fn add_product_to_range<'e>(
    executor: impl PgExecutor<'e>,
    range_id: Uuid,
    product_id: Uuid,
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        INSERT INTO range_products (range_id, product_id, display_order)
        VALUES ($1, $2, (SELECT COALESCE(MAX(display_order) + 1, 0) FROM range_products WHERE range_id = $1))
        ON CONFLICT (range_id, product_id) DO NOTHING
        "#,
    )
    .bind(range_id)
    .bind(product_id)
    .execute(executor)
    .await?;

    Ok(())
}
