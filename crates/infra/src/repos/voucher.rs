use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    models::{ConditionalOfferRow, VoucherApplicationRow, VoucherRow, VoucherSetRow},
    pagination::LimitOffset,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherUsage {
    SingleUse,
    MultiUse,
    OncePerCustomer,
}

impl VoucherUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherUsage::SingleUse => "Single use",
            VoucherUsage::MultiUse => "Multi-use",
            VoucherUsage::OncePerCustomer => "Once per customer",
        }
    }
}

/// Accepts the stored labels as well as their SCREAMING_SNAKE spellings.
impl FromStr for VoucherUsage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "single use" => Ok(VoucherUsage::SingleUse),
            "multi use" => Ok(VoucherUsage::MultiUse),
            "once per customer" => Ok(VoucherUsage::OncePerCustomer),
            _ => Err(format!("Unknown voucher usage: {}", s)),
        }
    }
}

/// Voucher codes are stored and matched upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone)]
pub struct CreateVoucherData {
    pub name: String,
    pub code: String,
    pub usage: VoucherUsage,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub voucher_set_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateVoucherData {
    pub name: Option<String>,
    pub code: Option<String>,
    pub usage: Option<VoucherUsage>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
}

// ── Voucher sets ──

pub async fn list_voucher_sets<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<VoucherSetRow>> {
    sqlx::query_as::<_, VoucherSetRow>(
        r#"
        SELECT s.id, s.name, s.count, s.code_length, s.description, s.start_datetime,
               s.end_datetime, s.date_created,
               COALESCE(SUM(v.num_basket_additions), 0)::BIGINT AS num_basket_additions,
               COALESCE(SUM(v.num_orders), 0)::BIGINT AS num_orders,
               COALESCE(SUM(v.total_discount), 0) AS total_discount
        FROM voucher_sets s
        LEFT JOIN vouchers v ON v.voucher_set_id = s.id
        GROUP BY s.id
        ORDER BY s.date_created DESC, s.id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_voucher_sets<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM voucher_sets")
        .fetch_one(executor)
        .await
}

pub async fn get_voucher_set<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<VoucherSetRow>> {
    sqlx::query_as::<_, VoucherSetRow>(
        r#"
        SELECT s.id, s.name, s.count, s.code_length, s.description, s.start_datetime,
               s.end_datetime, s.date_created,
               COALESCE(SUM(v.num_basket_additions), 0)::BIGINT AS num_basket_additions,
               COALESCE(SUM(v.num_orders), 0)::BIGINT AS num_orders,
               COALESCE(SUM(v.total_discount), 0) AS total_discount
        FROM voucher_sets s
        LEFT JOIN vouchers v ON v.voucher_set_id = s.id
        WHERE s.id = $1
        GROUP BY s.id
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

// ── Vouchers ──

pub async fn list_vouchers<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<VoucherRow>> {
    sqlx::query_as::<_, VoucherRow>(
        r#"
        SELECT id, name, code, usage, start_datetime, end_datetime, num_basket_additions,
               num_orders, total_discount, voucher_set_id, date_created
        FROM vouchers
        ORDER BY date_created DESC, code ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_vouchers<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM vouchers")
        .fetch_one(executor)
        .await
}

pub async fn get_voucher<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<VoucherRow>> {
    sqlx::query_as::<_, VoucherRow>(
        r#"
        SELECT id, name, code, usage, start_datetime, end_datetime, num_basket_additions,
               num_orders, total_discount, voucher_set_id, date_created
        FROM vouchers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_voucher_by_code<'e>(
    executor: impl PgExecutor<'e>,
    code: &str,
) -> SqlxResult<Option<VoucherRow>> {
    sqlx::query_as::<_, VoucherRow>(
        r#"
        SELECT id, name, code, usage, start_datetime, end_datetime, num_basket_additions,
               num_orders, total_discount, voucher_set_id, date_created
        FROM vouchers
        WHERE code = $1
        "#,
    )
    .bind(normalize_code(code))
    .fetch_optional(executor)
    .await
}

pub async fn create_voucher<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateVoucherData,
) -> SqlxResult<VoucherRow> {
    sqlx::query_as::<_, VoucherRow>(
        r#"
        INSERT INTO vouchers (name, code, usage, start_datetime, end_datetime, voucher_set_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, code, usage, start_datetime, end_datetime, num_basket_additions,
                  num_orders, total_discount, voucher_set_id, date_created
        "#,
    )
    .bind(&data.name)
    .bind(normalize_code(&data.code))
    .bind(data.usage.as_str())
    .bind(data.start_datetime)
    .bind(data.end_datetime)
    .bind(data.voucher_set_id)
    .fetch_one(executor)
    .await
}

pub async fn update_voucher<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateVoucherData,
) -> SqlxResult<Option<VoucherRow>> {
    sqlx::query_as::<_, VoucherRow>(
        r#"
        UPDATE vouchers
        SET name = COALESCE($2, name),
            code = COALESCE($3, code),
            usage = COALESCE($4, usage),
            start_datetime = COALESCE($5, start_datetime),
            end_datetime = COALESCE($6, end_datetime)
        WHERE id = $1
        RETURNING id, name, code, usage, start_datetime, end_datetime, num_basket_additions,
                  num_orders, total_discount, voucher_set_id, date_created
        "#,
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.code.as_deref().map(normalize_code))
    .bind(data.usage.map(|u| u.as_str()))
    .bind(data.start_datetime)
    .bind(data.end_datetime)
    .fetch_optional(executor)
    .await
}

pub async fn delete_voucher<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM vouchers WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_voucher_offers<'e>(
    executor: impl PgExecutor<'e>,
    voucher_id: Uuid,
) -> SqlxResult<Vec<ConditionalOfferRow>> {
    sqlx::query_as::<_, ConditionalOfferRow>(
        r#"
        SELECT o.id, o.name, o.slug, o.description, o.offer_type, o.exclusive, o.status,
               o.condition_id, o.benefit_id, o.priority, o.start_datetime, o.end_datetime,
               o.max_global_applications, o.max_user_applications, o.max_basket_applications,
               o.max_discount, o.total_discount, o.num_applications, o.num_orders,
               o.redirect_url, o.date_created
        FROM conditional_offers o
        JOIN voucher_offers vo ON vo.offer_id = o.id
        WHERE vo.voucher_id = $1
        ORDER BY o.priority DESC
        "#,
    )
    .bind(voucher_id)
    .fetch_all(executor)
    .await
}

// ── Applications ──

pub async fn list_applications<'e>(
    executor: impl PgExecutor<'e>,
    voucher_id: Option<Uuid>,
    page: LimitOffset,
) -> SqlxResult<Vec<VoucherApplicationRow>> {
    sqlx::query_as::<_, VoucherApplicationRow>(
        r#"
        SELECT id, voucher_id, user_id, order_id, date_created
        FROM voucher_applications
        WHERE ($1::uuid IS NULL OR voucher_id = $1)
        ORDER BY date_created DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(voucher_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_applications<'e>(
    executor: impl PgExecutor<'e>,
    voucher_id: Option<Uuid>,
) -> SqlxResult<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM voucher_applications WHERE ($1::uuid IS NULL OR voucher_id = $1)",
    )
    .bind(voucher_id)
    .fetch_one(executor)
    .await
}

pub async fn create_application<'e>(
    executor: impl PgExecutor<'e>,
    voucher_id: Uuid,
    order_id: Uuid,
    user_id: Option<Uuid>,
) -> SqlxResult<VoucherApplicationRow> {
    sqlx::query_as::<_, VoucherApplicationRow>(
        r#"
        INSERT INTO voucher_applications (voucher_id, order_id, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, voucher_id, user_id, order_id, date_created
        "#,
    )
    .bind(voucher_id)
    .bind(order_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

/// An application counts as one more order placed with the voucher.
pub async fn record_voucher_order<'e>(executor: impl PgExecutor<'e>, voucher_id: Uuid) -> SqlxResult<()> {
    sqlx::query("UPDATE vouchers SET num_orders = num_orders + 1 WHERE id = $1")
        .bind(voucher_id)
        .execute(executor)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accepts_labels_and_enum_spellings() {
        assert_eq!("Single use".parse(), Ok(VoucherUsage::SingleUse));
        assert_eq!("MULTI_USE".parse(), Ok(VoucherUsage::MultiUse));
        assert_eq!("Multi-use".parse(), Ok(VoucherUsage::MultiUse));
        assert_eq!(
            "once per customer".parse(),
            Ok(VoucherUsage::OncePerCustomer)
        );
        assert!("sometimes".parse::<VoucherUsage>().is_err());
    }

    #[test]
    fn codes_are_trimmed_and_upper_cased() {
        assert_eq!(normalize_code("  spring10 "), "SPRING10");
    }
}
