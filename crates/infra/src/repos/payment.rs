use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{BankcardRow, SourceRow, SourceTypeRow, TransactionRow},
    pagination::LimitOffset,
};

#[derive(Debug, Clone)]
pub struct CreateTransactionData {
    pub source_id: Uuid,
    pub txn_type: String,
    pub amount: Decimal,
    pub reference: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct CreateSourceData {
    pub order_id: Uuid,
    pub source_type_id: Uuid,
    pub currency: String,
    pub amount_allocated: Decimal,
    pub reference: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct CreateBankcardData {
    pub user_id: Uuid,
    pub card_type: String,
    pub name: String,
    /// Already obfuscated; full card numbers are never stored.
    pub number: String,
    pub expiry_date: NaiveDate,
    pub partner_reference: String,
}

/// Keep only the last four digits: `XXXX-XXXX-XXXX-1234`.
/// `None` when the number has fewer than four digits.
pub fn obfuscate_card_number(number: &str) -> Option<String> {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }
    let last4: String = digits[digits.len() - 4..].iter().collect();
    Some(format!("XXXX-XXXX-XXXX-{}", last4))
}

/// Parse a card expiry given as `MM/YY`, `MM/YYYY` or an ISO date.
/// Month-only forms resolve to the last day of that month.
pub fn parse_card_expiry(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    let (month, year) = value.split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let year = year.trim();
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), month + 1, 1)?
    };
    next_month.pred_opt()
}

// ── Transactions ──

pub async fn list_transactions<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, source_id, txn_type, amount, reference, status, date_created
        FROM transactions
        ORDER BY date_created DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_transactions<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(executor)
        .await
}

pub async fn get_transaction<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, source_id, txn_type, amount, reference, status, date_created
        FROM transactions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_transaction<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateTransactionData,
) -> SqlxResult<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions (source_id, txn_type, amount, reference, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, source_id, txn_type, amount, reference, status, date_created
        "#,
    )
    .bind(data.source_id)
    .bind(&data.txn_type)
    .bind(data.amount)
    .bind(&data.reference)
    .bind(&data.status)
    .fetch_one(executor)
    .await
}

// ── Sources ──

pub async fn list_sources<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<SourceRow>> {
    sqlx::query_as::<_, SourceRow>(
        r#"
        SELECT id, order_id, source_type_id, currency, amount_allocated, amount_debited,
               amount_refunded, reference, label
        FROM sources
        ORDER BY order_id ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_sources<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM sources")
        .fetch_one(executor)
        .await
}

pub async fn get_source<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<SourceRow>> {
    sqlx::query_as::<_, SourceRow>(
        r#"
        SELECT id, order_id, source_type_id, currency, amount_allocated, amount_debited,
               amount_refunded, reference, label
        FROM sources
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_source<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateSourceData,
) -> SqlxResult<SourceRow> {
    sqlx::query_as::<_, SourceRow>(
        r#"
        INSERT INTO sources (order_id, source_type_id, currency, amount_allocated, reference, label)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, order_id, source_type_id, currency, amount_allocated, amount_debited,
                  amount_refunded, reference, label
        "#,
    )
    .bind(data.order_id)
    .bind(data.source_type_id)
    .bind(&data.currency)
    .bind(data.amount_allocated)
    .bind(&data.reference)
    .bind(&data.label)
    .fetch_one(executor)
    .await
}

// ── Source types ──

pub async fn list_source_types<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<SourceTypeRow>> {
    sqlx::query_as::<_, SourceTypeRow>(
        r#"
        SELECT id, name, code
        FROM source_types
        ORDER BY name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_source_types<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM source_types")
        .fetch_one(executor)
        .await
}

pub async fn get_source_type<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<SourceTypeRow>> {
    sqlx::query_as::<_, SourceTypeRow>("SELECT id, name, code FROM source_types WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create_source_type<'e>(
    executor: impl PgExecutor<'e>,
    name: &str,
    code: &str,
) -> SqlxResult<SourceTypeRow> {
    sqlx::query_as::<_, SourceTypeRow>(
        r#"
        INSERT INTO source_types (name, code)
        VALUES ($1, $2)
        RETURNING id, name, code
        "#,
    )
    .bind(name)
    .bind(code)
    .fetch_one(executor)
    .await
}

// ── Bankcards ──

pub async fn list_bankcards<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<BankcardRow>> {
    sqlx::query_as::<_, BankcardRow>(
        r#"
        SELECT id, user_id, card_type, name, number, expiry_date, partner_reference
        FROM bankcards
        ORDER BY expiry_date DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_bankcards<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bankcards")
        .fetch_one(executor)
        .await
}

pub async fn get_bankcard<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BankcardRow>> {
    sqlx::query_as::<_, BankcardRow>(
        r#"
        SELECT id, user_id, card_type, name, number, expiry_date, partner_reference
        FROM bankcards
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_bankcard<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateBankcardData,
) -> SqlxResult<BankcardRow> {
    sqlx::query_as::<_, BankcardRow>(
        r#"
        INSERT INTO bankcards (user_id, card_type, name, number, expiry_date, partner_reference)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, card_type, name, number, expiry_date, partner_reference
        "#,
    )
    .bind(data.user_id)
    .bind(&data.card_type)
    .bind(&data.name)
    .bind(&data.number)
    .bind(data.expiry_date)
    .bind(&data.partner_reference)
    .fetch_one(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_numbers_keep_last_four_digits() {
        assert_eq!(
            obfuscate_card_number("4111 1111 1111 1234").as_deref(),
            Some("XXXX-XXXX-XXXX-1234")
        );
        assert_eq!(
            obfuscate_card_number("4111-1111-1111-9876").as_deref(),
            Some("XXXX-XXXX-XXXX-9876")
        );
    }

    #[test]
    fn card_numbers_need_four_digits() {
        assert_eq!(obfuscate_card_number("12"), None);
        assert_eq!(obfuscate_card_number("no digits"), None);
        assert_eq!(obfuscate_card_number("x1x2x3x4").as_deref(), Some("XXXX-XXXX-XXXX-1234"));
    }

    #[test]
    fn expiry_resolves_to_end_of_month() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);

        assert_eq!(parse_card_expiry("02/28"), date(2028, 2, 29));
        assert_eq!(parse_card_expiry("12/2030"), date(2030, 12, 31));
        assert_eq!(parse_card_expiry("2027-06-15"), date(2027, 6, 15));
        assert_eq!(parse_card_expiry("13/28"), None);
        assert_eq!(parse_card_expiry("1/2"), None);
        assert_eq!(parse_card_expiry("soon"), None);
    }
}
