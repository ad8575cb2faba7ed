use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{CountryRow, UserAddressRow},
    pagination::LimitOffset,
};

/// Full set of writable user address columns. Used for both insert and
/// update; the caller merges partial edits and recomputes the hash.
#[derive(Debug, Clone)]
pub struct UserAddressData {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    pub state: String,
    pub postcode: String,
    pub country_id: String,
    pub phone_number: Option<String>,
    pub notes: String,
    pub is_default_for_shipping: bool,
    pub is_default_for_billing: bool,
    pub hash: String,
}

impl UserAddressData {
    /// Fields that identify an address for duplicate detection.
    pub fn hash_fields(&self) -> [&str; 9] {
        [
            &self.first_name,
            &self.last_name,
            &self.line1,
            &self.line2,
            &self.line3,
            &self.line4,
            &self.state,
            &self.postcode,
            &self.country_id,
        ]
    }
}

impl From<UserAddressRow> for UserAddressData {
    fn from(row: UserAddressRow) -> Self {
        Self {
            title: row.title,
            first_name: row.first_name,
            last_name: row.last_name,
            line1: row.line1,
            line2: row.line2,
            line3: row.line3,
            line4: row.line4,
            state: row.state,
            postcode: row.postcode,
            country_id: row.country_id,
            phone_number: row.phone_number,
            notes: row.notes,
            is_default_for_shipping: row.is_default_for_shipping,
            is_default_for_billing: row.is_default_for_billing,
            hash: row.hash,
        }
    }
}

// ── Countries ──

pub async fn list_countries<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<CountryRow>> {
    sqlx::query_as::<_, CountryRow>(
        r#"
        SELECT iso_3166_1_a2, iso_3166_1_a3, iso_3166_1_numeric, printable_name, name,
               display_order, is_shipping_country
        FROM countries
        ORDER BY display_order DESC, name ASC, iso_3166_1_a2 ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_countries<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM countries")
        .fetch_one(executor)
        .await
}

pub async fn get_country<'e>(
    executor: impl PgExecutor<'e>,
    code: &str,
) -> SqlxResult<Option<CountryRow>> {
    sqlx::query_as::<_, CountryRow>(
        r#"
        SELECT iso_3166_1_a2, iso_3166_1_a3, iso_3166_1_numeric, printable_name, name,
               display_order, is_shipping_country
        FROM countries
        WHERE iso_3166_1_a2 = UPPER($1)
        "#,
    )
    .bind(code)
    .fetch_optional(executor)
    .await
}

pub async fn get_countries_by_codes<'e>(
    executor: impl PgExecutor<'e>,
    codes: &[String],
) -> SqlxResult<Vec<CountryRow>> {
    sqlx::query_as::<_, CountryRow>(
        r#"
        SELECT iso_3166_1_a2, iso_3166_1_a3, iso_3166_1_numeric, printable_name, name,
               display_order, is_shipping_country
        FROM countries
        WHERE iso_3166_1_a2 = ANY($1)
        "#,
    )
    .bind(codes)
    .fetch_all(executor)
    .await
}

// ── User addresses ──

pub async fn list_user_addresses<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<UserAddressRow>> {
    sqlx::query_as::<_, UserAddressRow>(
        r#"
        SELECT id, user_id, title, first_name, last_name, line1, line2, line3, line4, state,
               postcode, country_id, phone_number, notes, is_default_for_shipping,
               is_default_for_billing, num_orders_as_shipping_address,
               num_orders_as_billing_address, hash, date_created
        FROM user_addresses
        WHERE user_id = $1
        ORDER BY date_created DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_user_addresses<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_addresses WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
}

/// Fetch an address only if it belongs to `user_id`.
pub async fn get_user_address<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
) -> SqlxResult<Option<UserAddressRow>> {
    sqlx::query_as::<_, UserAddressRow>(
        r#"
        SELECT id, user_id, title, first_name, last_name, line1, line2, line3, line4, state,
               postcode, country_id, phone_number, notes, is_default_for_shipping,
               is_default_for_billing, num_orders_as_shipping_address,
               num_orders_as_billing_address, hash, date_created
        FROM user_addresses
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn create_user_address<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    data: &UserAddressData,
) -> SqlxResult<UserAddressRow> {
    sqlx::query_as::<_, UserAddressRow>(
        r#"
        INSERT INTO user_addresses (
            user_id, title, first_name, last_name, line1, line2, line3, line4, state,
            postcode, country_id, phone_number, notes, is_default_for_shipping,
            is_default_for_billing, hash
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING id, user_id, title, first_name, last_name, line1, line2, line3, line4, state,
                  postcode, country_id, phone_number, notes, is_default_for_shipping,
                  is_default_for_billing, num_orders_as_shipping_address,
                  num_orders_as_billing_address, hash, date_created
        "#,
    )
    .bind(user_id)
    .bind(&data.title)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.line1)
    .bind(&data.line2)
    .bind(&data.line3)
    .bind(&data.line4)
    .bind(&data.state)
    .bind(&data.postcode)
    .bind(&data.country_id)
    .bind(&data.phone_number)
    .bind(&data.notes)
    .bind(data.is_default_for_shipping)
    .bind(data.is_default_for_billing)
    .bind(&data.hash)
    .fetch_one(executor)
    .await
}

pub async fn update_user_address<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
    data: &UserAddressData,
) -> SqlxResult<Option<UserAddressRow>> {
    sqlx::query_as::<_, UserAddressRow>(
        r#"
        UPDATE user_addresses
        SET title = $3, first_name = $4, last_name = $5, line1 = $6, line2 = $7,
            line3 = $8, line4 = $9, state = $10, postcode = $11, country_id = $12,
            phone_number = $13, notes = $14, is_default_for_shipping = $15,
            is_default_for_billing = $16, hash = $17
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, first_name, last_name, line1, line2, line3, line4, state,
                  postcode, country_id, phone_number, notes, is_default_for_shipping,
                  is_default_for_billing, num_orders_as_shipping_address,
                  num_orders_as_billing_address, hash, date_created
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&data.title)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.line1)
    .bind(&data.line2)
    .bind(&data.line3)
    .bind(&data.line4)
    .bind(&data.state)
    .bind(&data.postcode)
    .bind(&data.country_id)
    .bind(&data.phone_number)
    .bind(&data.notes)
    .bind(data.is_default_for_shipping)
    .bind(data.is_default_for_billing)
    .bind(&data.hash)
    .fetch_optional(executor)
    .await
}

/// A user has at most one default shipping and one default billing address.
/// Clears the flags on every other address of the user.
pub async fn clear_other_defaults<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    keep_id: Uuid,
    shipping: bool,
    billing: bool,
) -> SqlxResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE user_addresses
        SET is_default_for_shipping = CASE WHEN $3 THEN FALSE ELSE is_default_for_shipping END,
            is_default_for_billing = CASE WHEN $4 THEN FALSE ELSE is_default_for_billing END
        WHERE user_id = $1 AND id <> $2
        "#,
    )
    .bind(user_id)
    .bind(keep_id)
    .bind(shipping)
    .bind(billing)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_user_address<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM user_addresses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
