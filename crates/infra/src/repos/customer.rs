use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{ProductAlertRow, UserRow},
    pagination::LimitOffset,
};

pub const ALERT_KEY_LENGTH: usize = 40;
pub const ALERT_STATUS_UNCONFIRMED: &str = "Unconfirmed";
pub const ALERT_STATUS_ACTIVE: &str = "Active";

#[derive(Debug, Clone)]
pub struct CreateUserData {
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserData {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CreateProductAlertData {
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub key: String,
    pub status: String,
}

// ── Users ──

pub async fn list_users<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, first_name, last_name, is_active, is_staff, date_joined
        FROM users
        ORDER BY date_joined DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_users<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await
}

pub async fn get_user<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, first_name, last_name, is_active, is_staff, date_joined
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_users_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, first_name, last_name, is_active, is_staff, date_joined
        FROM users
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

/// Emails are matched case-insensitively.
pub async fn get_user_by_email<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> SqlxResult<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, first_name, last_name, is_active, is_staff, date_joined
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn create_user<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateUserData,
) -> SqlxResult<UserRow> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, password_hash, first_name, last_name, is_active, is_staff, date_joined
        "#,
    )
    .bind(&data.email)
    .bind(&data.password_hash)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .fetch_one(executor)
    .await
}

pub async fn update_user<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateUserData,
) -> SqlxResult<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            is_active = COALESCE($5, is_active)
        WHERE id = $1
        RETURNING id, email, password_hash, first_name, last_name, is_active, is_staff, date_joined
        "#,
    )
    .bind(id)
    .bind(&data.email)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(data.is_active)
    .fetch_optional(executor)
    .await
}

pub async fn delete_user<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Product alerts ──

pub async fn list_product_alerts<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Option<Uuid>,
    page: LimitOffset,
) -> SqlxResult<Vec<ProductAlertRow>> {
    sqlx::query_as::<_, ProductAlertRow>(
        r#"
        SELECT id, product_id, user_id, email, key, status, date_created, date_confirmed,
               date_cancelled, date_closed
        FROM product_alerts
        WHERE ($1::uuid IS NULL OR user_id = $1)
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

pub async fn count_product_alerts<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Option<Uuid>,
) -> SqlxResult<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM product_alerts WHERE ($1::uuid IS NULL OR user_id = $1)",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn get_product_alert<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ProductAlertRow>> {
    sqlx::query_as::<_, ProductAlertRow>(
        r#"
        SELECT id, product_id, user_id, email, key, status, date_created, date_confirmed,
               date_cancelled, date_closed
        FROM product_alerts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_product_alert<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateProductAlertData,
) -> SqlxResult<ProductAlertRow> {
    sqlx::query_as::<_, ProductAlertRow>(
        r#"
        INSERT INTO product_alerts (product_id, user_id, email, key, status, date_confirmed)
        VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 = 'Active' THEN NOW() END)
        RETURNING id, product_id, user_id, email, key, status, date_created, date_confirmed,
                  date_cancelled, date_closed
        "#,
    )
    .bind(data.product_id)
    .bind(data.user_id)
    .bind(&data.email)
    .bind(&data.key)
    .bind(&data.status)
    .fetch_one(executor)
    .await
}

pub async fn cancel_product_alert<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ProductAlertRow>> {
    sqlx::query_as::<_, ProductAlertRow>(
        r#"
        UPDATE product_alerts
        SET status = 'Cancelled', date_cancelled = NOW()
        WHERE id = $1
        RETURNING id, product_id, user_id, email, key, status, date_created, date_confirmed,
                  date_cancelled, date_closed
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
