use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{ProductRecordRow, UserProductViewRow, UserRecordRow, UserSearchRow},
    pagination::LimitOffset,
};

// ── Product records ──

pub async fn list_product_records<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<ProductRecordRow>> {
    sqlx::query_as::<_, ProductRecordRow>(
        r#"
        SELECT id, product_id, num_views, num_basket_additions, num_purchases, score
        FROM product_records
        ORDER BY score DESC, num_views DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_product_records<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM product_records")
        .fetch_one(executor)
        .await
}

pub async fn get_product_record<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ProductRecordRow>> {
    sqlx::query_as::<_, ProductRecordRow>(
        r#"
        SELECT id, product_id, num_views, num_basket_additions, num_purchases, score
        FROM product_records
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Bump the view counter of a product, creating its record on first view.
pub async fn record_product_view<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<ProductRecordRow> {
    sqlx::query_as::<_, ProductRecordRow>(
        r#"
        INSERT INTO product_records (product_id, num_views)
        VALUES ($1, 1)
        ON CONFLICT (product_id) DO UPDATE SET num_views = product_records.num_views + 1
        RETURNING id, product_id, num_views, num_basket_additions, num_purchases, score
        "#,
    )
    .bind(product_id)
    .fetch_one(executor)
    .await
}

pub async fn record_product_basket_addition<'e>(
    executor: impl PgExecutor<'e>,
    product_id: Uuid,
) -> SqlxResult<ProductRecordRow> {
    sqlx::query_as::<_, ProductRecordRow>(
        r#"
        INSERT INTO product_records (product_id, num_basket_additions)
        VALUES ($1, 1)
        ON CONFLICT (product_id)
            DO UPDATE SET num_basket_additions = product_records.num_basket_additions + 1
        RETURNING id, product_id, num_views, num_basket_additions, num_purchases, score
        "#,
    )
    .bind(product_id)
    .fetch_one(executor)
    .await
}

// ── User records ──

pub async fn list_user_records<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<UserRecordRow>> {
    sqlx::query_as::<_, UserRecordRow>(
        r#"
        SELECT id, user_id, num_product_views, num_basket_additions, num_orders,
               num_order_lines, num_order_items, total_spent, date_last_order
        FROM user_records
        ORDER BY total_spent DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_user_records<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_records")
        .fetch_one(executor)
        .await
}

pub async fn get_user_record<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<UserRecordRow>> {
    sqlx::query_as::<_, UserRecordRow>(
        r#"
        SELECT id, user_id, num_product_views, num_basket_additions, num_orders,
               num_order_lines, num_order_items, total_spent, date_last_order
        FROM user_records
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn record_user_product_view<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> SqlxResult<UserRecordRow> {
    sqlx::query_as::<_, UserRecordRow>(
        r#"
        INSERT INTO user_records (user_id, num_product_views)
        VALUES ($1, 1)
        ON CONFLICT (user_id)
            DO UPDATE SET num_product_views = user_records.num_product_views + 1
        RETURNING id, user_id, num_product_views, num_basket_additions, num_orders,
                  num_order_lines, num_order_items, total_spent, date_last_order
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn record_user_basket_addition<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> SqlxResult<UserRecordRow> {
    sqlx::query_as::<_, UserRecordRow>(
        r#"
        INSERT INTO user_records (user_id, num_basket_additions)
        VALUES ($1, 1)
        ON CONFLICT (user_id)
            DO UPDATE SET num_basket_additions = user_records.num_basket_additions + 1
        RETURNING id, user_id, num_product_views, num_basket_additions, num_orders,
                  num_order_lines, num_order_items, total_spent, date_last_order
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

// ── Views & searches ──

pub async fn list_user_product_views<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<UserProductViewRow>> {
    sqlx::query_as::<_, UserProductViewRow>(
        r#"
        SELECT id, user_id, product_id, date_created
        FROM user_product_views
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

pub async fn count_user_product_views<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_product_views WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
}

pub async fn create_user_product_view<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    product_id: Uuid,
) -> SqlxResult<UserProductViewRow> {
    sqlx::query_as::<_, UserProductViewRow>(
        r#"
        INSERT INTO user_product_views (user_id, product_id)
        VALUES ($1, $2)
        RETURNING id, user_id, product_id, date_created
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_one(executor)
    .await
}

pub async fn list_user_searches<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<UserSearchRow>> {
    sqlx::query_as::<_, UserSearchRow>(
        r#"
        SELECT id, user_id, query, date_created
        FROM user_searches
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

pub async fn count_user_searches<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_searches WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
}

pub async fn create_user_search<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    query: &str,
) -> SqlxResult<UserSearchRow> {
    sqlx::query_as::<_, UserSearchRow>(
        r#"
        INSERT INTO user_searches (user_id, query)
        VALUES ($1, $2)
        RETURNING id, user_id, query, date_created
        "#,
    )
    .bind(user_id)
    .bind(query)
    .fetch_one(executor)
    .await
}
