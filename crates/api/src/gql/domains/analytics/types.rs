use async_graphql::{ComplexObject, Context, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{ProductRecordRow, UserProductViewRow, UserRecordRow, UserSearchRow};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::catalogue::types::Product;
use crate::gql::domains::customer::types::User;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductRecord {
    pub id: ID,
    pub num_views: i32,
    pub num_basket_additions: i32,
    pub num_purchases: i32,
    pub score: f64,
    #[graphql(skip)]
    pub product_id: Uuid,
}

impl From<ProductRecordRow> for ProductRecord {
    fn from(row: ProductRecordRow) -> Self {
        Self {
            id: row.id.into(),
            num_views: row.num_views,
            num_basket_additions: row.num_basket_additions,
            num_purchases: row.num_purchases,
            score: row.score,
            product_id: row.product_id,
        }
    }
}

#[ComplexObject]
impl ProductRecord {
    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct UserRecord {
    pub id: ID,
    pub num_product_views: i32,
    pub num_basket_additions: i32,
    pub num_orders: i32,
    pub num_order_lines: i32,
    pub num_order_items: i32,
    pub total_spent: Decimal,
    pub date_last_order: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub user_id: Uuid,
}

impl From<UserRecordRow> for UserRecord {
    fn from(row: UserRecordRow) -> Self {
        Self {
            id: row.id.into(),
            num_product_views: row.num_product_views,
            num_basket_additions: row.num_basket_additions,
            num_orders: row.num_orders,
            num_order_lines: row.num_order_lines,
            num_order_items: row.num_order_items,
            total_spent: row.total_spent,
            date_last_order: row.date_last_order,
            user_id: row.user_id,
        }
    }
}

#[ComplexObject]
impl UserRecord {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.user_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct UserProductView {
    pub id: ID,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub user_id: Uuid,
    #[graphql(skip)]
    pub product_id: Uuid,
}

impl From<UserProductViewRow> for UserProductView {
    fn from(row: UserProductViewRow) -> Self {
        Self {
            id: row.id.into(),
            date_created: row.date_created,
            user_id: row.user_id,
            product_id: row.product_id,
        }
    }
}

#[ComplexObject]
impl UserProductView {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.user_id).await
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct UserSearch {
    pub id: ID,
    pub query: String,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub user_id: Uuid,
}

impl From<UserSearchRow> for UserSearch {
    fn from(row: UserSearchRow) -> Self {
        Self {
            id: row.id.into(),
            query: row.query,
            date_created: row.date_created,
            user_id: row.user_id,
        }
    }
}

#[ComplexObject]
impl UserSearch {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.user_id).await
    }
}

#[derive(SimpleObject)]
pub struct UserProductViewPayload {
    pub user_product_view: UserProductView,
}

#[derive(SimpleObject)]
pub struct UserSearchPayload {
    pub user_search: UserSearch,
}
