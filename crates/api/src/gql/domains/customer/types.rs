use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{ProductAlertRow, UserRow};
use uuid::Uuid;

use crate::gql::domains::catalogue::types::Product;
use crate::gql::error::ResultExt;
use crate::gql::loaders::UserLoader;

#[derive(SimpleObject, Clone)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            is_staff: row.is_staff,
            date_joined: row.date_joined,
        }
    }
}

impl User {
    /// Batch-load a related user through the request's `UserLoader`.
    pub async fn load(ctx: &Context<'_>, id: Uuid) -> Result<Option<User>> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let row = loader.load_one(id).await.gql_err("Loading user failed")?;
        Ok(row.map(User::from))
    }

    pub async fn load_opt(ctx: &Context<'_>, id: Option<Uuid>) -> Result<Option<User>> {
        match id {
            Some(id) => User::load(ctx, id).await,
            None => Ok(None),
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ProductAlert {
    pub id: ID,
    pub email: Option<String>,
    pub key: String,
    pub status: String,
    pub date_created: DateTime<Utc>,
    pub date_confirmed: Option<DateTime<Utc>>,
    pub date_cancelled: Option<DateTime<Utc>>,
    pub date_closed: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub product_id: Uuid,
    #[graphql(skip)]
    pub user_id: Option<Uuid>,
}

impl From<ProductAlertRow> for ProductAlert {
    fn from(row: ProductAlertRow) -> Self {
        Self {
            id: row.id.into(),
            email: row.email,
            key: row.key,
            status: row.status,
            date_created: row.date_created,
            date_confirmed: row.date_confirmed,
            date_cancelled: row.date_cancelled,
            date_closed: row.date_closed,
            product_id: row.product_id,
            user_id: row.user_id,
        }
    }
}

#[ComplexObject]
impl ProductAlert {
    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.user_id).await
    }
}

#[derive(InputObject)]
pub struct CreateUserInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct UpdateUserInput {
    pub id: ID,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(InputObject)]
pub struct CreateProductAlertInput {
    pub product_id: ID,
    pub email: String,
}

#[derive(SimpleObject)]
pub struct UserPayload {
    pub user: User,
}

#[derive(SimpleObject)]
pub struct ProductAlertPayload {
    pub product_alert: ProductAlert,
}

#[derive(SimpleObject)]
pub struct LoginPayload {
    pub token: String,
    pub user: User,
}
