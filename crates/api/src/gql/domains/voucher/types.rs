use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{VoucherApplicationRow, VoucherRow, VoucherSetRow};
use infra::repos::voucher;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::customer::types::User;
use crate::gql::domains::offer::types::ConditionalOffer;
use crate::gql::domains::order::types::Order;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

/// A batch of generated vouchers; usage figures are summed over its vouchers.
#[derive(SimpleObject, Clone)]
pub struct VoucherSet {
    pub id: ID,
    pub name: String,
    pub count: i32,
    pub code_length: i32,
    pub description: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub num_basket_additions: i64,
    pub num_orders: i64,
    pub total_discount: Decimal,
}

impl From<VoucherSetRow> for VoucherSet {
    fn from(row: VoucherSetRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            count: row.count,
            code_length: row.code_length,
            description: row.description,
            start_datetime: row.start_datetime,
            end_datetime: row.end_datetime,
            date_created: row.date_created,
            num_basket_additions: row.num_basket_additions,
            num_orders: row.num_orders,
            total_discount: row.total_discount,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Voucher {
    pub id: ID,
    pub name: String,
    pub code: String,
    pub usage: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub num_basket_additions: i32,
    pub num_orders: i32,
    pub total_discount: Decimal,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub voucher_set_id: Option<Uuid>,
}

impl From<VoucherRow> for Voucher {
    fn from(row: VoucherRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
            usage: row.usage,
            start_datetime: row.start_datetime,
            end_datetime: row.end_datetime,
            num_basket_additions: row.num_basket_additions,
            num_orders: row.num_orders,
            total_discount: row.total_discount,
            date_created: row.date_created,
            uuid: row.id,
            voucher_set_id: row.voucher_set_id,
        }
    }
}

#[ComplexObject]
impl Voucher {
    /// Whether now falls inside the voucher's validity window.
    async fn is_active(&self) -> bool {
        let now = Utc::now();
        self.start_datetime <= now && now <= self.end_datetime
    }

    async fn voucher_set(&self, ctx: &Context<'_>) -> Result<Option<VoucherSet>> {
        let Some(set_id) = self.voucher_set_id else {
            return Ok(None);
        };
        let state = ctx.data::<AppState>()?;
        let row = voucher::get_voucher_set(&state.db, set_id).await.db_err()?;
        Ok(row.map(VoucherSet::from))
    }

    async fn offers(&self, ctx: &Context<'_>) -> Result<Vec<ConditionalOffer>> {
        let state = ctx.data::<AppState>()?;
        let rows = voucher::list_voucher_offers(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ConditionalOffer::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct VoucherApplication {
    pub id: ID,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub voucher_id: Uuid,
    #[graphql(skip)]
    pub user_id: Option<Uuid>,
    #[graphql(skip)]
    pub order_id: Uuid,
}

impl From<VoucherApplicationRow> for VoucherApplication {
    fn from(row: VoucherApplicationRow) -> Self {
        Self {
            id: row.id.into(),
            date_created: row.date_created,
            voucher_id: row.voucher_id,
            user_id: row.user_id,
            order_id: row.order_id,
        }
    }
}

#[ComplexObject]
impl VoucherApplication {
    async fn voucher(&self, ctx: &Context<'_>) -> Result<Option<Voucher>> {
        let state = ctx.data::<AppState>()?;
        let row = voucher::get_voucher(&state.db, self.voucher_id)
            .await
            .db_err()?;
        Ok(row.map(Voucher::from))
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.user_id).await
    }

    async fn order(&self, ctx: &Context<'_>) -> Result<Option<Order>> {
        Order::load(ctx, self.order_id).await
    }
}

#[derive(InputObject)]
pub struct CreateVoucherApplicationInput {
    pub voucher_id: ID,
    pub order_id: ID,
    pub user_id: Option<ID>,
}

#[derive(InputObject)]
pub struct CreateVoucherInput {
    pub name: String,
    pub code: String,
    /// "Single use", "Multi-use" or "Once per customer".
    pub usage: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub voucher_set_id: Option<ID>,
}

#[derive(InputObject)]
pub struct UpdateVoucherInput {
    pub id: ID,
    pub name: Option<String>,
    pub code: Option<String>,
    pub usage: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
}

#[derive(SimpleObject)]
pub struct VoucherPayload {
    pub voucher: Voucher,
}
