use async_graphql::{ComplexObject, Context, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{BasketLineRow, BasketRow, BasketTotalsRow, LineAttributeRow};
use infra::repos::basket;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::catalogue::types::{Product, ProductOption};
use crate::gql::domains::customer::types::User;
use crate::gql::domains::partner::types::StockRecord;
use crate::gql::domains::voucher::types::Voucher;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Basket {
    pub id: ID,
    pub status: String,
    pub date_created: DateTime<Utc>,
    pub date_merged: Option<DateTime<Utc>>,
    pub date_submitted: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub owner_id: Option<Uuid>,
}

impl From<BasketRow> for Basket {
    fn from(row: BasketRow) -> Self {
        Self {
            id: row.id.into(),
            status: row.status,
            date_created: row.date_created,
            date_merged: row.date_merged,
            date_submitted: row.date_submitted,
            uuid: row.id,
            owner_id: row.owner_id,
        }
    }
}

impl Basket {
    async fn totals(&self, ctx: &Context<'_>) -> Result<BasketTotalsRow> {
        let state = ctx.data::<AppState>()?;
        Ok(basket::basket_totals(&state.db, self.uuid).await.db_err()?)
    }
}

#[ComplexObject]
impl Basket {
    async fn owner(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.owner_id).await
    }

    async fn lines(&self, ctx: &Context<'_>) -> Result<Vec<BasketLine>> {
        let state = ctx.data::<AppState>()?;
        let rows = basket::list_lines_for_basket(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(BasketLine::from).collect())
    }

    async fn vouchers(&self, ctx: &Context<'_>) -> Result<Vec<Voucher>> {
        let state = ctx.data::<AppState>()?;
        let rows = basket::list_basket_vouchers(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(Voucher::from).collect())
    }

    async fn num_lines(&self, ctx: &Context<'_>) -> Result<i64> {
        Ok(self.totals(ctx).await?.num_lines)
    }

    /// Sum of line quantities.
    async fn num_items(&self, ctx: &Context<'_>) -> Result<i64> {
        Ok(self.totals(ctx).await?.num_items)
    }

    async fn is_empty(&self, ctx: &Context<'_>) -> Result<bool> {
        Ok(self.totals(ctx).await?.num_lines == 0)
    }

    async fn total_excl_tax(&self, ctx: &Context<'_>) -> Result<Decimal> {
        Ok(self.totals(ctx).await?.total_excl_tax)
    }

    async fn total_incl_tax(&self, ctx: &Context<'_>) -> Result<Decimal> {
        Ok(self.totals(ctx).await?.total_incl_tax)
    }

    /// Always zero: offers are not applied to baskets.
    async fn total_discount(&self) -> Decimal {
        Decimal::ZERO
    }

    async fn is_shipping_required(&self, ctx: &Context<'_>) -> Result<bool> {
        Ok(self.totals(ctx).await?.is_shipping_required)
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct BasketLine {
    pub id: ID,
    /// `<product id>_<stock record id>`, unique within a basket.
    pub line_reference: String,
    pub quantity: i32,
    pub price_currency: String,
    pub price_excl_tax: Option<Decimal>,
    pub price_incl_tax: Option<Decimal>,
    pub tax_code: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub basket_id: Uuid,
    #[graphql(skip)]
    pub product_id: Uuid,
    #[graphql(skip)]
    pub stockrecord_id: Option<Uuid>,
}

impl From<BasketLineRow> for BasketLine {
    fn from(row: BasketLineRow) -> Self {
        Self {
            id: row.id.into(),
            line_reference: row.line_reference,
            quantity: row.quantity,
            price_currency: row.price_currency,
            price_excl_tax: row.price_excl_tax,
            price_incl_tax: row.price_incl_tax,
            tax_code: row.tax_code,
            date_created: row.date_created,
            date_updated: row.date_updated,
            uuid: row.id,
            basket_id: row.basket_id,
            product_id: row.product_id,
            stockrecord_id: row.stockrecord_id,
        }
    }
}

#[ComplexObject]
impl BasketLine {
    async fn basket(&self, ctx: &Context<'_>) -> Result<Option<Basket>> {
        let state = ctx.data::<AppState>()?;
        let row = basket::get_basket_by_id(&state.db, self.basket_id)
            .await
            .db_err()?;
        Ok(row.map(Basket::from))
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }

    async fn stockrecord(&self, ctx: &Context<'_>) -> Result<Option<StockRecord>> {
        StockRecord::load_opt(ctx, self.stockrecord_id).await
    }

    async fn attributes(&self, ctx: &Context<'_>) -> Result<Vec<LineAttribute>> {
        let state = ctx.data::<AppState>()?;
        let rows = basket::list_line_attributes(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(LineAttribute::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct LineAttribute {
    pub id: ID,
    pub value: String,
    #[graphql(skip)]
    pub line_id: Uuid,
    #[graphql(skip)]
    pub option_id: Uuid,
}

impl From<LineAttributeRow> for LineAttribute {
    fn from(row: LineAttributeRow) -> Self {
        Self {
            id: row.id.into(),
            value: row.value,
            line_id: row.line_id,
            option_id: row.option_id,
        }
    }
}

#[ComplexObject]
impl LineAttribute {
    async fn line(&self, ctx: &Context<'_>) -> Result<Option<BasketLine>> {
        let state = ctx.data::<AppState>()?;
        let row = basket::get_line_by_id(&state.db, self.line_id)
            .await
            .db_err()?;
        Ok(row.map(BasketLine::from))
    }

    async fn option(&self, ctx: &Context<'_>) -> Result<Option<ProductOption>> {
        ProductOption::load(ctx, self.option_id).await
    }
}

#[derive(SimpleObject)]
pub struct BasketPayload {
    pub basket: Basket,
}

#[derive(SimpleObject)]
pub struct BasketLinePayload {
    pub line: BasketLine,
}
