use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{PartnerAddressRow, PartnerRow, StockAlertRow, StockRecordRow};
use infra::repos::partner;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::address::types::Country;
use crate::gql::domains::catalogue::types::Product;
use crate::gql::domains::customer::types::User;
use crate::gql::error::{DbResultExt, ResultExt};
use crate::gql::loaders::{PartnerLoader, StockRecordLoader};
use crate::state::AppState;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Partner {
    pub id: ID,
    pub name: String,
    pub code: String,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<PartnerRow> for Partner {
    fn from(row: PartnerRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
            uuid: row.id,
        }
    }
}

impl Partner {
    pub async fn load(ctx: &Context<'_>, id: Uuid) -> Result<Option<Partner>> {
        let loader = ctx.data::<DataLoader<PartnerLoader>>()?;
        let row = loader.load_one(id).await.gql_err("Loading partner failed")?;
        Ok(row.map(Partner::from))
    }
}

#[ComplexObject]
impl Partner {
    /// Falls back to the code for unnamed partners.
    async fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let state = ctx.data::<AppState>()?;
        let rows = partner::list_partner_users(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn primary_address(&self, ctx: &Context<'_>) -> Result<Option<PartnerAddress>> {
        let state = ctx.data::<AppState>()?;
        let row = partner::get_primary_address(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(row.map(PartnerAddress::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct PartnerAddress {
    pub id: ID,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    pub state: String,
    pub postcode: String,
    #[graphql(skip)]
    pub country_id: String,
}

impl From<PartnerAddressRow> for PartnerAddress {
    fn from(row: PartnerAddressRow) -> Self {
        Self {
            id: row.id.into(),
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
        }
    }
}

#[ComplexObject]
impl PartnerAddress {
    async fn country(&self, ctx: &Context<'_>) -> Result<Option<Country>> {
        Country::load(ctx, &self.country_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct StockRecord {
    pub id: ID,
    pub partner_sku: String,
    pub price_currency: String,
    pub price: Option<Decimal>,
    pub num_in_stock: Option<i32>,
    pub num_allocated: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    /// In stock minus allocated.
    pub net_stock_level: i32,
    pub is_below_threshold: bool,
    #[graphql(skip)]
    pub product_id: Uuid,
    #[graphql(skip)]
    pub partner_id: Uuid,
}

impl From<StockRecordRow> for StockRecord {
    fn from(row: StockRecordRow) -> Self {
        Self {
            id: row.id.into(),
            net_stock_level: row.net_stock_level(),
            is_below_threshold: row.is_below_threshold(),
            partner_sku: row.partner_sku,
            price_currency: row.price_currency,
            price: row.price,
            num_in_stock: row.num_in_stock,
            num_allocated: row.num_allocated,
            low_stock_threshold: row.low_stock_threshold,
            date_created: row.date_created,
            date_updated: row.date_updated,
            product_id: row.product_id,
            partner_id: row.partner_id,
        }
    }
}

impl StockRecord {
    pub async fn load(ctx: &Context<'_>, id: Uuid) -> Result<Option<StockRecord>> {
        let loader = ctx.data::<DataLoader<StockRecordLoader>>()?;
        let row = loader
            .load_one(id)
            .await
            .gql_err("Loading stock record failed")?;
        Ok(row.map(StockRecord::from))
    }

    pub async fn load_opt(ctx: &Context<'_>, id: Option<Uuid>) -> Result<Option<StockRecord>> {
        match id {
            Some(id) => StockRecord::load(ctx, id).await,
            None => Ok(None),
        }
    }
}

#[ComplexObject]
impl StockRecord {
    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }

    async fn partner(&self, ctx: &Context<'_>) -> Result<Option<Partner>> {
        Partner::load(ctx, self.partner_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct StockAlert {
    pub id: ID,
    pub threshold: i32,
    pub status: String,
    pub date_created: DateTime<Utc>,
    pub date_closed: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub stockrecord_id: Uuid,
}

impl From<StockAlertRow> for StockAlert {
    fn from(row: StockAlertRow) -> Self {
        Self {
            id: row.id.into(),
            threshold: row.threshold,
            status: row.status,
            date_created: row.date_created,
            date_closed: row.date_closed,
            stockrecord_id: row.stockrecord_id,
        }
    }
}

#[ComplexObject]
impl StockAlert {
    async fn stockrecord(&self, ctx: &Context<'_>) -> Result<Option<StockRecord>> {
        StockRecord::load(ctx, self.stockrecord_id).await
    }
}

#[derive(InputObject)]
pub struct CreatePartnerInput {
    pub name: String,
    pub code: String,
}

#[derive(InputObject)]
pub struct UpdatePartnerInput {
    pub id: ID,
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(InputObject)]
pub struct CreateStockRecordInput {
    pub partner_id: ID,
    pub product_id: ID,
    pub partner_sku: String,
    pub price_currency: String,
    pub price: Decimal,
    pub num_in_stock: i32,
    pub low_stock_threshold: Option<i32>,
}

#[derive(InputObject)]
pub struct UpdateStockRecordInput {
    pub id: ID,
    pub price: Option<Decimal>,
    pub num_in_stock: Option<i32>,
    pub low_stock_threshold: Option<i32>,
}

#[derive(SimpleObject)]
pub struct PartnerPayload {
    pub partner: Partner,
}

#[derive(SimpleObject)]
pub struct StockRecordPayload {
    pub stock_record: StockRecord,
}
