use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use infra::models::{OrderAndItemChargesRow, WeightBandRow, WeightBasedRow};
use infra::repos::shipping::{self, MethodKind};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::address::types::Country;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

async fn method_countries(ctx: &Context<'_>, kind: MethodKind, id: Uuid) -> Result<Vec<Country>> {
    let state = ctx.data::<AppState>()?;
    let rows = shipping::list_method_countries(&state.db, kind, id)
        .await
        .db_err()?;
    Ok(rows.into_iter().map(Country::from).collect())
}

/// Flat charge per order plus a charge per item, waived above an optional
/// basket total.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct OrderAndItemCharges {
    pub id: ID,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price_per_order: Decimal,
    pub price_per_item: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<OrderAndItemChargesRow> for OrderAndItemCharges {
    fn from(row: OrderAndItemChargesRow) -> Self {
        Self {
            id: row.id.into(),
            code: row.code,
            name: row.name,
            description: row.description,
            price_per_order: row.price_per_order,
            price_per_item: row.price_per_item,
            free_shipping_threshold: row.free_shipping_threshold,
            uuid: row.id,
        }
    }
}

#[ComplexObject]
impl OrderAndItemCharges {
    async fn countries(&self, ctx: &Context<'_>) -> Result<Vec<Country>> {
        method_countries(ctx, MethodKind::OrderAndItemCharges, self.uuid).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct WeightBased {
    pub id: ID,
    pub code: String,
    pub name: String,
    pub description: String,
    pub weight_attribute: String,
    pub default_weight: Decimal,
    pub num_bands: i64,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub top_band_id: Option<Uuid>,
}

impl From<WeightBasedRow> for WeightBased {
    fn from(row: WeightBasedRow) -> Self {
        Self {
            id: row.id.into(),
            code: row.code,
            name: row.name,
            description: row.description,
            weight_attribute: row.weight_attribute,
            default_weight: row.default_weight,
            num_bands: row.num_bands,
            uuid: row.id,
            top_band_id: row.top_band_id,
        }
    }
}

#[ComplexObject]
impl WeightBased {
    async fn countries(&self, ctx: &Context<'_>) -> Result<Vec<Country>> {
        method_countries(ctx, MethodKind::WeightBased, self.uuid).await
    }

    /// The band with the highest upper limit.
    async fn top_band(&self, ctx: &Context<'_>) -> Result<Option<WeightBand>> {
        let Some(band_id) = self.top_band_id else {
            return Ok(None);
        };
        let state = ctx.data::<AppState>()?;
        let row = shipping::get_band(&state.db, band_id).await.db_err()?;
        Ok(row.map(WeightBand::from))
    }
}

/// Covers weights above `weight_from` up to and including `weight_to`.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct WeightBand {
    pub id: ID,
    pub upper_limit: Decimal,
    pub charge: Decimal,
    pub weight_from: Decimal,
    pub weight_to: Decimal,
    #[graphql(skip)]
    pub method_id: Uuid,
}

impl From<WeightBandRow> for WeightBand {
    fn from(row: WeightBandRow) -> Self {
        Self {
            id: row.id.into(),
            upper_limit: row.upper_limit,
            charge: row.charge,
            weight_from: row.weight_from,
            weight_to: row.upper_limit,
            method_id: row.method_id,
        }
    }
}

#[ComplexObject]
impl WeightBand {
    async fn method(&self, ctx: &Context<'_>) -> Result<Option<WeightBased>> {
        let state = ctx.data::<AppState>()?;
        let row = shipping::get_weight_based(&state.db, self.method_id)
            .await
            .db_err()?;
        Ok(row.map(WeightBased::from))
    }
}

#[derive(InputObject)]
pub struct CreateOrderAndItemChargeInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_per_order: Decimal,
    pub price_per_item: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
    /// ISO 3166-1 alpha-2 codes the method is offered in.
    pub countries: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct CreateWeightBasedMethodInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub weight_attribute: Option<String>,
    pub default_weight: Decimal,
    pub countries: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct CreateWeightBandInput {
    pub method_id: ID,
    pub upper_limit: Decimal,
    pub charge: Decimal,
}

#[derive(SimpleObject)]
pub struct OrderAndItemChargePayload {
    pub order_and_item_charge: OrderAndItemCharges,
}

#[derive(SimpleObject)]
pub struct WeightBasedMethodPayload {
    pub weight_based_method: WeightBased,
}

#[derive(SimpleObject)]
pub struct WeightBandPayload {
    pub weight_band: WeightBand,
}
