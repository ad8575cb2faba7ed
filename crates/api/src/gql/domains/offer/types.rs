use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{BenefitRow, ConditionRow, ConditionalOfferRow, RangeProductRow, RangeRow};
use infra::repos::offer;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::catalogue::types::Product;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

async fn load_range(ctx: &Context<'_>, id: Option<Uuid>) -> Result<Option<Range>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let state = ctx.data::<AppState>()?;
    let row = offer::get_range(&state.db, id).await.db_err()?;
    Ok(row.map(Range::from))
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Range {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_public: bool,
    pub includes_all_products: bool,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<RangeRow> for Range {
    fn from(row: RangeRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            slug: row.slug,
            description: row.description,
            is_public: row.is_public,
            includes_all_products: row.includes_all_products,
            date_created: row.date_created,
            uuid: row.id,
        }
    }
}

#[ComplexObject]
impl Range {
    /// Explicitly included products, in display order.
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<RangeProduct>> {
        let state = ctx.data::<AppState>()?;
        let rows = offer::list_range_products(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(RangeProduct::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct RangeProduct {
    pub id: ID,
    pub display_order: i32,
    #[graphql(skip)]
    pub range_id: Uuid,
    #[graphql(skip)]
    pub product_id: Uuid,
}

impl From<RangeProductRow> for RangeProduct {
    fn from(row: RangeProductRow) -> Self {
        Self {
            id: row.id.into(),
            display_order: row.display_order,
            range_id: row.range_id,
            product_id: row.product_id,
        }
    }
}

#[ComplexObject]
impl RangeProduct {
    async fn range(&self, ctx: &Context<'_>) -> Result<Option<Range>> {
        load_range(ctx, Some(self.range_id)).await
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load(ctx, self.product_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Condition {
    pub id: ID,
    #[graphql(name = "type")]
    pub condition_type: String,
    pub value: Option<Decimal>,
    pub proxy_class: Option<String>,
    #[graphql(skip)]
    pub range_id: Option<Uuid>,
}

impl From<ConditionRow> for Condition {
    fn from(row: ConditionRow) -> Self {
        Self {
            id: row.id.into(),
            condition_type: row.condition_type,
            value: row.value,
            proxy_class: row.proxy_class,
            range_id: row.range_id,
        }
    }
}

#[ComplexObject]
impl Condition {
    async fn range(&self, ctx: &Context<'_>) -> Result<Option<Range>> {
        load_range(ctx, self.range_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Benefit {
    pub id: ID,
    #[graphql(name = "type")]
    pub benefit_type: String,
    pub value: Option<Decimal>,
    pub max_affected_items: Option<i32>,
    pub proxy_class: Option<String>,
    #[graphql(skip)]
    pub range_id: Option<Uuid>,
}

impl From<BenefitRow> for Benefit {
    fn from(row: BenefitRow) -> Self {
        Self {
            id: row.id.into(),
            benefit_type: row.benefit_type,
            value: row.value,
            max_affected_items: row.max_affected_items,
            proxy_class: row.proxy_class,
            range_id: row.range_id,
        }
    }
}

#[ComplexObject]
impl Benefit {
    async fn range(&self, ctx: &Context<'_>) -> Result<Option<Range>> {
        load_range(ctx, self.range_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ConditionalOffer {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub offer_type: String,
    pub exclusive: bool,
    pub status: String,
    pub priority: i32,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub max_global_applications: Option<i32>,
    pub max_user_applications: Option<i32>,
    pub max_basket_applications: Option<i32>,
    pub max_discount: Option<Decimal>,
    pub total_discount: Decimal,
    pub num_applications: i32,
    pub num_orders: i32,
    pub redirect_url: String,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub condition_id: Uuid,
    #[graphql(skip)]
    pub benefit_id: Uuid,
}

impl From<ConditionalOfferRow> for ConditionalOffer {
    fn from(row: ConditionalOfferRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            slug: row.slug,
            description: row.description,
            offer_type: row.offer_type,
            exclusive: row.exclusive,
            status: row.status,
            priority: row.priority,
            start_datetime: row.start_datetime,
            end_datetime: row.end_datetime,
            max_global_applications: row.max_global_applications,
            max_user_applications: row.max_user_applications,
            max_basket_applications: row.max_basket_applications,
            max_discount: row.max_discount,
            total_discount: row.total_discount,
            num_applications: row.num_applications,
            num_orders: row.num_orders,
            redirect_url: row.redirect_url,
            date_created: row.date_created,
            condition_id: row.condition_id,
            benefit_id: row.benefit_id,
        }
    }
}

#[ComplexObject]
impl ConditionalOffer {
    async fn condition(&self, ctx: &Context<'_>) -> Result<Option<Condition>> {
        let state = ctx.data::<AppState>()?;
        let row = offer::get_condition(&state.db, self.condition_id)
            .await
            .db_err()?;
        Ok(row.map(Condition::from))
    }

    async fn benefit(&self, ctx: &Context<'_>) -> Result<Option<Benefit>> {
        let state = ctx.data::<AppState>()?;
        let row = offer::get_benefit(&state.db, self.benefit_id)
            .await
            .db_err()?;
        Ok(row.map(Benefit::from))
    }
}

#[derive(InputObject)]
pub struct CreateConditionalOfferInput {
    pub name: String,
    pub description: Option<String>,
    pub offer_type: String,
    pub condition_id: ID,
    pub benefit_id: ID,
}

#[derive(InputObject)]
pub struct UpdateConditionalOfferInput {
    pub id: ID,
    pub name: Option<String>,
    pub description: Option<String>,
    pub offer_type: Option<String>,
}

#[derive(InputObject)]
pub struct CreateRangeInput {
    pub name: String,
    pub description: Option<String>,
    #[graphql(default = true)]
    pub is_public: bool,
}

#[derive(InputObject)]
pub struct AddProductToRangeInput {
    pub range_id: ID,
    pub product_id: ID,
}

#[derive(InputObject)]
pub struct CreateConditionInput {
    pub range_id: Option<ID>,
    #[graphql(name = "type")]
    pub condition_type: String,
    pub value: Option<Decimal>,
}

#[derive(InputObject)]
pub struct CreateBenefitInput {
    pub range_id: Option<ID>,
    #[graphql(name = "type")]
    pub benefit_type: String,
    pub value: Option<Decimal>,
    pub max_affected_items: Option<i32>,
}

#[derive(SimpleObject)]
pub struct ConditionalOfferPayload {
    pub offer: ConditionalOffer,
}

#[derive(SimpleObject)]
pub struct RangePayload {
    pub range: Range,
}

#[derive(SimpleObject)]
pub struct ConditionPayload {
    pub condition: Condition,
}

#[derive(SimpleObject)]
pub struct BenefitPayload {
    pub benefit: Benefit,
}
