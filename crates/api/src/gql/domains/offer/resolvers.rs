use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::keys::slugify;
use infra::repos::{
    catalogue,
    offer::{
        self, CreateOfferData, CreateRangeData, CreateRuleData, UpdateOfferData, BENEFIT_TYPES,
        CONDITION_TYPES,
    },
};
use uuid::Uuid;

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    AddProductToRangeInput, Benefit, BenefitPayload, Condition, ConditionPayload,
    ConditionalOffer, ConditionalOfferPayload, CreateBenefitInput, CreateConditionInput,
    CreateConditionalOfferInput, CreateRangeInput, Range, RangePayload,
    UpdateConditionalOfferInput,
};

/// Match a rule type against the known names, ignoring case.
fn rule_type(value: &str, known: &[&str], kind: &str) -> Result<String> {
    known
        .iter()
        .find(|t| t.eq_ignore_ascii_case(value.trim()))
        .map(|t| t.to_string())
        .ok_or_else(|| Error::new(format!("Unknown {kind} type: {value}")))
}

async fn optional_range(state: &AppState, id: Option<&ID>) -> Result<Option<Uuid>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let range_id = parse_id(id, "range")?;
    offer::get_range(&state.db, range_id)
        .await
        .db_err()?
        .ok_or_else(|| Error::new("Range not found"))?;
    Ok(Some(range_id))
}

#[derive(Default)]
pub struct OfferQuery;

#[Object]
impl OfferQuery {
    async fn offers(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, ConditionalOffer>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            offer::count_offers(&state.db),
            |page| offer::list_offers(&state.db, page),
        )
        .await
    }

    async fn offer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<ConditionalOffer>> {
        let state = ctx.data::<AppState>()?;
        let offer_id = parse_id(&id, "offer")?;
        let row = offer::get_offer(&state.db, offer_id).await.db_err()?;
        Ok(row.map(ConditionalOffer::from))
    }

    async fn benefits(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Benefit>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            offer::count_benefits(&state.db),
            |page| offer::list_benefits(&state.db, page),
        )
        .await
    }

    async fn benefit(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Benefit>> {
        let state = ctx.data::<AppState>()?;
        let benefit_id = parse_id(&id, "benefit")?;
        let row = offer::get_benefit(&state.db, benefit_id).await.db_err()?;
        Ok(row.map(Benefit::from))
    }

    async fn conditions(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Condition>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            offer::count_conditions(&state.db),
            |page| offer::list_conditions(&state.db, page),
        )
        .await
    }

    async fn condition(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Condition>> {
        let state = ctx.data::<AppState>()?;
        let condition_id = parse_id(&id, "condition")?;
        let row = offer::get_condition(&state.db, condition_id)
            .await
            .db_err()?;
        Ok(row.map(Condition::from))
    }

    async fn ranges(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Range>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            offer::count_ranges(&state.db),
            |page| offer::list_ranges(&state.db, page),
        )
        .await
    }

    async fn range(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Range>> {
        let state = ctx.data::<AppState>()?;
        let range_id = parse_id(&id, "range")?;
        let row = offer::get_range(&state.db, range_id).await.db_err()?;
        Ok(row.map(Range::from))
    }
}

#[derive(Default)]
pub struct OfferMutation;

#[Object]
impl OfferMutation {
    async fn create_conditional_offer(
        &self,
        ctx: &Context<'_>,
        input: CreateConditionalOfferInput,
    ) -> Result<ConditionalOfferPayload> {
        require_user(ctx, "create an offer").await?;
        let state = ctx.data::<AppState>()?;

        let not_found = || Error::new("Condition or Benefit not found");
        let condition_id = parse_id(&input.condition_id, "condition").map_err(|_| not_found())?;
        let benefit_id = parse_id(&input.benefit_id, "benefit").map_err(|_| not_found())?;

        let condition = offer::get_condition(&state.db, condition_id)
            .await
            .db_err()?;
        let benefit = offer::get_benefit(&state.db, benefit_id).await.db_err()?;
        if condition.is_none() || benefit.is_none() {
            return Err(not_found());
        }

        let row = offer::create_offer(
            &state.db,
            CreateOfferData {
                slug: slugify(&input.name),
                name: input.name,
                description: input.description.unwrap_or_default(),
                offer_type: input.offer_type,
                condition_id,
                benefit_id,
            },
        )
        .await
        .db_err()?;

        tracing::info!(offer_id = %row.id, name = %row.name, "Conditional offer created");
        Ok(ConditionalOfferPayload { offer: row.into() })
    }

    async fn update_conditional_offer(
        &self,
        ctx: &Context<'_>,
        input: UpdateConditionalOfferInput,
    ) -> Result<ConditionalOfferPayload> {
        require_user(ctx, "update an offer").await?;
        let state = ctx.data::<AppState>()?;
        let offer_id = parse_id(&input.id, "offer")?;

        let name = input.name.filter(|s| !s.is_empty());
        let data = UpdateOfferData {
            slug: name.as_deref().map(slugify),
            name,
            description: input.description.filter(|s| !s.is_empty()),
            offer_type: input.offer_type.filter(|s| !s.is_empty()),
        };

        let row = offer::update_offer(&state.db, offer_id, data)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Offer not found"))?;

        Ok(ConditionalOfferPayload { offer: row.into() })
    }

    async fn delete_conditional_offer(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        require_user(ctx, "delete an offer").await?;
        let state = ctx.data::<AppState>()?;
        let offer_id = parse_id(&id, "offer")?;

        if !offer::delete_offer(&state.db, offer_id).await.db_err()? {
            return Err(Error::new("Offer not found"));
        }

        tracing::info!(offer_id = %offer_id, "Conditional offer deleted");
        Ok(true.into())
    }

    async fn create_range(&self, ctx: &Context<'_>, input: CreateRangeInput) -> Result<RangePayload> {
        require_user(ctx, "create a range").await?;
        let state = ctx.data::<AppState>()?;

        let row = offer::create_range(
            &state.db,
            CreateRangeData {
                slug: slugify(&input.name),
                name: input.name,
                description: input.description.unwrap_or_default(),
                is_public: input.is_public,
            },
        )
        .await
        .db_err()?;

        Ok(RangePayload { range: row.into() })
    }

    /// Adding a product that is already in the range succeeds without change.
    async fn add_product_to_range(
        &self,
        ctx: &Context<'_>,
        input: AddProductToRangeInput,
    ) -> Result<SuccessPayload> {
        require_user(ctx, "modify a range").await?;
        let state = ctx.data::<AppState>()?;
        let range_id = parse_id(&input.range_id, "range")?;
        let product_id = parse_id(&input.product_id, "product")?;

        offer::get_range(&state.db, range_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Range not found"))?;
        catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product not found."))?;

        offer::add_product_to_range(&state.db, range_id, product_id)
            .await
            .db_err()?;
        Ok(true.into())
    }

    async fn create_condition(
        &self,
        ctx: &Context<'_>,
        input: CreateConditionInput,
    ) -> Result<ConditionPayload> {
        require_user(ctx, "create a condition").await?;
        let state = ctx.data::<AppState>()?;
        let condition_type = rule_type(&input.condition_type, CONDITION_TYPES, "condition")?;
        let range_id = optional_range(state, input.range_id.as_ref()).await?;

        let row = offer::create_condition(
            &state.db,
            CreateRuleData {
                range_id,
                rule_type: condition_type,
                value: input.value,
                max_affected_items: None,
            },
        )
        .await
        .db_err()?;

        Ok(ConditionPayload {
            condition: row.into(),
        })
    }

    async fn create_benefit(
        &self,
        ctx: &Context<'_>,
        input: CreateBenefitInput,
    ) -> Result<BenefitPayload> {
        require_user(ctx, "create a benefit").await?;
        let state = ctx.data::<AppState>()?;
        let benefit_type = rule_type(&input.benefit_type, BENEFIT_TYPES, "benefit")?;
        let range_id = optional_range(state, input.range_id.as_ref()).await?;

        let row = offer::create_benefit(
            &state.db,
            CreateRuleData {
                range_id,
                rule_type: benefit_type,
                value: input.value,
                max_affected_items: input.max_affected_items,
            },
        )
        .await
        .db_err()?;

        Ok(BenefitPayload {
            benefit: row.into(),
        })
    }
}
