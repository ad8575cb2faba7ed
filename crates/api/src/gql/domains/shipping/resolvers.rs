use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::shipping::{
    self, CreateOrderAndItemChargesData, CreateWeightBasedData, MethodKind,
};
use rust_decimal::Decimal;

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    CreateOrderAndItemChargeInput, CreateWeightBandInput, CreateWeightBasedMethodInput,
    OrderAndItemChargePayload, OrderAndItemCharges, WeightBand, WeightBandPayload, WeightBased,
    WeightBasedMethodPayload,
};

const DEFAULT_WEIGHT_ATTRIBUTE: &str = "weight";

#[derive(Default)]
pub struct ShippingQuery;

#[Object]
impl ShippingQuery {
    async fn order_and_item_charges(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, OrderAndItemCharges>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            shipping::count_order_and_item_charges(&state.db),
            |page| shipping::list_order_and_item_charges(&state.db, page),
        )
        .await
    }

    async fn order_and_item_charge(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> Result<Option<OrderAndItemCharges>> {
        let state = ctx.data::<AppState>()?;
        let method_id = parse_id(&id, "shipping method")?;
        let row = shipping::get_order_and_item_charges(&state.db, method_id)
            .await
            .db_err()?;
        Ok(row.map(OrderAndItemCharges::from))
    }

    async fn weight_based_methods(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, WeightBased>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            shipping::count_weight_based(&state.db),
            |page| shipping::list_weight_based(&state.db, page),
        )
        .await
    }

    async fn weight_based_method(&self, ctx: &Context<'_>, id: ID) -> Result<Option<WeightBased>> {
        let state = ctx.data::<AppState>()?;
        let method_id = parse_id(&id, "shipping method")?;
        let row = shipping::get_weight_based(&state.db, method_id)
            .await
            .db_err()?;
        Ok(row.map(WeightBased::from))
    }

    /// Bands ordered from lightest to heaviest.
    async fn weight_bands_by_method(
        &self,
        ctx: &Context<'_>,
        method_id: ID,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, WeightBand>> {
        let state = ctx.data::<AppState>()?;
        let method_id = parse_id(&method_id, "shipping method")?;
        paginate(
            after,
            before,
            first,
            last,
            shipping::count_bands_for_method(&state.db, method_id),
            |page| shipping::list_bands_for_method(&state.db, method_id, page),
        )
        .await
    }
}

fn country_codes(countries: Option<Vec<String>>) -> Vec<String> {
    countries
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn non_negative(value: Decimal, field: &str) -> Result<Decimal> {
    if value.is_sign_negative() {
        return Err(Error::new(format!("{field} cannot be negative.")));
    }
    Ok(value)
}

#[derive(Default)]
pub struct ShippingMutation;

#[Object]
impl ShippingMutation {
    async fn create_order_and_item_charge(
        &self,
        ctx: &Context<'_>,
        input: CreateOrderAndItemChargeInput,
    ) -> Result<OrderAndItemChargePayload> {
        require_user(ctx, "create a shipping method").await?;
        let state = ctx.data::<AppState>()?;
        let countries = country_codes(input.countries);

        let data = CreateOrderAndItemChargesData {
            code: input.code,
            name: input.name,
            description: input.description.unwrap_or_default(),
            price_per_order: non_negative(input.price_per_order, "Price per order")?,
            price_per_item: non_negative(input.price_per_item, "Price per item")?,
            free_shipping_threshold: input.free_shipping_threshold,
        };

        let mut tx = state.db.begin().await.db_err()?;
        let row = shipping::create_order_and_item_charges(&mut *tx, data)
            .await
            .db_err()?;
        if !countries.is_empty() {
            shipping::set_method_countries(
                &mut *tx,
                MethodKind::OrderAndItemCharges,
                row.id,
                &countries,
            )
            .await
            .db_err()?;
        }
        tx.commit().await.db_err()?;

        tracing::info!(method_id = %row.id, code = %row.code, "Shipping method created");
        Ok(OrderAndItemChargePayload {
            order_and_item_charge: row.into(),
        })
    }

    async fn create_weight_based_method(
        &self,
        ctx: &Context<'_>,
        input: CreateWeightBasedMethodInput,
    ) -> Result<WeightBasedMethodPayload> {
        require_user(ctx, "create a shipping method").await?;
        let state = ctx.data::<AppState>()?;
        let countries = country_codes(input.countries);

        let data = CreateWeightBasedData {
            code: input.code,
            name: input.name,
            description: input.description.unwrap_or_default(),
            weight_attribute: input
                .weight_attribute
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_WEIGHT_ATTRIBUTE.to_string()),
            default_weight: non_negative(input.default_weight, "Default weight")?,
        };

        let mut tx = state.db.begin().await.db_err()?;
        let row = shipping::create_weight_based(&mut *tx, data)
            .await
            .db_err()?;
        if !countries.is_empty() {
            shipping::set_method_countries(&mut *tx, MethodKind::WeightBased, row.id, &countries)
                .await
                .db_err()?;
        }
        tx.commit().await.db_err()?;

        tracing::info!(method_id = %row.id, code = %row.code, "Shipping method created");
        Ok(WeightBasedMethodPayload {
            weight_based_method: row.into(),
        })
    }

    async fn create_weight_band(
        &self,
        ctx: &Context<'_>,
        input: CreateWeightBandInput,
    ) -> Result<WeightBandPayload> {
        require_user(ctx, "create a weight band").await?;
        let state = ctx.data::<AppState>()?;
        let method_id = parse_id(&input.method_id, "shipping method")?;

        shipping::get_weight_based(&state.db, method_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("WeightBased method not found"))?;

        let upper_limit = non_negative(input.upper_limit, "Upper limit")?;
        let charge = non_negative(input.charge, "Charge")?;

        let band_id = shipping::create_band(&state.db, method_id, upper_limit, charge)
            .await
            .db_err()?;
        let row = shipping::get_band(&state.db, band_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Weight band not found"))?;

        Ok(WeightBandPayload {
            weight_band: row.into(),
        })
    }
}
