use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::{
    analytics,
    basket::{self, AddLineData},
    catalogue, partner,
};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{Basket, BasketLine, BasketLinePayload, BasketPayload};

#[derive(Default)]
pub struct BasketQuery;

#[Object]
impl BasketQuery {
    /// The caller's baskets, newest first.
    async fn baskets(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Basket>> {
        let user = require_user(ctx, "view baskets").await?;
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            basket::count_baskets(&state.db, user.id),
            |page| basket::list_baskets(&state.db, user.id, page),
        )
        .await
    }

    async fn basket(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Basket>> {
        let user = require_user(ctx, "view baskets").await?;
        let state = ctx.data::<AppState>()?;
        let basket_id = parse_id(&id, "basket")?;
        let row = basket::get_basket(&state.db, basket_id, user.id)
            .await
            .db_err()?;
        Ok(row.map(Basket::from))
    }

    /// Lines across all of the caller's baskets.
    async fn lines(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, BasketLine>> {
        let user = require_user(ctx, "view basket lines").await?;
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            basket::count_lines(&state.db, user.id),
            |page| basket::list_lines(&state.db, user.id, page),
        )
        .await
    }

    async fn line(&self, ctx: &Context<'_>, id: ID) -> Result<Option<BasketLine>> {
        let user = require_user(ctx, "view basket lines").await?;
        let state = ctx.data::<AppState>()?;
        let line_id = parse_id(&id, "line")?;
        let row = basket::get_line(&state.db, line_id, user.id)
            .await
            .db_err()?;
        Ok(row.map(BasketLine::from))
    }
}

#[derive(Default)]
pub struct BasketMutation;

#[Object]
impl BasketMutation {
    /// Add a product to the caller's open basket, creating the basket if
    /// needed. Adding a product already in the basket increases its line's
    /// quantity.
    async fn add_to_basket(
        &self,
        ctx: &Context<'_>,
        product_id: ID,
        quantity: Option<i32>,
    ) -> Result<BasketPayload> {
        let user = require_user(ctx, "add to basket").await?;
        let state = ctx.data::<AppState>()?;
        let product_id = parse_id(&product_id, "product")?;

        // An omitted or null quantity adds a single item.
        let quantity = quantity.unwrap_or(1);
        if quantity <= 0 {
            return Err(Error::new("Quantity must be greater than zero."));
        }

        catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product not found."))?;
        let stockrecord = partner::get_pricing_record_for_product(&state.db, product_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product is not available for purchase."))?;

        let mut tx = state.db.begin().await.db_err()?;
        let basket_row = basket::get_or_create_open_basket(&mut *tx, user.id)
            .await
            .db_err()?;
        basket::add_line(
            &mut *tx,
            AddLineData {
                basket_id: basket_row.id,
                product_id,
                stockrecord_id: stockrecord.id,
                quantity,
                price_currency: stockrecord.price_currency,
                price_excl_tax: stockrecord.price,
                // No tax rules: both prices are the stock record's price.
                price_incl_tax: stockrecord.price,
            },
        )
        .await
        .db_err()?;
        analytics::record_product_basket_addition(&mut *tx, product_id)
            .await
            .db_err()?;
        analytics::record_user_basket_addition(&mut *tx, user.id)
            .await
            .db_err()?;
        tx.commit().await.db_err()?;

        tracing::info!(basket_id = %basket_row.id, product_id = %product_id, quantity, "Added to basket");
        Ok(BasketPayload {
            basket: basket_row.into(),
        })
    }

    async fn remove_from_basket(&self, ctx: &Context<'_>, line_id: ID) -> Result<SuccessPayload> {
        let user = require_user(ctx, "remove from basket").await?;
        let state = ctx.data::<AppState>()?;
        let line_id = parse_id(&line_id, "line")?;

        let line = basket::get_line(&state.db, line_id, user.id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Line not found."))?;

        let deleted = basket::delete_line(&state.db, line.id).await.db_err()?;
        Ok(deleted.into())
    }

    async fn update_basket_line(
        &self,
        ctx: &Context<'_>,
        line_id: ID,
        quantity: i32,
    ) -> Result<BasketLinePayload> {
        let user = require_user(ctx, "update a basket line").await?;
        let state = ctx.data::<AppState>()?;
        let line_id = parse_id(&line_id, "line")?;

        if quantity <= 0 {
            return Err(Error::new("Quantity must be greater than zero."));
        }

        basket::get_line(&state.db, line_id, user.id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Line not found."))?;

        let row = basket::update_line_quantity(&state.db, line_id, quantity)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Line not found."))?;

        Ok(BasketLinePayload { line: row.into() })
    }
}
