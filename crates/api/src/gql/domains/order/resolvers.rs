use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::{
    address, customer,
    order::{self, CreateOrderData, OrderAddressData, DEFAULT_ORDER_STATUS},
};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    AddOrderNoteInput, BillingAddress, BillingAddressPayload, CreateOrderInput, Order,
    OrderAddressInput, OrderDiscount, OrderLine, OrderNote, OrderNotePayload, OrderPayload,
    ShippingAddress, ShippingAddressPayload, UpdateOrderStatusInput,
};

impl OrderAddressInput {
    /// Validate the country and flatten into row data.
    async fn into_data(self, state: &AppState) -> Result<OrderAddressData> {
        let country = address::get_country(&state.db, self.country_id.as_str().trim())
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Invalid country ID."))?;

        Ok(OrderAddressData {
            title: self.title.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            line1: self.line1,
            line2: self.line2.unwrap_or_default(),
            line3: self.line3.unwrap_or_default(),
            line4: self.line4.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            postcode: self.postcode.unwrap_or_default(),
            country_id: country.iso_3166_1_a2,
            phone_number: self.phone_number,
            notes: self.notes.unwrap_or_default(),
        })
    }
}

#[derive(Default)]
pub struct OrderQuery;

#[Object]
impl OrderQuery {
    async fn orders(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Order>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            order::count_orders(&state.db),
            |page| order::list_orders(&state.db, page),
        )
        .await
    }

    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Order>> {
        let state = ctx.data::<AppState>()?;
        let order_id = parse_id(&id, "order")?;
        let row = order::get_order(&state.db, order_id).await.db_err()?;
        Ok(row.map(Order::from))
    }

    async fn order_lines(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, OrderLine>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            order::count_order_lines(&state.db),
            |page| order::list_order_lines(&state.db, page),
        )
        .await
    }

    async fn order_line(&self, ctx: &Context<'_>, id: ID) -> Result<Option<OrderLine>> {
        let state = ctx.data::<AppState>()?;
        let line_id = parse_id(&id, "order line")?;
        let row = order::get_order_line(&state.db, line_id).await.db_err()?;
        Ok(row.map(OrderLine::from))
    }

    async fn shipping_addresses(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, ShippingAddress>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            order::count_shipping_addresses(&state.db),
            |page| order::list_shipping_addresses(&state.db, page),
        )
        .await
    }

    async fn billing_addresses(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, BillingAddress>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            order::count_billing_addresses(&state.db),
            |page| order::list_billing_addresses(&state.db, page),
        )
        .await
    }

    async fn order_notes(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, OrderNote>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            order::count_order_notes(&state.db),
            |page| order::list_order_notes(&state.db, page),
        )
        .await
    }

    async fn discounts(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, OrderDiscount>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            order::count_discounts(&state.db),
            |page| order::list_discounts(&state.db, page),
        )
        .await
    }
}

#[derive(Default)]
pub struct OrderMutation;

#[Object]
impl OrderMutation {
    async fn create_order(&self, ctx: &Context<'_>, input: CreateOrderInput) -> Result<OrderPayload> {
        require_user(ctx, "create an order").await?;
        let state = ctx.data::<AppState>()?;

        let invalid = || Error::new("Invalid user or address IDs");
        let user_id = parse_id(&input.user_id, "user").map_err(|_| invalid())?;
        let billing_address_id =
            parse_id(&input.billing_address_id, "billing address").map_err(|_| invalid())?;
        let shipping_address_id =
            parse_id(&input.shipping_address_id, "shipping address").map_err(|_| invalid())?;

        let user = customer::get_user(&state.db, user_id).await.db_err()?;
        let billing = order::get_billing_address(&state.db, billing_address_id)
            .await
            .db_err()?;
        let shipping = order::get_shipping_address(&state.db, shipping_address_id)
            .await
            .db_err()?;
        if user.is_none() || billing.is_none() || shipping.is_none() {
            return Err(invalid());
        }

        let status = input
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string());

        let row = order::create_order(
            &state.db,
            CreateOrderData {
                user_id,
                billing_address_id,
                shipping_address_id,
                currency: input.currency,
                total_incl_tax: input.total_incl_tax,
                total_excl_tax: input.total_excl_tax,
                shipping_incl_tax: input.shipping_incl_tax,
                shipping_excl_tax: input.shipping_excl_tax,
                status,
            },
        )
        .await
        .db_err()?;

        tracing::info!(order_id = %row.id, number = %row.number, "Order created");
        Ok(OrderPayload { order: row.into() })
    }

    /// Set an order's status, recording the change when it differs from the
    /// current one.
    async fn update_order_status(
        &self,
        ctx: &Context<'_>,
        input: UpdateOrderStatusInput,
    ) -> Result<OrderPayload> {
        require_user(ctx, "update an order").await?;
        let state = ctx.data::<AppState>()?;
        let order_id = parse_id(&input.id, "order")?;

        let mut tx = state.db.begin().await.db_err()?;
        let current = order::get_order(&mut *tx, order_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Order not found"))?;

        if current.status == input.status {
            tx.commit().await.db_err()?;
            return Ok(OrderPayload {
                order: current.into(),
            });
        }

        let row = order::set_order_status(&mut *tx, order_id, &input.status)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Order not found"))?;
        order::create_status_change(&mut *tx, order_id, &current.status, &row.status)
            .await
            .db_err()?;
        tx.commit().await.db_err()?;

        tracing::info!(
            order_id = %order_id,
            old_status = %current.status,
            new_status = %row.status,
            "Order status changed"
        );
        Ok(OrderPayload { order: row.into() })
    }

    async fn add_order_note(
        &self,
        ctx: &Context<'_>,
        input: AddOrderNoteInput,
    ) -> Result<OrderNotePayload> {
        require_user(ctx, "add an order note").await?;
        let state = ctx.data::<AppState>()?;

        let not_found = || Error::new("Order or User not found");
        let order_id = parse_id(&input.order_id, "order").map_err(|_| not_found())?;
        let user_id = parse_id(&input.user_id, "user").map_err(|_| not_found())?;

        let order_row = order::get_order(&state.db, order_id).await.db_err()?;
        let user = customer::get_user(&state.db, user_id).await.db_err()?;
        if order_row.is_none() || user.is_none() {
            return Err(not_found());
        }

        let row = order::create_order_note(&state.db, order_id, user_id, &input.message)
            .await
            .db_err()?;

        Ok(OrderNotePayload {
            order_note: row.into(),
        })
    }

    async fn create_shipping_address(
        &self,
        ctx: &Context<'_>,
        input: OrderAddressInput,
    ) -> Result<ShippingAddressPayload> {
        require_user(ctx, "create a shipping address").await?;
        let state = ctx.data::<AppState>()?;
        let data = input.into_data(state).await?;

        let row = order::create_shipping_address(&state.db, &data)
            .await
            .db_err()?;

        Ok(ShippingAddressPayload {
            shipping_address: row.into(),
        })
    }

    async fn create_billing_address(
        &self,
        ctx: &Context<'_>,
        input: OrderAddressInput,
    ) -> Result<BillingAddressPayload> {
        require_user(ctx, "create a billing address").await?;
        let state = ctx.data::<AppState>()?;
        let data = input.into_data(state).await?;

        let row = order::create_billing_address(&state.db, &data)
            .await
            .db_err()?;

        Ok(BillingAddressPayload {
            billing_address: row.into(),
        })
    }
}
