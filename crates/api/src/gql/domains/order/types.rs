use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{
    BillingAddressRow, LinePriceRow, OrderDiscountRow, OrderLineRow, OrderNoteRow, OrderRow,
    OrderStatusChangeRow, PaymentEventRow, ShippingAddressRow, ShippingEventRow, SurchargeRow,
};
use infra::repos::order;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::address::types::Country;
use crate::gql::domains::catalogue::types::Product;
use crate::gql::domains::customer::types::User;
use crate::gql::error::{DbResultExt, ResultExt};
use crate::gql::loaders::OrderLoader;
use crate::state::AppState;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Order {
    pub id: ID,
    pub number: String,
    pub site: Option<String>,
    pub currency: String,
    pub total_incl_tax: Decimal,
    pub total_excl_tax: Decimal,
    pub shipping_incl_tax: Decimal,
    pub shipping_excl_tax: Decimal,
    pub status: String,
    pub date_placed: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub user_id: Option<Uuid>,
    #[graphql(skip)]
    pub billing_address_id: Option<Uuid>,
    #[graphql(skip)]
    pub shipping_address_id: Option<Uuid>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id.into(),
            number: row.number,
            site: row.site,
            currency: row.currency,
            total_incl_tax: row.total_incl_tax,
            total_excl_tax: row.total_excl_tax,
            shipping_incl_tax: row.shipping_incl_tax,
            shipping_excl_tax: row.shipping_excl_tax,
            status: row.status,
            date_placed: row.date_placed,
            uuid: row.id,
            user_id: row.user_id,
            billing_address_id: row.billing_address_id,
            shipping_address_id: row.shipping_address_id,
        }
    }
}

impl Order {
    pub async fn load(ctx: &Context<'_>, id: Uuid) -> Result<Option<Order>> {
        let loader = ctx.data::<DataLoader<OrderLoader>>()?;
        let row = loader.load_one(id).await.gql_err("Loading order failed")?;
        Ok(row.map(Order::from))
    }
}

#[ComplexObject]
impl Order {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.user_id).await
    }

    async fn billing_address(&self, ctx: &Context<'_>) -> Result<Option<BillingAddress>> {
        let Some(id) = self.billing_address_id else {
            return Ok(None);
        };
        let state = ctx.data::<AppState>()?;
        let row = order::get_billing_address(&state.db, id).await.db_err()?;
        Ok(row.map(BillingAddress::from))
    }

    async fn shipping_address(&self, ctx: &Context<'_>) -> Result<Option<ShippingAddress>> {
        let Some(id) = self.shipping_address_id else {
            return Ok(None);
        };
        let state = ctx.data::<AppState>()?;
        let row = order::get_shipping_address(&state.db, id).await.db_err()?;
        Ok(row.map(ShippingAddress::from))
    }

    async fn lines(&self, ctx: &Context<'_>) -> Result<Vec<OrderLine>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_lines_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn notes(&self, ctx: &Context<'_>) -> Result<Vec<OrderNote>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_notes_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(OrderNote::from).collect())
    }

    async fn discounts(&self, ctx: &Context<'_>) -> Result<Vec<OrderDiscount>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_discounts_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(OrderDiscount::from).collect())
    }

    async fn status_changes(&self, ctx: &Context<'_>) -> Result<Vec<OrderStatusChange>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_status_changes_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(OrderStatusChange::from).collect())
    }

    async fn payment_events(&self, ctx: &Context<'_>) -> Result<Vec<PaymentEvent>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_payment_events_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(PaymentEvent::from).collect())
    }

    async fn shipping_events(&self, ctx: &Context<'_>) -> Result<Vec<ShippingEvent>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_shipping_events_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(ShippingEvent::from).collect())
    }

    async fn surcharges(&self, ctx: &Context<'_>) -> Result<Vec<Surcharge>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_surcharges_for_order(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(Surcharge::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct OrderLine {
    pub id: ID,
    pub title: String,
    pub quantity: i32,
    pub line_price_incl_tax: Decimal,
    pub line_price_excl_tax: Decimal,
    pub unit_price_incl_tax: Option<Decimal>,
    pub unit_price_excl_tax: Option<Decimal>,
    pub status: String,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub order_id: Uuid,
    #[graphql(skip)]
    pub product_id: Option<Uuid>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: row.id.into(),
            title: row.title,
            quantity: row.quantity,
            line_price_incl_tax: row.line_price_incl_tax,
            line_price_excl_tax: row.line_price_excl_tax,
            unit_price_incl_tax: row.unit_price_incl_tax,
            unit_price_excl_tax: row.unit_price_excl_tax,
            status: row.status,
            uuid: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
        }
    }
}

#[ComplexObject]
impl OrderLine {
    async fn order(&self, ctx: &Context<'_>) -> Result<Option<Order>> {
        Order::load(ctx, self.order_id).await
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load_opt(ctx, self.product_id).await
    }

    async fn prices(&self, ctx: &Context<'_>) -> Result<Vec<LinePrice>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_prices_for_line(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(LinePrice::from).collect())
    }
}

/// The price paid for some quantity of a line.
#[derive(SimpleObject, Clone)]
pub struct LinePrice {
    pub id: ID,
    pub quantity: i32,
    pub price_incl_tax: Decimal,
    pub price_excl_tax: Decimal,
    pub shipping_incl_tax: Decimal,
    pub shipping_excl_tax: Decimal,
}

impl From<LinePriceRow> for LinePrice {
    fn from(row: LinePriceRow) -> Self {
        Self {
            id: row.id.into(),
            quantity: row.quantity,
            price_incl_tax: row.price_incl_tax,
            price_excl_tax: row.price_excl_tax,
            shipping_incl_tax: row.shipping_incl_tax,
            shipping_excl_tax: row.shipping_excl_tax,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct OrderNote {
    pub id: ID,
    pub note_type: String,
    pub message: String,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub order_id: Uuid,
    #[graphql(skip)]
    pub user_id: Option<Uuid>,
}

impl From<OrderNoteRow> for OrderNote {
    fn from(row: OrderNoteRow) -> Self {
        Self {
            id: row.id.into(),
            note_type: row.note_type,
            message: row.message,
            date_created: row.date_created,
            order_id: row.order_id,
            user_id: row.user_id,
        }
    }
}

#[ComplexObject]
impl OrderNote {
    async fn order(&self, ctx: &Context<'_>) -> Result<Option<Order>> {
        Order::load(ctx, self.order_id).await
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.user_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct OrderStatusChange {
    pub id: ID,
    pub old_status: String,
    pub new_status: String,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub order_id: Uuid,
}

impl From<OrderStatusChangeRow> for OrderStatusChange {
    fn from(row: OrderStatusChangeRow) -> Self {
        Self {
            id: row.id.into(),
            old_status: row.old_status,
            new_status: row.new_status,
            date_created: row.date_created,
            order_id: row.order_id,
        }
    }
}

#[ComplexObject]
impl OrderStatusChange {
    async fn order(&self, ctx: &Context<'_>) -> Result<Option<Order>> {
        Order::load(ctx, self.order_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct OrderDiscount {
    pub id: ID,
    pub category: String,
    pub offer_name: String,
    pub voucher_code: String,
    pub amount: Decimal,
    #[graphql(skip)]
    pub order_id: Uuid,
}

impl From<OrderDiscountRow> for OrderDiscount {
    fn from(row: OrderDiscountRow) -> Self {
        Self {
            id: row.id.into(),
            category: row.category,
            offer_name: row.offer_name,
            voucher_code: row.voucher_code,
            amount: row.amount,
            order_id: row.order_id,
        }
    }
}

#[ComplexObject]
impl OrderDiscount {
    async fn order(&self, ctx: &Context<'_>) -> Result<Option<Order>> {
        Order::load(ctx, self.order_id).await
    }
}

#[derive(SimpleObject, Clone)]
pub struct Surcharge {
    pub id: ID,
    pub name: String,
    pub incl_tax: Decimal,
    pub excl_tax: Decimal,
}

impl From<SurchargeRow> for Surcharge {
    fn from(row: SurchargeRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            incl_tax: row.incl_tax,
            excl_tax: row.excl_tax,
        }
    }
}

/// Name and code of a payment or shipping event type.
#[derive(SimpleObject, Clone)]
pub struct EventType {
    pub name: String,
    pub code: String,
}

#[derive(SimpleObject, Clone)]
pub struct PaymentEvent {
    pub id: ID,
    pub amount: Decimal,
    pub reference: String,
    pub event_type: EventType,
    pub date_created: DateTime<Utc>,
}

impl From<PaymentEventRow> for PaymentEvent {
    fn from(row: PaymentEventRow) -> Self {
        Self {
            id: row.id.into(),
            amount: row.amount,
            reference: row.reference,
            event_type: EventType {
                name: row.event_type_name,
                code: row.event_type_code,
            },
            date_created: row.date_created,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ShippingEvent {
    pub id: ID,
    pub event_type: EventType,
    pub notes: String,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl From<ShippingEventRow> for ShippingEvent {
    fn from(row: ShippingEventRow) -> Self {
        Self {
            id: row.id.into(),
            event_type: EventType {
                name: row.event_type_name,
                code: row.event_type_code,
            },
            notes: row.notes,
            date_created: row.date_created,
            uuid: row.id,
        }
    }
}

#[ComplexObject]
impl ShippingEvent {
    /// Lines covered by this event.
    async fn lines(&self, ctx: &Context<'_>) -> Result<Vec<OrderLine>> {
        let state = ctx.data::<AppState>()?;
        let rows = order::list_lines_for_shipping_event(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(OrderLine::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct BillingAddress {
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

impl From<BillingAddressRow> for BillingAddress {
    fn from(row: BillingAddressRow) -> Self {
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
impl BillingAddress {
    async fn country(&self, ctx: &Context<'_>) -> Result<Option<Country>> {
        Country::load(ctx, &self.country_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ShippingAddress {
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
    pub phone_number: Option<String>,
    pub notes: String,
    #[graphql(skip)]
    pub country_id: String,
}

impl From<ShippingAddressRow> for ShippingAddress {
    fn from(row: ShippingAddressRow) -> Self {
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
            phone_number: row.phone_number,
            notes: row.notes,
            country_id: row.country_id,
        }
    }
}

#[ComplexObject]
impl ShippingAddress {
    async fn country(&self, ctx: &Context<'_>) -> Result<Option<Country>> {
        Country::load(ctx, &self.country_id).await
    }
}

#[derive(InputObject)]
pub struct CreateOrderInput {
    pub user_id: ID,
    pub billing_address_id: ID,
    pub shipping_address_id: ID,
    pub total_incl_tax: Decimal,
    pub total_excl_tax: Decimal,
    pub shipping_incl_tax: Decimal,
    pub shipping_excl_tax: Decimal,
    pub currency: String,
    /// Defaults to "Pending".
    pub status: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateOrderStatusInput {
    pub id: ID,
    pub status: String,
}

#[derive(InputObject)]
pub struct AddOrderNoteInput {
    pub order_id: ID,
    pub user_id: ID,
    pub message: String,
}

/// Used for both billing and shipping addresses; phone number and notes are
/// ignored for billing addresses.
#[derive(InputObject)]
pub struct OrderAddressInput {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub line4: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country_id: ID,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(SimpleObject)]
pub struct OrderPayload {
    pub order: Order,
}

#[derive(SimpleObject)]
pub struct OrderNotePayload {
    pub order_note: OrderNote,
}

#[derive(SimpleObject)]
pub struct ShippingAddressPayload {
    pub shipping_address: ShippingAddress,
}

#[derive(SimpleObject)]
pub struct BillingAddressPayload {
    pub billing_address: BillingAddress,
}
