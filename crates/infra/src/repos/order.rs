use rust_decimal::Decimal;
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{
        BillingAddressRow, LinePriceRow, OrderDiscountRow, OrderLineRow, OrderNoteRow, OrderRow,
        OrderStatusChangeRow, PaymentEventRow, ShippingAddressRow, ShippingEventRow, SurchargeRow,
    },
    pagination::LimitOffset,
};

pub const DEFAULT_ORDER_STATUS: &str = "Pending";

#[derive(Debug, Clone)]
pub struct CreateOrderData {
    pub user_id: Uuid,
    pub billing_address_id: Uuid,
    pub shipping_address_id: Uuid,
    pub currency: String,
    pub total_incl_tax: Decimal,
    pub total_excl_tax: Decimal,
    pub shipping_incl_tax: Decimal,
    pub shipping_excl_tax: Decimal,
    pub status: String,
}

/// Columns shared by billing and shipping addresses. Phone and notes are
/// only stored for shipping addresses.
#[derive(Debug, Clone, Default)]
pub struct OrderAddressData {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    pub state: String,
    pub postcode: String,
    pub country_id: String,
    pub phone_number: Option<String>,
    pub notes: String,
}

// ── Orders ──

pub async fn list_orders<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, number, site, user_id, billing_address_id, shipping_address_id, currency,
               total_incl_tax, total_excl_tax, shipping_incl_tax, shipping_excl_tax, status,
               date_placed
        FROM orders
        ORDER BY date_placed DESC, number DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_orders<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(executor)
        .await
}

pub async fn get_order<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, number, site, user_id, billing_address_id, shipping_address_id, currency,
               total_incl_tax, total_excl_tax, shipping_incl_tax, shipping_excl_tax, status,
               date_placed
        FROM orders
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_orders_by_ids<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[Uuid],
) -> SqlxResult<Vec<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, number, site, user_id, billing_address_id, shipping_address_id, currency,
               total_incl_tax, total_excl_tax, shipping_incl_tax, shipping_excl_tax, status,
               date_placed
        FROM orders
        WHERE id = ANY($1::uuid[])
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

/// Order numbers come from `order_number_seq`.
pub async fn create_order<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateOrderData,
) -> SqlxResult<OrderRow> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        INSERT INTO orders (number, user_id, billing_address_id, shipping_address_id, currency,
                            total_incl_tax, total_excl_tax, shipping_incl_tax, shipping_excl_tax,
                            status)
        VALUES (nextval('order_number_seq')::TEXT, $1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, number, site, user_id, billing_address_id, shipping_address_id, currency,
                  total_incl_tax, total_excl_tax, shipping_incl_tax, shipping_excl_tax, status,
                  date_placed
        "#,
    )
    .bind(data.user_id)
    .bind(data.billing_address_id)
    .bind(data.shipping_address_id)
    .bind(&data.currency)
    .bind(data.total_incl_tax)
    .bind(data.total_excl_tax)
    .bind(data.shipping_incl_tax)
    .bind(data.shipping_excl_tax)
    .bind(&data.status)
    .fetch_one(executor)
    .await
}

pub async fn set_order_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: &str,
) -> SqlxResult<Option<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        UPDATE orders
        SET status = $2
        WHERE id = $1
        RETURNING id, number, site, user_id, billing_address_id, shipping_address_id, currency,
                  total_incl_tax, total_excl_tax, shipping_incl_tax, shipping_excl_tax, status,
                  date_placed
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(executor)
    .await
}

pub async fn create_status_change<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
    old_status: &str,
    new_status: &str,
) -> SqlxResult<OrderStatusChangeRow> {
    sqlx::query_as::<_, OrderStatusChangeRow>(
        r#"
        INSERT INTO order_status_changes (order_id, old_status, new_status)
        VALUES ($1, $2, $3)
        RETURNING id, order_id, old_status, new_status, date_created
        "#,
    )
    .bind(order_id)
    .bind(old_status)
    .bind(new_status)
    .fetch_one(executor)
    .await
}

pub async fn list_status_changes_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<OrderStatusChangeRow>> {
    sqlx::query_as::<_, OrderStatusChangeRow>(
        r#"
        SELECT id, order_id, old_status, new_status, date_created
        FROM order_status_changes
        WHERE order_id = $1
        ORDER BY date_created ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

// ── Lines ──

pub async fn list_order_lines<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<OrderLineRow>> {
    sqlx::query_as::<_, OrderLineRow>(
        r#"
        SELECT id, order_id, product_id, title, quantity, line_price_incl_tax,
               line_price_excl_tax, unit_price_incl_tax, unit_price_excl_tax, status
        FROM order_lines
        ORDER BY order_id ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_order_lines<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
        .fetch_one(executor)
        .await
}

pub async fn get_order_line<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<OrderLineRow>> {
    sqlx::query_as::<_, OrderLineRow>(
        r#"
        SELECT id, order_id, product_id, title, quantity, line_price_incl_tax,
               line_price_excl_tax, unit_price_incl_tax, unit_price_excl_tax, status
        FROM order_lines
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_lines_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<OrderLineRow>> {
    sqlx::query_as::<_, OrderLineRow>(
        r#"
        SELECT id, order_id, product_id, title, quantity, line_price_incl_tax,
               line_price_excl_tax, unit_price_incl_tax, unit_price_excl_tax, status
        FROM order_lines
        WHERE order_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

pub async fn list_prices_for_line<'e>(
    executor: impl PgExecutor<'e>,
    line_id: Uuid,
) -> SqlxResult<Vec<LinePriceRow>> {
    sqlx::query_as::<_, LinePriceRow>(
        r#"
        SELECT id, order_id, line_id, quantity, price_incl_tax, price_excl_tax,
               shipping_incl_tax, shipping_excl_tax
        FROM line_prices
        WHERE line_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(line_id)
    .fetch_all(executor)
    .await
}

// ── Addresses ──

pub async fn list_shipping_addresses<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<ShippingAddressRow>> {
    sqlx::query_as::<_, ShippingAddressRow>(
        r#"
        SELECT id, title, first_name, last_name, line1, line2, line3, line4, state, postcode,
               country_id, phone_number, notes
        FROM shipping_addresses
        ORDER BY id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_shipping_addresses<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM shipping_addresses")
        .fetch_one(executor)
        .await
}

pub async fn get_shipping_address<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<ShippingAddressRow>> {
    sqlx::query_as::<_, ShippingAddressRow>(
        r#"
        SELECT id, title, first_name, last_name, line1, line2, line3, line4, state, postcode,
               country_id, phone_number, notes
        FROM shipping_addresses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_shipping_address<'e>(
    executor: impl PgExecutor<'e>,
    data: &OrderAddressData,
) -> SqlxResult<ShippingAddressRow> {
    sqlx::query_as::<_, ShippingAddressRow>(
        r#"
        INSERT INTO shipping_addresses (title, first_name, last_name, line1, line2, line3, line4,
                                        state, postcode, country_id, phone_number, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, title, first_name, last_name, line1, line2, line3, line4, state, postcode,
                  country_id, phone_number, notes
        "#,
    )
    .bind(&data.title)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.line1)
    .bind(&data.line2)
    .bind(&data.line3)
    .bind(&data.line4)
    .bind(&data.state)
    .bind(&data.postcode)
    .bind(&data.country_id)
    .bind(&data.phone_number)
    .bind(&data.notes)
    .fetch_one(executor)
    .await
}

pub async fn list_billing_addresses<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<BillingAddressRow>> {
    sqlx::query_as::<_, BillingAddressRow>(
        r#"
        SELECT id, title, first_name, last_name, line1, line2, line3, line4, state, postcode,
               country_id
        FROM billing_addresses
        ORDER BY id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_billing_addresses<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM billing_addresses")
        .fetch_one(executor)
        .await
}

pub async fn get_billing_address<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BillingAddressRow>> {
    sqlx::query_as::<_, BillingAddressRow>(
        r#"
        SELECT id, title, first_name, last_name, line1, line2, line3, line4, state, postcode,
               country_id
        FROM billing_addresses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_billing_address<'e>(
    executor: impl PgExecutor<'e>,
    data: &OrderAddressData,
) -> SqlxResult<BillingAddressRow> {
    sqlx::query_as::<_, BillingAddressRow>(
        r#"
        INSERT INTO billing_addresses (title, first_name, last_name, line1, line2, line3, line4,
                                       state, postcode, country_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, title, first_name, last_name, line1, line2, line3, line4, state, postcode,
                  country_id
        "#,
    )
    .bind(&data.title)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.line1)
    .bind(&data.line2)
    .bind(&data.line3)
    .bind(&data.line4)
    .bind(&data.state)
    .bind(&data.postcode)
    .bind(&data.country_id)
    .fetch_one(executor)
    .await
}

// ── Notes ──

pub async fn list_order_notes<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<OrderNoteRow>> {
    sqlx::query_as::<_, OrderNoteRow>(
        r#"
        SELECT id, order_id, user_id, note_type, message, date_created
        FROM order_notes
        ORDER BY date_created DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_order_notes<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_notes")
        .fetch_one(executor)
        .await
}

pub async fn list_notes_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<OrderNoteRow>> {
    sqlx::query_as::<_, OrderNoteRow>(
        r#"
        SELECT id, order_id, user_id, note_type, message, date_created
        FROM order_notes
        WHERE order_id = $1
        ORDER BY date_created ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

pub async fn create_order_note<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
    user_id: Uuid,
    message: &str,
) -> SqlxResult<OrderNoteRow> {
    sqlx::query_as::<_, OrderNoteRow>(
        r#"
        INSERT INTO order_notes (order_id, user_id, message)
        VALUES ($1, $2, $3)
        RETURNING id, order_id, user_id, note_type, message, date_created
        "#,
    )
    .bind(order_id)
    .bind(user_id)
    .bind(message)
    .fetch_one(executor)
    .await
}

// ── Discounts, surcharges, events ──

pub async fn list_discounts<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<OrderDiscountRow>> {
    sqlx::query_as::<_, OrderDiscountRow>(
        r#"
        SELECT id, order_id, category, offer_name, voucher_code, amount
        FROM order_discounts
        ORDER BY order_id ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_discounts<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_discounts")
        .fetch_one(executor)
        .await
}

pub async fn list_discounts_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<OrderDiscountRow>> {
    sqlx::query_as::<_, OrderDiscountRow>(
        r#"
        SELECT id, order_id, category, offer_name, voucher_code, amount
        FROM order_discounts
        WHERE order_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

pub async fn list_surcharges_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<SurchargeRow>> {
    sqlx::query_as::<_, SurchargeRow>(
        r#"
        SELECT id, order_id, name, incl_tax, excl_tax
        FROM surcharges
        WHERE order_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

pub async fn list_shipping_events_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<ShippingEventRow>> {
    sqlx::query_as::<_, ShippingEventRow>(
        r#"
        SELECT e.id, e.order_id, t.name AS event_type_name, t.code AS event_type_code,
               e.notes, e.date_created
        FROM shipping_events e
        JOIN shipping_event_types t ON t.id = e.event_type_id
        WHERE e.order_id = $1
        ORDER BY e.date_created ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

pub async fn list_lines_for_shipping_event<'e>(
    executor: impl PgExecutor<'e>,
    event_id: Uuid,
) -> SqlxResult<Vec<OrderLineRow>> {
    sqlx::query_as::<_, OrderLineRow>(
        r#"
        SELECT l.id, l.order_id, l.product_id, l.title, l.quantity, l.line_price_incl_tax,
               l.line_price_excl_tax, l.unit_price_incl_tax, l.unit_price_excl_tax, l.status
        FROM order_lines l
        JOIN shipping_event_quantities q ON q.line_id = l.id
        WHERE q.event_id = $1
        ORDER BY l.id ASC
        "#,
    )
    .bind(event_id)
    .fetch_all(executor)
    .await
}

pub async fn list_payment_events_for_order<'e>(
    executor: impl PgExecutor<'e>,
    order_id: Uuid,
) -> SqlxResult<Vec<PaymentEventRow>> {
    sqlx::query_as::<_, PaymentEventRow>(
        r#"
        SELECT e.id, e.order_id, e.amount, e.reference, t.name AS event_type_name,
               t.code AS event_type_code, e.date_created
        FROM payment_events e
        JOIN payment_event_types t ON t.id = e.event_type_id
        WHERE e.order_id = $1
        ORDER BY e.date_created ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}
