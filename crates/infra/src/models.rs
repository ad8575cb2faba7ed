use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ── Customers & addresses ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CountryRow {
    pub iso_3166_1_a2: String,
    pub iso_3166_1_a3: String,
    pub iso_3166_1_numeric: String,
    pub printable_name: String,
    pub name: String,
    pub display_order: i16,
    pub is_shipping_country: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub is_default_for_shipping: bool,
    pub is_default_for_billing: bool,
    pub num_orders_as_shipping_address: i32,
    pub num_orders_as_billing_address: i32,
    pub hash: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductAlertRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub key: String,
    pub status: String,
    pub date_created: DateTime<Utc>,
    pub date_confirmed: Option<DateTime<Utc>>,
    pub date_cancelled: Option<DateTime<Utc>>,
    pub date_closed: Option<DateTime<Utc>>,
}

// ── Catalogue ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductClassRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub requires_shipping: bool,
    pub track_stock: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OptionRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    #[sqlx(rename = "type")]
    pub option_type: String,
    pub required: bool,
    pub option_group_id: Option<Uuid>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttributeOptionGroupRow {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttributeOptionRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub option: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductAttributeRow {
    pub id: Uuid,
    pub product_class_id: Option<Uuid>,
    pub name: String,
    pub code: String,
    #[sqlx(rename = "type")]
    pub attribute_type: String,
    pub required: bool,
    pub option_group_id: Option<Uuid>,
}

/// A category joined with its ancestry (`category_paths` view).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub code: Option<String>,
    pub description: String,
    pub slug: String,
    pub is_public: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub image: Option<String>,
    pub full_name: String,
    pub full_slug: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: Uuid,
    pub structure: String,
    pub parent_id: Option<Uuid>,
    pub upc: Option<String>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub product_class_id: Option<Uuid>,
    pub is_public: bool,
    pub is_discountable: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductCategoryRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductRecommendationRow {
    pub id: Uuid,
    pub primary_id: Uuid,
    pub recommendation_id: Uuid,
    pub ranking: i16,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductAttributeValueRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub attribute_id: Uuid,
    pub value_as_text: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductImageRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub original: String,
    pub caption: String,
    pub display_order: i32,
    pub date_created: DateTime<Utc>,
}

// ── Analytics ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductRecordRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub num_views: i32,
    pub num_basket_additions: i32,
    pub num_purchases: i32,
    pub score: f64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub num_product_views: i32,
    pub num_basket_additions: i32,
    pub num_orders: i32,
    pub num_order_lines: i32,
    pub num_order_items: i32,
    pub total_spent: Decimal,
    pub date_last_order: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProductViewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserSearchRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub date_created: DateTime<Utc>,
}

// ── Basket ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BasketRow {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub status: String,
    pub date_created: DateTime<Utc>,
    pub date_merged: Option<DateTime<Utc>>,
    pub date_submitted: Option<DateTime<Utc>>,
}

/// Aggregates over a basket's lines.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BasketTotalsRow {
    pub num_lines: i64,
    pub num_items: i64,
    pub total_excl_tax: Decimal,
    pub total_incl_tax: Decimal,
    pub is_shipping_required: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BasketLineRow {
    pub id: Uuid,
    pub basket_id: Uuid,
    pub line_reference: String,
    pub product_id: Uuid,
    pub stockrecord_id: Option<Uuid>,
    pub quantity: i32,
    pub price_currency: String,
    pub price_excl_tax: Option<Decimal>,
    pub price_incl_tax: Option<Decimal>,
    pub tax_code: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LineAttributeRow {
    pub id: Uuid,
    pub line_id: Uuid,
    pub option_id: Uuid,
    pub value: String,
}

// ── Communication ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmailRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    pub date_sent: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CommunicationEventTypeRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: String,
    pub email_subject_template: Option<String>,
    pub email_body_template: Option<String>,
    pub email_body_html_template: Option<String>,
    pub sms_template: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub location: String,
    pub date_sent: DateTime<Utc>,
    pub date_read: Option<DateTime<Utc>>,
}

// ── Offers ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RangeRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_public: bool,
    pub includes_all_products: bool,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RangeProductRow {
    pub id: Uuid,
    pub range_id: Uuid,
    pub product_id: Uuid,
    pub display_order: i32,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ConditionRow {
    pub id: Uuid,
    pub range_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    pub condition_type: String,
    pub value: Option<Decimal>,
    pub proxy_class: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BenefitRow {
    pub id: Uuid,
    pub range_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    pub benefit_type: String,
    pub value: Option<Decimal>,
    pub max_affected_items: Option<i32>,
    pub proxy_class: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ConditionalOfferRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub offer_type: String,
    pub exclusive: bool,
    pub status: String,
    pub condition_id: Uuid,
    pub benefit_id: Uuid,
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
}

// ── Orders ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BillingAddressRow {
    pub id: Uuid,
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
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShippingAddressRow {
    pub id: Uuid,
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

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: Uuid,
    pub number: String,
    pub site: Option<String>,
    pub user_id: Option<Uuid>,
    pub billing_address_id: Option<Uuid>,
    pub shipping_address_id: Option<Uuid>,
    pub currency: String,
    pub total_incl_tax: Decimal,
    pub total_excl_tax: Decimal,
    pub shipping_incl_tax: Decimal,
    pub shipping_excl_tax: Decimal,
    pub status: String,
    pub date_placed: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub title: String,
    pub quantity: i32,
    pub line_price_incl_tax: Decimal,
    pub line_price_excl_tax: Decimal,
    pub unit_price_incl_tax: Option<Decimal>,
    pub unit_price_excl_tax: Option<Decimal>,
    pub status: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LinePriceRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub line_id: Uuid,
    pub quantity: i32,
    pub price_incl_tax: Decimal,
    pub price_excl_tax: Decimal,
    pub shipping_incl_tax: Decimal,
    pub shipping_excl_tax: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderNoteRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub note_type: String,
    pub message: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderStatusChangeRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderDiscountRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub category: String,
    pub offer_name: String,
    pub voucher_code: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SurchargeRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub name: String,
    pub incl_tax: Decimal,
    pub excl_tax: Decimal,
}

/// A shipping event joined with its event type.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShippingEventRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub event_type_name: String,
    pub event_type_code: String,
    pub notes: String,
    pub date_created: DateTime<Utc>,
}

/// A payment event joined with its event type.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentEventRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub reference: String,
    pub event_type_name: String,
    pub event_type_code: String,
    pub date_created: DateTime<Utc>,
}

// ── Partners ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PartnerRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PartnerAddressRow {
    pub id: Uuid,
    pub partner_id: Uuid,
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
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StockRecordRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub partner_id: Uuid,
    pub partner_sku: String,
    pub price_currency: String,
    pub price: Option<Decimal>,
    pub num_in_stock: Option<i32>,
    pub num_allocated: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl StockRecordRow {
    /// Stock physically available: in stock minus already allocated.
    pub fn net_stock_level(&self) -> i32 {
        self.num_in_stock.unwrap_or(0) - self.num_allocated.unwrap_or(0)
    }

    pub fn is_below_threshold(&self) -> bool {
        match self.low_stock_threshold {
            Some(threshold) => self.net_stock_level() < threshold,
            None => false,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StockAlertRow {
    pub id: Uuid,
    pub stockrecord_id: Uuid,
    pub threshold: i32,
    pub status: String,
    pub date_created: DateTime<Utc>,
    pub date_closed: Option<DateTime<Utc>>,
}

// ── Payments ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SourceTypeRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SourceRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub source_type_id: Uuid,
    pub currency: String,
    pub amount_allocated: Decimal,
    pub amount_debited: Decimal,
    pub amount_refunded: Decimal,
    pub reference: String,
    pub label: String,
}

impl SourceRow {
    pub fn balance(&self) -> Decimal {
        self.amount_allocated - self.amount_debited + self.amount_refunded
    }

    pub fn amount_available_for_refund(&self) -> Decimal {
        self.amount_debited - self.amount_refunded
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: Uuid,
    pub source_id: Uuid,
    pub txn_type: String,
    pub amount: Decimal,
    pub reference: String,
    pub status: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BankcardRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_type: String,
    pub name: String,
    pub number: String,
    pub expiry_date: NaiveDate,
    pub partner_reference: String,
}

// ── Shipping ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderAndItemChargesRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price_per_order: Decimal,
    pub price_per_item: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WeightBasedRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub weight_attribute: String,
    pub default_weight: Decimal,
    pub num_bands: i64,
    pub top_band_id: Option<Uuid>,
}

/// A weight band with the lower bound of its range, taken from the band
/// below it for the same method.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WeightBandRow {
    pub id: Uuid,
    pub method_id: Uuid,
    pub upper_limit: Decimal,
    pub charge: Decimal,
    pub weight_from: Decimal,
}

// ── Vouchers ──

/// A voucher set with usage totals summed over its vouchers.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VoucherSetRow {
    pub id: Uuid,
    pub name: String,
    pub count: i32,
    pub code_length: i32,
    pub description: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub num_basket_additions: i64,
    pub num_orders: i64,
    pub total_discount: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VoucherRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub usage: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub num_basket_additions: i32,
    pub num_orders: i32,
    pub total_discount: Decimal,
    pub voucher_set_id: Option<Uuid>,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VoucherApplicationRow {
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub user_id: Option<Uuid>,
    pub order_id: Uuid,
    pub date_created: DateTime<Utc>,
}

// ── Wishlists ──

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WishListRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub key: String,
    pub visibility: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WishListLineRow {
    pub id: Uuid,
    pub wishlist_id: Uuid,
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    pub title: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WishListSharedEmailRow {
    pub id: Uuid,
    pub wishlist_id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_record(in_stock: Option<i32>, allocated: Option<i32>, threshold: Option<i32>) -> StockRecordRow {
        StockRecordRow {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            partner_sku: "SKU-1".to_string(),
            price_currency: "GBP".to_string(),
            price: None,
            num_in_stock: in_stock,
            num_allocated: allocated,
            low_stock_threshold: threshold,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    #[test]
    fn net_stock_subtracts_allocations() {
        assert_eq!(stock_record(Some(10), Some(3), None).net_stock_level(), 7);
        assert_eq!(stock_record(None, None, None).net_stock_level(), 0);
    }

    #[test]
    fn threshold_only_applies_when_set() {
        assert!(stock_record(Some(5), Some(2), Some(4)).is_below_threshold());
        assert!(!stock_record(Some(5), Some(1), Some(4)).is_below_threshold());
        assert!(!stock_record(Some(0), None, None).is_below_threshold());
    }

    #[test]
    fn source_balances() {
        let source = SourceRow {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            source_type_id: Uuid::new_v4(),
            currency: "GBP".to_string(),
            amount_allocated: Decimal::new(10000, 2),
            amount_debited: Decimal::new(6000, 2),
            amount_refunded: Decimal::new(1500, 2),
            reference: String::new(),
            label: String::new(),
        };

        assert_eq!(source.balance(), Decimal::new(5500, 2));
        assert_eq!(source.amount_available_for_refund(), Decimal::new(4500, 2));
    }
}
