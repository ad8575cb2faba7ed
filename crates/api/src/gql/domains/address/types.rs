use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{CountryRow, UserAddressRow};
use uuid::Uuid;

use crate::gql::domains::customer::types::User;
use crate::gql::error::ResultExt;
use crate::gql::loaders::CountryLoader;

/// Countries are identified by their ISO 3166-1 alpha-2 code.
#[derive(SimpleObject, Clone)]
pub struct Country {
    pub id: ID,
    pub iso_3166_1_a2: String,
    pub iso_3166_1_a3: String,
    pub iso_3166_1_numeric: String,
    pub printable_name: String,
    pub name: String,
    pub display_order: i32,
    pub is_shipping_country: bool,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Self {
            id: ID(row.iso_3166_1_a2.clone()),
            iso_3166_1_a2: row.iso_3166_1_a2,
            iso_3166_1_a3: row.iso_3166_1_a3,
            iso_3166_1_numeric: row.iso_3166_1_numeric,
            printable_name: row.printable_name,
            name: row.name,
            display_order: row.display_order.into(),
            is_shipping_country: row.is_shipping_country,
        }
    }
}

impl Country {
    pub async fn load(ctx: &Context<'_>, code: &str) -> Result<Option<Country>> {
        let loader = ctx.data::<DataLoader<CountryLoader>>()?;
        let row = loader
            .load_one(code.to_uppercase())
            .await
            .gql_err("Loading country failed")?;
        Ok(row.map(Country::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct UserAddress {
    pub id: ID,
    pub is_default_for_shipping: bool,
    pub is_default_for_billing: bool,
    pub num_orders_as_shipping_address: i32,
    pub num_orders_as_billing_address: i32,
    /// Fingerprint of the address summary, shared by duplicate addresses.
    pub hash: String,
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
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub user_id: Uuid,
    #[graphql(skip)]
    pub country_id: String,
}

impl From<UserAddressRow> for UserAddress {
    fn from(row: UserAddressRow) -> Self {
        Self {
            id: row.id.into(),
            is_default_for_shipping: row.is_default_for_shipping,
            is_default_for_billing: row.is_default_for_billing,
            num_orders_as_shipping_address: row.num_orders_as_shipping_address,
            num_orders_as_billing_address: row.num_orders_as_billing_address,
            hash: row.hash,
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
            date_created: row.date_created,
            user_id: row.user_id,
            country_id: row.country_id,
        }
    }
}

#[ComplexObject]
impl UserAddress {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.user_id).await
    }

    async fn country(&self, ctx: &Context<'_>) -> Result<Option<Country>> {
        Country::load(ctx, &self.country_id).await
    }
}

#[derive(InputObject)]
pub struct CreateUserAddressInput {
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub line4: Option<String>,
    pub state: Option<String>,
    pub postcode: String,
    pub country_id: ID,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
    #[graphql(default)]
    pub is_default_for_shipping: bool,
    #[graphql(default)]
    pub is_default_for_billing: bool,
}

#[derive(InputObject)]
pub struct UpdateUserAddressInput {
    pub id: ID,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub line4: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country_id: Option<ID>,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
    pub is_default_for_shipping: Option<bool>,
    pub is_default_for_billing: Option<bool>,
}

#[derive(SimpleObject)]
pub struct UserAddressPayload {
    pub address: UserAddress,
}
