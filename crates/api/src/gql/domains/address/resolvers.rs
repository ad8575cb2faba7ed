use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::keys::address_hash;
use infra::repos::address::{self, UserAddressData};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    Country, CreateUserAddressInput, UpdateUserAddressInput, UserAddress, UserAddressPayload,
};

/// Resolve a country ID to its stored code, or fail with "Invalid country ID."
async fn country_code(state: &AppState, id: &ID) -> Result<String> {
    address::get_country(&state.db, id.as_str().trim())
        .await
        .db_err()?
        .map(|country| country.iso_3166_1_a2)
        .ok_or_else(|| Error::new("Invalid country ID."))
}

fn rehash(mut data: UserAddressData) -> UserAddressData {
    data.hash = address_hash(&data.hash_fields());
    data
}

#[derive(Default)]
pub struct AddressQuery;

#[Object]
impl AddressQuery {
    async fn countries(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Country>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            address::count_countries(&state.db),
            |page| address::list_countries(&state.db, page),
        )
        .await
    }

    async fn user_addresses(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, UserAddress>> {
        let user = require_user(ctx, "view addresses").await?;
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            address::count_user_addresses(&state.db, user.id),
            |page| address::list_user_addresses(&state.db, user.id, page),
        )
        .await
    }

    /// One of the caller's addresses; null for anyone else's.
    async fn user_address(&self, ctx: &Context<'_>, id: ID) -> Result<Option<UserAddress>> {
        let user = require_user(ctx, "view addresses").await?;
        let state = ctx.data::<AppState>()?;
        let address_id = parse_id(&id, "address")?;
        let row = address::get_user_address(&state.db, address_id, user.id)
            .await
            .db_err()?;
        Ok(row.map(UserAddress::from))
    }
}

#[derive(Default)]
pub struct AddressMutation;

#[Object]
impl AddressMutation {
    async fn create_user_address(
        &self,
        ctx: &Context<'_>,
        input: CreateUserAddressInput,
    ) -> Result<UserAddressPayload> {
        let user = require_user(ctx, "create an address").await?;
        let state = ctx.data::<AppState>()?;
        let country_id = country_code(state, &input.country_id).await?;

        let data = rehash(UserAddressData {
            title: input.title.unwrap_or_default(),
            first_name: input.first_name,
            last_name: input.last_name,
            line1: input.line1,
            line2: input.line2.unwrap_or_default(),
            line3: input.line3.unwrap_or_default(),
            line4: input.line4.unwrap_or_default(),
            state: input.state.unwrap_or_default(),
            postcode: input.postcode,
            country_id,
            phone_number: input.phone_number,
            notes: input.notes.unwrap_or_default(),
            is_default_for_shipping: input.is_default_for_shipping,
            is_default_for_billing: input.is_default_for_billing,
            hash: String::new(),
        });

        let mut tx = state.db.begin().await.db_err()?;
        let row = address::create_user_address(&mut *tx, user.id, &data)
            .await
            .db_err()?;
        if row.is_default_for_shipping || row.is_default_for_billing {
            address::clear_other_defaults(
                &mut *tx,
                user.id,
                row.id,
                row.is_default_for_shipping,
                row.is_default_for_billing,
            )
            .await
            .db_err()?;
        }
        tx.commit().await.db_err()?;

        tracing::info!(address_id = %row.id, user_id = %user.id, "User address created");
        Ok(UserAddressPayload {
            address: row.into(),
        })
    }

    async fn update_user_address(
        &self,
        ctx: &Context<'_>,
        input: UpdateUserAddressInput,
    ) -> Result<UserAddressPayload> {
        let user = require_user(ctx, "update an address").await?;
        let state = ctx.data::<AppState>()?;
        let address_id = parse_id(&input.id, "address")?;

        let existing = address::get_user_address(&state.db, address_id, user.id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Address not found."))?;

        let mut data = UserAddressData::from(existing);
        if let Some(country_id) = input.country_id.as_ref() {
            data.country_id = country_code(state, country_id).await?;
        }
        if let Some(v) = input.title {
            data.title = v;
        }
        if let Some(v) = input.first_name {
            data.first_name = v;
        }
        if let Some(v) = input.last_name {
            data.last_name = v;
        }
        if let Some(v) = input.line1 {
            data.line1 = v;
        }
        if let Some(v) = input.line2 {
            data.line2 = v;
        }
        if let Some(v) = input.line3 {
            data.line3 = v;
        }
        if let Some(v) = input.line4 {
            data.line4 = v;
        }
        if let Some(v) = input.state {
            data.state = v;
        }
        if let Some(v) = input.postcode {
            data.postcode = v;
        }
        if input.phone_number.is_some() {
            data.phone_number = input.phone_number;
        }
        if let Some(v) = input.notes {
            data.notes = v;
        }
        if let Some(v) = input.is_default_for_shipping {
            data.is_default_for_shipping = v;
        }
        if let Some(v) = input.is_default_for_billing {
            data.is_default_for_billing = v;
        }
        let data = rehash(data);

        let mut tx = state.db.begin().await.db_err()?;
        let row = address::update_user_address(&mut *tx, address_id, user.id, &data)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Address not found."))?;
        if row.is_default_for_shipping || row.is_default_for_billing {
            address::clear_other_defaults(
                &mut *tx,
                user.id,
                row.id,
                row.is_default_for_shipping,
                row.is_default_for_billing,
            )
            .await
            .db_err()?;
        }
        tx.commit().await.db_err()?;

        Ok(UserAddressPayload {
            address: row.into(),
        })
    }

    async fn delete_user_address(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        let user = require_user(ctx, "delete an address").await?;
        let state = ctx.data::<AppState>()?;
        let address_id = parse_id(&id, "address")?;

        if !address::delete_user_address(&state.db, address_id, user.id)
            .await
            .db_err()?
        {
            return Err(Error::new("Address not found."));
        }

        tracing::info!(address_id = %address_id, "User address deleted");
        Ok(true.into())
    }
}
