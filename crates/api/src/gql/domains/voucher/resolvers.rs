use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::{
    customer, order,
    voucher::{self, CreateVoucherData, UpdateVoucherData},
    VoucherUsage,
};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    CreateVoucherApplicationInput, CreateVoucherInput, UpdateVoucherInput, Voucher,
    VoucherApplication, VoucherPayload, VoucherSet,
};

fn parse_usage(value: &str) -> Result<VoucherUsage> {
    value.parse::<VoucherUsage>().map_err(Error::new)
}

#[derive(Default)]
pub struct VoucherQuery;

#[Object]
impl VoucherQuery {
    async fn voucher_sets(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, VoucherSet>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            voucher::count_voucher_sets(&state.db),
            |page| voucher::list_voucher_sets(&state.db, page),
        )
        .await
    }

    async fn voucher_set(&self, ctx: &Context<'_>, id: ID) -> Result<Option<VoucherSet>> {
        let state = ctx.data::<AppState>()?;
        let set_id = parse_id(&id, "voucher set")?;
        let row = voucher::get_voucher_set(&state.db, set_id).await.db_err()?;
        Ok(row.map(VoucherSet::from))
    }

    async fn vouchers(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Voucher>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            voucher::count_vouchers(&state.db),
            |page| voucher::list_vouchers(&state.db, page),
        )
        .await
    }

    /// Case-insensitive lookup; null when no voucher has the code.
    async fn voucher_by_code(&self, ctx: &Context<'_>, code: String) -> Result<Option<Voucher>> {
        let state = ctx.data::<AppState>()?;
        let row = voucher::get_voucher_by_code(&state.db, &code)
            .await
            .db_err()?;
        Ok(row.map(Voucher::from))
    }

    async fn voucher_applications(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, VoucherApplication>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            voucher::count_applications(&state.db, None),
            |page| voucher::list_applications(&state.db, None, page),
        )
        .await
    }

    async fn voucher_applications_by_voucher(
        &self,
        ctx: &Context<'_>,
        voucher_id: ID,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, VoucherApplication>> {
        let state = ctx.data::<AppState>()?;
        let voucher_id = parse_id(&voucher_id, "voucher")?;
        paginate(
            after,
            before,
            first,
            last,
            voucher::count_applications(&state.db, Some(voucher_id)),
            |page| voucher::list_applications(&state.db, Some(voucher_id), page),
        )
        .await
    }
}

#[derive(Default)]
pub struct VoucherMutation;

#[Object]
impl VoucherMutation {
    /// Record a voucher being used on an order. Reports `success: false`
    /// instead of an error when the voucher, order or user is missing.
    async fn create_voucher_application(
        &self,
        ctx: &Context<'_>,
        input: CreateVoucherApplicationInput,
    ) -> Result<SuccessPayload> {
        require_user(ctx, "apply a voucher").await?;
        let state = ctx.data::<AppState>()?;

        let (Ok(voucher_id), Ok(order_id)) = (
            parse_id(&input.voucher_id, "voucher"),
            parse_id(&input.order_id, "order"),
        ) else {
            return Ok(false.into());
        };
        let user_id = match input.user_id.as_ref().map(|id| parse_id(id, "user")) {
            Some(Ok(id)) => Some(id),
            Some(Err(_)) => return Ok(false.into()),
            None => None,
        };

        let voucher_exists = voucher::get_voucher(&state.db, voucher_id)
            .await
            .db_err()?
            .is_some();
        let order_exists = order::get_order(&state.db, order_id)
            .await
            .db_err()?
            .is_some();
        let user_exists = match user_id {
            Some(id) => customer::get_user(&state.db, id).await.db_err()?.is_some(),
            None => true,
        };
        if !(voucher_exists && order_exists && user_exists) {
            return Ok(false.into());
        }

        let mut tx = state.db.begin().await.db_err()?;
        voucher::create_application(&mut *tx, voucher_id, order_id, user_id)
            .await
            .db_err()?;
        voucher::record_voucher_order(&mut *tx, voucher_id)
            .await
            .db_err()?;
        tx.commit().await.db_err()?;

        Ok(true.into())
    }

    async fn create_voucher(
        &self,
        ctx: &Context<'_>,
        input: CreateVoucherInput,
    ) -> Result<VoucherPayload> {
        require_user(ctx, "create a voucher").await?;
        let state = ctx.data::<AppState>()?;
        let usage = parse_usage(&input.usage)?;

        let voucher_set_id = match input.voucher_set_id.as_ref() {
            Some(id) => {
                let set_id = parse_id(id, "voucher set")?;
                voucher::get_voucher_set(&state.db, set_id)
                    .await
                    .db_err()?
                    .ok_or_else(|| Error::new("Voucher Set not found"))?;
                Some(set_id)
            }
            None => None,
        };

        let row = voucher::create_voucher(
            &state.db,
            CreateVoucherData {
                name: input.name,
                code: input.code,
                usage,
                start_datetime: input.start_datetime,
                end_datetime: input.end_datetime,
                voucher_set_id,
            },
        )
        .await
        .db_err()?;

        tracing::info!(voucher_id = %row.id, code = %row.code, "Voucher created");
        Ok(VoucherPayload {
            voucher: row.into(),
        })
    }

    async fn update_voucher(
        &self,
        ctx: &Context<'_>,
        input: UpdateVoucherInput,
    ) -> Result<VoucherPayload> {
        require_user(ctx, "update a voucher").await?;
        let state = ctx.data::<AppState>()?;
        let voucher_id = parse_id(&input.id, "voucher")?;

        let usage = input.usage.as_deref().map(parse_usage).transpose()?;
        let data = UpdateVoucherData {
            name: input.name.filter(|s| !s.is_empty()),
            code: input.code.filter(|s| !s.trim().is_empty()),
            usage,
            start_datetime: input.start_datetime,
            end_datetime: input.end_datetime,
        };

        let row = voucher::update_voucher(&state.db, voucher_id, data)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Voucher not found"))?;

        Ok(VoucherPayload {
            voucher: row.into(),
        })
    }

    /// `success: false` when there is no such voucher.
    async fn delete_voucher(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        require_user(ctx, "delete a voucher").await?;
        let state = ctx.data::<AppState>()?;
        let Ok(voucher_id) = parse_id(&id, "voucher") else {
            return Ok(false.into());
        };

        let deleted = voucher::delete_voucher(&state.db, voucher_id)
            .await
            .db_err()?;
        if deleted {
            tracing::info!(voucher_id = %voucher_id, "Voucher deleted");
        }
        Ok(deleted.into())
    }
}
