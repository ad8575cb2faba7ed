use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::{
    catalogue,
    partner::{self, CreateStockRecordData, UpdateStockRecordData},
};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    CreatePartnerInput, CreateStockRecordInput, Partner, PartnerPayload, StockAlert, StockRecord,
    StockRecordPayload, UpdatePartnerInput, UpdateStockRecordInput,
};

#[derive(Default)]
pub struct PartnerQuery;

#[Object]
impl PartnerQuery {
    async fn partners(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Partner>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            partner::count_partners(&state.db),
            |page| partner::list_partners(&state.db, page),
        )
        .await
    }

    async fn partner(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Partner>> {
        let state = ctx.data::<AppState>()?;
        let partner_id = parse_id(&id, "partner")?;
        let row = partner::get_partner(&state.db, partner_id).await.db_err()?;
        Ok(row.map(Partner::from))
    }

    async fn stock_records(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, StockRecord>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            partner::count_stock_records(&state.db),
            |page| partner::list_stock_records(&state.db, page),
        )
        .await
    }

    async fn stock_record(&self, ctx: &Context<'_>, id: ID) -> Result<Option<StockRecord>> {
        let state = ctx.data::<AppState>()?;
        let record_id = parse_id(&id, "stock record")?;
        let row = partner::get_stock_record(&state.db, record_id)
            .await
            .db_err()?;
        Ok(row.map(StockRecord::from))
    }

    async fn stock_alerts(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, StockAlert>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            partner::count_stock_alerts(&state.db),
            |page| partner::list_stock_alerts(&state.db, page),
        )
        .await
    }

    async fn stock_alert(&self, ctx: &Context<'_>, id: ID) -> Result<Option<StockAlert>> {
        let state = ctx.data::<AppState>()?;
        let alert_id = parse_id(&id, "stock alert")?;
        let row = partner::get_stock_alert(&state.db, alert_id)
            .await
            .db_err()?;
        Ok(row.map(StockAlert::from))
    }
}

#[derive(Default)]
pub struct PartnerMutation;

#[Object]
impl PartnerMutation {
    async fn create_partner(
        &self,
        ctx: &Context<'_>,
        input: CreatePartnerInput,
    ) -> Result<PartnerPayload> {
        require_user(ctx, "create a partner").await?;
        let state = ctx.data::<AppState>()?;

        let row = partner::create_partner(&state.db, input.name.trim(), input.code.trim())
            .await
            .db_err()?;

        tracing::info!(partner_id = %row.id, code = %row.code, "Partner created");
        Ok(PartnerPayload {
            partner: row.into(),
        })
    }

    async fn update_partner(
        &self,
        ctx: &Context<'_>,
        input: UpdatePartnerInput,
    ) -> Result<PartnerPayload> {
        require_user(ctx, "update a partner").await?;
        let state = ctx.data::<AppState>()?;
        let partner_id = parse_id(&input.id, "partner")?;

        // Empty strings leave the field unchanged.
        let name = input.name.as_deref().filter(|s| !s.is_empty());
        let code = input.code.as_deref().filter(|s| !s.is_empty());

        let row = partner::update_partner(&state.db, partner_id, name, code)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Partner not found"))?;

        Ok(PartnerPayload {
            partner: row.into(),
        })
    }

    async fn create_stock_record(
        &self,
        ctx: &Context<'_>,
        input: CreateStockRecordInput,
    ) -> Result<StockRecordPayload> {
        require_user(ctx, "create a stock record").await?;
        let state = ctx.data::<AppState>()?;

        let invalid = || Error::new("Invalid partner or product ID");
        let partner_id = parse_id(&input.partner_id, "partner").map_err(|_| invalid())?;
        let product_id = parse_id(&input.product_id, "product").map_err(|_| invalid())?;

        let partner_exists = partner::get_partner(&state.db, partner_id)
            .await
            .db_err()?
            .is_some();
        let product_exists = catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .is_some();
        if !partner_exists || !product_exists {
            return Err(invalid());
        }

        let row = partner::create_stock_record(
            &state.db,
            CreateStockRecordData {
                partner_id,
                product_id,
                partner_sku: input.partner_sku,
                price_currency: input.price_currency,
                price: input.price,
                num_in_stock: input.num_in_stock,
                low_stock_threshold: input.low_stock_threshold,
            },
        )
        .await
        .db_err()?;

        tracing::info!(stock_record_id = %row.id, "Stock record created");
        Ok(StockRecordPayload {
            stock_record: row.into(),
        })
    }

    /// Update price or stock levels, then reconcile the record's low-stock
    /// alert: one is opened when the record drops below its threshold and
    /// none is open, open ones are closed once it recovers.
    async fn update_stock_record(
        &self,
        ctx: &Context<'_>,
        input: UpdateStockRecordInput,
    ) -> Result<StockRecordPayload> {
        require_user(ctx, "update a stock record").await?;
        let state = ctx.data::<AppState>()?;
        let record_id = parse_id(&input.id, "stock record")?;

        let mut tx = state.db.begin().await.db_err()?;
        let row = partner::update_stock_record(
            &mut *tx,
            record_id,
            UpdateStockRecordData {
                price: input.price,
                num_in_stock: input.num_in_stock,
                low_stock_threshold: input.low_stock_threshold,
            },
        )
        .await
        .db_err()?
        .ok_or_else(|| Error::new("Stock record not found"))?;

        match row.low_stock_threshold {
            Some(threshold) if row.is_below_threshold() => {
                let open = partner::get_open_stock_alert(&mut *tx, row.id)
                    .await
                    .db_err()?;
                if open.is_none() {
                    partner::open_stock_alert(&mut *tx, row.id, threshold)
                        .await
                        .db_err()?;
                    tracing::info!(stock_record_id = %row.id, threshold, "Stock alert opened");
                }
            }
            _ => {
                let closed = partner::close_stock_alerts(&mut *tx, row.id)
                    .await
                    .db_err()?;
                if closed > 0 {
                    tracing::info!(stock_record_id = %row.id, closed, "Stock alerts closed");
                }
            }
        }
        tx.commit().await.db_err()?;

        Ok(StockRecordPayload {
            stock_record: row.into(),
        })
    }
}
