use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::{analytics, catalogue};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    ProductRecord, UserProductView, UserProductViewPayload, UserRecord, UserSearch,
    UserSearchPayload,
};

#[derive(Default)]
pub struct AnalyticsQuery;

#[Object]
impl AnalyticsQuery {
    async fn product_records(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, ProductRecord>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            analytics::count_product_records(&state.db),
            |page| analytics::list_product_records(&state.db, page),
        )
        .await
    }

    async fn product_record(&self, ctx: &Context<'_>, id: ID) -> Result<Option<ProductRecord>> {
        let state = ctx.data::<AppState>()?;
        let record_id = parse_id(&id, "product record")?;
        let row = analytics::get_product_record(&state.db, record_id)
            .await
            .db_err()?;
        Ok(row.map(ProductRecord::from))
    }

    async fn user_records(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, UserRecord>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            analytics::count_user_records(&state.db),
            |page| analytics::list_user_records(&state.db, page),
        )
        .await
    }

    async fn user_record(&self, ctx: &Context<'_>, id: ID) -> Result<Option<UserRecord>> {
        let state = ctx.data::<AppState>()?;
        let record_id = parse_id(&id, "user record")?;
        let row = analytics::get_user_record(&state.db, record_id)
            .await
            .db_err()?;
        Ok(row.map(UserRecord::from))
    }

    /// The caller's product view history, newest first.
    async fn user_product_views(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, UserProductView>> {
        let user = require_user(ctx, "view product views").await?;
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            analytics::count_user_product_views(&state.db, user.id),
            |page| analytics::list_user_product_views(&state.db, user.id, page),
        )
        .await
    }

    async fn user_searches(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, UserSearch>> {
        let user = require_user(ctx, "view searches").await?;
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            analytics::count_user_searches(&state.db, user.id),
            |page| analytics::list_user_searches(&state.db, user.id, page),
        )
        .await
    }
}

#[derive(Default)]
pub struct AnalyticsMutation;

#[Object]
impl AnalyticsMutation {
    /// Record that the caller viewed a product and bump both view counters.
    async fn create_user_product_view(
        &self,
        ctx: &Context<'_>,
        product_id: ID,
    ) -> Result<UserProductViewPayload> {
        let user = require_user(ctx, "record a product view").await?;
        let state = ctx.data::<AppState>()?;
        let product_id = parse_id(&product_id, "product")?;

        if catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .is_none()
        {
            return Err(Error::new("Product not found."));
        }

        let mut tx = state.db.begin().await.db_err()?;
        let view = analytics::create_user_product_view(&mut *tx, user.id, product_id)
            .await
            .db_err()?;
        analytics::record_product_view(&mut *tx, product_id)
            .await
            .db_err()?;
        analytics::record_user_product_view(&mut *tx, user.id)
            .await
            .db_err()?;
        tx.commit().await.db_err()?;

        Ok(UserProductViewPayload {
            user_product_view: view.into(),
        })
    }

    async fn create_user_search(&self, ctx: &Context<'_>, query: String) -> Result<UserSearchPayload> {
        let user = require_user(ctx, "record a search").await?;
        let state = ctx.data::<AppState>()?;

        let row = analytics::create_user_search(&state.db, user.id, query.trim())
            .await
            .db_err()?;

        Ok(UserSearchPayload {
            user_search: row.into(),
        })
    }
}
