use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::keys::slugify;
use infra::repos::{
    customer, order,
    payment::{
        self, obfuscate_card_number, parse_card_expiry, CreateBankcardData, CreateSourceData,
        CreateTransactionData,
    },
};

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    Bankcard, BankcardPayload, CreateBankcardInput, CreateSourceInput, CreateSourceTypeInput,
    CreateTransactionInput, Source, SourcePayload, SourceType, SourceTypePayload, Transaction,
    TransactionPayload,
};

#[derive(Default)]
pub struct PaymentQuery;

#[Object]
impl PaymentQuery {
    async fn transactions(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Transaction>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            payment::count_transactions(&state.db),
            |page| payment::list_transactions(&state.db, page),
        )
        .await
    }

    async fn transaction(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Transaction>> {
        let state = ctx.data::<AppState>()?;
        let txn_id = parse_id(&id, "transaction")?;
        let row = payment::get_transaction(&state.db, txn_id).await.db_err()?;
        Ok(row.map(Transaction::from))
    }

    async fn sources(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Source>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            payment::count_sources(&state.db),
            |page| payment::list_sources(&state.db, page),
        )
        .await
    }

    async fn source(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Source>> {
        let state = ctx.data::<AppState>()?;
        let source_id = parse_id(&id, "source")?;
        let row = payment::get_source(&state.db, source_id).await.db_err()?;
        Ok(row.map(Source::from))
    }

    async fn source_types(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, SourceType>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            payment::count_source_types(&state.db),
            |page| payment::list_source_types(&state.db, page),
        )
        .await
    }

    async fn source_type(&self, ctx: &Context<'_>, id: ID) -> Result<Option<SourceType>> {
        let state = ctx.data::<AppState>()?;
        let type_id = parse_id(&id, "source type")?;
        let row = payment::get_source_type(&state.db, type_id)
            .await
            .db_err()?;
        Ok(row.map(SourceType::from))
    }

    async fn bankcards(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Bankcard>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            payment::count_bankcards(&state.db),
            |page| payment::list_bankcards(&state.db, page),
        )
        .await
    }

    async fn bankcard(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Bankcard>> {
        let state = ctx.data::<AppState>()?;
        let card_id = parse_id(&id, "bankcard")?;
        let row = payment::get_bankcard(&state.db, card_id).await.db_err()?;
        Ok(row.map(Bankcard::from))
    }
}

#[derive(Default)]
pub struct PaymentMutation;

#[Object]
impl PaymentMutation {
    async fn create_transaction(
        &self,
        ctx: &Context<'_>,
        input: CreateTransactionInput,
    ) -> Result<TransactionPayload> {
        require_user(ctx, "create a transaction").await?;
        let state = ctx.data::<AppState>()?;
        let source_id = parse_id(&input.source_id, "source")?;

        payment::get_source(&state.db, source_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Source not found"))?;

        let row = payment::create_transaction(
            &state.db,
            CreateTransactionData {
                source_id,
                txn_type: input.txn_type,
                amount: input.amount,
                reference: input.reference.unwrap_or_default(),
                status: input.status.unwrap_or_default(),
            },
        )
        .await
        .db_err()?;

        tracing::info!(transaction_id = %row.id, source_id = %source_id, "Transaction recorded");
        Ok(TransactionPayload {
            transaction: row.into(),
        })
    }

    async fn create_source(
        &self,
        ctx: &Context<'_>,
        input: CreateSourceInput,
    ) -> Result<SourcePayload> {
        require_user(ctx, "create a payment source").await?;
        let state = ctx.data::<AppState>()?;
        let order_id = parse_id(&input.order_id, "order")?;
        let source_type_id = parse_id(&input.source_type_id, "source type")?;

        order::get_order(&state.db, order_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Order not found"))?;
        payment::get_source_type(&state.db, source_type_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("SourceType not found"))?;

        let row = payment::create_source(
            &state.db,
            CreateSourceData {
                order_id,
                source_type_id,
                currency: input.currency,
                amount_allocated: input.amount_allocated,
                reference: input.reference.unwrap_or_default(),
                label: input.label.unwrap_or_default(),
            },
        )
        .await
        .db_err()?;

        Ok(SourcePayload { source: row.into() })
    }

    /// Store a card against a user. The full number is discarded; only its
    /// obfuscated form is kept.
    async fn create_bankcard(
        &self,
        ctx: &Context<'_>,
        input: CreateBankcardInput,
    ) -> Result<BankcardPayload> {
        require_user(ctx, "add a bankcard").await?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&input.user_id, "user")?;

        customer::get_user(&state.db, user_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("User not found"))?;

        let number = obfuscate_card_number(&input.number)
            .ok_or_else(|| Error::new("Invalid card number."))?;
        let expiry_date = parse_card_expiry(&input.expiry_date)
            .ok_or_else(|| Error::new("Invalid expiry date. Use MM/YY."))?;

        let row = payment::create_bankcard(
            &state.db,
            CreateBankcardData {
                user_id,
                card_type: input.card_type,
                name: input.name.unwrap_or_default(),
                number,
                expiry_date,
                partner_reference: input.partner_reference.unwrap_or_default(),
            },
        )
        .await
        .db_err()?;

        Ok(BankcardPayload {
            bankcard: row.into(),
        })
    }

    async fn create_source_type(
        &self,
        ctx: &Context<'_>,
        input: CreateSourceTypeInput,
    ) -> Result<SourceTypePayload> {
        require_user(ctx, "create a source type").await?;
        let state = ctx.data::<AppState>()?;
        let name = input.name.trim();

        let row = payment::create_source_type(&state.db, name, &slugify(name))
            .await
            .db_err()?;

        Ok(SourceTypePayload {
            source_type: row.into(),
        })
    }
}
