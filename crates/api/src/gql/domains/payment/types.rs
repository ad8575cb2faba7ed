use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use infra::models::{BankcardRow, SourceRow, SourceTypeRow, TransactionRow};
use infra::repos::payment;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gql::domains::customer::types::User;
use crate::gql::domains::order::types::Order;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

#[derive(SimpleObject, Clone)]
pub struct SourceType {
    pub id: ID,
    pub name: String,
    pub code: String,
}

impl From<SourceTypeRow> for SourceType {
    fn from(row: SourceTypeRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            code: row.code,
        }
    }
}

/// A payment source attached to an order, such as a card or gift voucher.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Source {
    pub id: ID,
    pub currency: String,
    pub amount_allocated: Decimal,
    pub amount_debited: Decimal,
    pub amount_refunded: Decimal,
    pub reference: String,
    pub label: String,
    /// Allocated minus debited plus refunded.
    pub balance: Decimal,
    pub amount_available_for_refund: Decimal,
    #[graphql(skip)]
    pub order_id: Uuid,
    #[graphql(skip)]
    pub source_type_id: Uuid,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        Self {
            id: row.id.into(),
            balance: row.balance(),
            amount_available_for_refund: row.amount_available_for_refund(),
            currency: row.currency,
            amount_allocated: row.amount_allocated,
            amount_debited: row.amount_debited,
            amount_refunded: row.amount_refunded,
            reference: row.reference,
            label: row.label,
            order_id: row.order_id,
            source_type_id: row.source_type_id,
        }
    }
}

#[ComplexObject]
impl Source {
    async fn order(&self, ctx: &Context<'_>) -> Result<Option<Order>> {
        Order::load(ctx, self.order_id).await
    }

    async fn source_type(&self, ctx: &Context<'_>) -> Result<Option<SourceType>> {
        let state = ctx.data::<AppState>()?;
        let row = payment::get_source_type(&state.db, self.source_type_id)
            .await
            .db_err()?;
        Ok(row.map(SourceType::from))
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Transaction {
    pub id: ID,
    pub txn_type: String,
    pub amount: Decimal,
    pub reference: String,
    pub status: String,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub source_id: Uuid,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id.into(),
            txn_type: row.txn_type,
            amount: row.amount,
            reference: row.reference,
            status: row.status,
            date_created: row.date_created,
            source_id: row.source_id,
        }
    }
}

#[ComplexObject]
impl Transaction {
    async fn source(&self, ctx: &Context<'_>) -> Result<Option<Source>> {
        let state = ctx.data::<AppState>()?;
        let row = payment::get_source(&state.db, self.source_id)
            .await
            .db_err()?;
        Ok(row.map(Source::from))
    }
}

/// Only the last four digits of a card number are ever stored.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Bankcard {
    pub id: ID,
    pub card_type: String,
    pub name: String,
    pub number: String,
    pub expiry_date: NaiveDate,
    pub partner_reference: String,
    #[graphql(skip)]
    pub user_id: Uuid,
}

impl From<BankcardRow> for Bankcard {
    fn from(row: BankcardRow) -> Self {
        Self {
            id: row.id.into(),
            card_type: row.card_type,
            name: row.name,
            number: row.number,
            expiry_date: row.expiry_date,
            partner_reference: row.partner_reference,
            user_id: row.user_id,
        }
    }
}

#[ComplexObject]
impl Bankcard {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.user_id).await
    }

    async fn obfuscated_number(&self) -> String {
        payment::obfuscate_card_number(&self.number).unwrap_or_else(|| self.number.clone())
    }
}

#[derive(InputObject)]
pub struct CreateTransactionInput {
    pub source_id: ID,
    pub txn_type: String,
    pub amount: Decimal,
    pub reference: Option<String>,
    pub status: Option<String>,
}

#[derive(InputObject)]
pub struct CreateSourceInput {
    pub order_id: ID,
    pub source_type_id: ID,
    pub currency: String,
    pub amount_allocated: Decimal,
    pub reference: Option<String>,
    pub label: Option<String>,
}

#[derive(InputObject)]
pub struct CreateBankcardInput {
    pub user_id: ID,
    pub card_type: String,
    pub name: Option<String>,
    pub number: String,
    /// `MM/YY`, `MM/YYYY` or `YYYY-MM-DD`.
    pub expiry_date: String,
    pub partner_reference: Option<String>,
}

#[derive(InputObject)]
pub struct CreateSourceTypeInput {
    pub name: String,
}

#[derive(SimpleObject)]
pub struct TransactionPayload {
    pub transaction: Transaction,
}

#[derive(SimpleObject)]
pub struct SourcePayload {
    pub source: Source,
}

#[derive(SimpleObject)]
pub struct BankcardPayload {
    pub bankcard: Bankcard,
}

#[derive(SimpleObject)]
pub struct SourceTypePayload {
    pub source_type: SourceType,
}
