use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::repos::{
    communication::{self, CreateEmailData, CreateNotificationData},
    customer,
};
use uuid::Uuid;

use crate::auth::require_user;
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    CommunicationEventType, CreateEmailInput, CreateNotificationInput, Email, EmailPayload,
    Notification, NotificationPayload,
};

const DEFAULT_NOTIFICATION_LOCATION: &str = "Inbox";

async fn existing_user(state: &AppState, id: &ID, role: &str) -> Result<Uuid> {
    let user_id = parse_id(id, role)?;
    customer::get_user(&state.db, user_id)
        .await
        .db_err()?
        .ok_or_else(|| Error::new(format!("{} not found.", capitalize(role))))?;
    Ok(user_id)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Default)]
pub struct CommunicationQuery;

#[Object]
impl CommunicationQuery {
    async fn emails(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Email>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            communication::count_emails(&state.db),
            |page| communication::list_emails(&state.db, page),
        )
        .await
    }

    async fn email(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Email>> {
        let state = ctx.data::<AppState>()?;
        let email_id = parse_id(&id, "email")?;
        let row = communication::get_email(&state.db, email_id)
            .await
            .db_err()?;
        Ok(row.map(Email::from))
    }

    async fn communication_event_types(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, CommunicationEventType>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            communication::count_event_types(&state.db),
            |page| communication::list_event_types(&state.db, page),
        )
        .await
    }

    async fn communication_event_type(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> Result<Option<CommunicationEventType>> {
        let state = ctx.data::<AppState>()?;
        let type_id = parse_id(&id, "communication event type")?;
        let row = communication::get_event_type(&state.db, type_id)
            .await
            .db_err()?;
        Ok(row.map(CommunicationEventType::from))
    }

    /// All notifications, or only those addressed to `recipient_id`.
    async fn notifications(
        &self,
        ctx: &Context<'_>,
        recipient_id: Option<ID>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, Notification>> {
        let state = ctx.data::<AppState>()?;
        let recipient_id = recipient_id
            .as_ref()
            .map(|id| parse_id(id, "recipient"))
            .transpose()?;
        paginate(
            after,
            before,
            first,
            last,
            communication::count_notifications(&state.db, recipient_id),
            |page| communication::list_notifications(&state.db, recipient_id, page),
        )
        .await
    }

    async fn notification(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Notification>> {
        let state = ctx.data::<AppState>()?;
        let notification_id = parse_id(&id, "notification")?;
        let row = communication::get_notification(&state.db, notification_id)
            .await
            .db_err()?;
        Ok(row.map(Notification::from))
    }
}

#[derive(Default)]
pub struct CommunicationMutation;

#[Object]
impl CommunicationMutation {
    async fn create_email(&self, ctx: &Context<'_>, input: CreateEmailInput) -> Result<EmailPayload> {
        require_user(ctx, "send an email").await?;
        let state = ctx.data::<AppState>()?;
        let user_id = existing_user(state, &input.user_id, "user").await?;

        let row = communication::create_email(
            &state.db,
            CreateEmailData {
                user_id,
                email: input.email,
                subject: input.subject,
                body_text: input.body_text.unwrap_or_default(),
                body_html: input.body_html.unwrap_or_default(),
            },
        )
        .await
        .db_err()?;

        tracing::info!(email_id = %row.id, user_id = %user_id, "Email recorded");
        Ok(EmailPayload { email: row.into() })
    }

    async fn create_notification(
        &self,
        ctx: &Context<'_>,
        input: CreateNotificationInput,
    ) -> Result<NotificationPayload> {
        require_user(ctx, "create a notification").await?;
        let state = ctx.data::<AppState>()?;
        let recipient_id = existing_user(state, &input.recipient_id, "recipient").await?;
        let sender_id = match input.sender_id.as_ref() {
            Some(id) => Some(existing_user(state, id, "sender").await?),
            None => None,
        };

        let row = communication::create_notification(
            &state.db,
            CreateNotificationData {
                recipient_id,
                sender_id,
                subject: input.subject,
                body: input.body,
                location: input
                    .location
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| DEFAULT_NOTIFICATION_LOCATION.to_string()),
            },
        )
        .await
        .db_err()?;

        Ok(NotificationPayload {
            notification: row.into(),
        })
    }

    /// Only the recipient may mark a notification as read.
    async fn mark_notification_as_read(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        let user = require_user(ctx, "update a notification").await?;
        let state = ctx.data::<AppState>()?;
        let notification_id = parse_id(&id, "notification")?;

        communication::mark_notification_read(&state.db, notification_id, user.id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Notification not found or not accessible."))?;

        Ok(true.into())
    }
}
