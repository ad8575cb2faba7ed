use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{CommunicationEventTypeRow, EmailRow, NotificationRow};
use uuid::Uuid;

use crate::gql::domains::customer::types::User;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Email {
    pub id: ID,
    pub email: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    pub date_sent: DateTime<Utc>,
    #[graphql(skip)]
    pub user_id: Option<Uuid>,
}

impl From<EmailRow> for Email {
    fn from(row: EmailRow) -> Self {
        Self {
            id: row.id.into(),
            email: row.email,
            subject: row.subject,
            body_text: row.body_text,
            body_html: row.body_html,
            date_sent: row.date_sent,
            user_id: row.user_id,
        }
    }
}

#[ComplexObject]
impl Email {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.user_id).await
    }
}

#[derive(SimpleObject, Clone)]
pub struct CommunicationEventType {
    pub id: ID,
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

impl From<CommunicationEventTypeRow> for CommunicationEventType {
    fn from(row: CommunicationEventTypeRow) -> Self {
        Self {
            id: row.id.into(),
            code: row.code,
            name: row.name,
            category: row.category,
            email_subject_template: row.email_subject_template,
            email_body_template: row.email_body_template,
            email_body_html_template: row.email_body_html_template,
            sms_template: row.sms_template,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Notification {
    pub id: ID,
    pub subject: String,
    pub body: String,
    pub location: String,
    pub date_sent: DateTime<Utc>,
    pub date_read: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub recipient_id: Uuid,
    #[graphql(skip)]
    pub sender_id: Option<Uuid>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id.into(),
            subject: row.subject,
            body: row.body,
            location: row.location,
            date_sent: row.date_sent,
            date_read: row.date_read,
            recipient_id: row.recipient_id,
            sender_id: row.sender_id,
        }
    }
}

#[ComplexObject]
impl Notification {
    async fn recipient(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.recipient_id).await
    }

    async fn sender(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load_opt(ctx, self.sender_id).await
    }

    async fn is_read(&self) -> bool {
        self.date_read.is_some()
    }
}

#[derive(InputObject)]
pub struct CreateEmailInput {
    pub user_id: ID,
    pub email: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

#[derive(InputObject)]
pub struct CreateNotificationInput {
    pub recipient_id: ID,
    pub sender_id: Option<ID>,
    pub subject: String,
    pub body: String,
    /// Inbox or Archive; defaults to Inbox.
    pub location: Option<String>,
}

#[derive(SimpleObject)]
pub struct EmailPayload {
    pub email: Email,
}

#[derive(SimpleObject)]
pub struct NotificationPayload {
    pub notification: Notification,
}
