use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::{
    models::{CommunicationEventTypeRow, EmailRow, NotificationRow},
    pagination::LimitOffset,
};

#[derive(Debug, Clone)]
pub struct CreateEmailData {
    pub user_id: Uuid,
    pub email: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationData {
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub location: String,
}

// ── Emails ──

pub async fn list_emails<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<EmailRow>> {
    sqlx::query_as::<_, EmailRow>(
        r#"
        SELECT id, user_id, email, subject, body_text, body_html, date_sent
        FROM emails
        ORDER BY date_sent DESC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_emails<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM emails")
        .fetch_one(executor)
        .await
}

pub async fn get_email<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<EmailRow>> {
    sqlx::query_as::<_, EmailRow>(
        r#"
        SELECT id, user_id, email, subject, body_text, body_html, date_sent
        FROM emails
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_email<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateEmailData,
) -> SqlxResult<EmailRow> {
    sqlx::query_as::<_, EmailRow>(
        r#"
        INSERT INTO emails (user_id, email, subject, body_text, body_html)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, email, subject, body_text, body_html, date_sent
        "#,
    )
    .bind(data.user_id)
    .bind(&data.email)
    .bind(&data.subject)
    .bind(&data.body_text)
    .bind(&data.body_html)
    .fetch_one(executor)
    .await
}

// ── Event types ──

pub async fn list_event_types<'e>(
    executor: impl PgExecutor<'e>,
    page: LimitOffset,
) -> SqlxResult<Vec<CommunicationEventTypeRow>> {
    sqlx::query_as::<_, CommunicationEventTypeRow>(
        r#"
        SELECT id, code, name, category, email_subject_template, email_body_template,
               email_body_html_template, sms_template, date_created, date_updated
        FROM communication_event_types
        ORDER BY name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_event_types<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM communication_event_types")
        .fetch_one(executor)
        .await
}

pub async fn get_event_type<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<CommunicationEventTypeRow>> {
    sqlx::query_as::<_, CommunicationEventTypeRow>(
        r#"
        SELECT id, code, name, category, email_subject_template, email_body_template,
               email_body_html_template, sms_template, date_created, date_updated
        FROM communication_event_types
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

// ── Notifications ──

pub async fn list_notifications<'e>(
    executor: impl PgExecutor<'e>,
    recipient_id: Option<Uuid>,
    page: LimitOffset,
) -> SqlxResult<Vec<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, recipient_id, sender_id, subject, body, location, date_sent, date_read
        FROM notifications
        WHERE ($1::uuid IS NULL OR recipient_id = $1)
        ORDER BY date_sent DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(recipient_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_notifications<'e>(
    executor: impl PgExecutor<'e>,
    recipient_id: Option<Uuid>,
) -> SqlxResult<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE ($1::uuid IS NULL OR recipient_id = $1)",
    )
    .bind(recipient_id)
    .fetch_one(executor)
    .await
}

pub async fn get_notification<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, recipient_id, sender_id, subject, body, location, date_sent, date_read
        FROM notifications
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create_notification<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateNotificationData,
) -> SqlxResult<NotificationRow> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        INSERT INTO notifications (recipient_id, sender_id, subject, body, location)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, recipient_id, sender_id, subject, body, location, date_sent, date_read
        "#,
    )
    .bind(data.recipient_id)
    .bind(data.sender_id)
    .bind(&data.subject)
    .bind(&data.body)
    .bind(&data.location)
    .fetch_one(executor)
    .await
}

/// Stamp `date_read` on a notification addressed to `recipient_id`.
/// Returns `None` when the notification is missing or addressed to someone else.
pub async fn mark_notification_read<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    recipient_id: Uuid,
) -> SqlxResult<Option<NotificationRow>> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        UPDATE notifications
        SET date_read = NOW()
        WHERE id = $1 AND recipient_id = $2
        RETURNING id, recipient_id, sender_id, subject, body, location, date_sent, date_read
        "#,
    )
    .bind(id)
    .bind(recipient_id)
    .fetch_optional(executor)
    .await
}
