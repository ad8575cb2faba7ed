use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::keys::random_key;
use infra::repos::{
    catalogue,
    customer::{
        self, CreateProductAlertData, CreateUserData, UpdateUserData, ALERT_KEY_LENGTH,
        ALERT_STATUS_ACTIVE, ALERT_STATUS_UNCONFIRMED,
    },
};

use crate::auth::{current_user, require_user, PasswordService};
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    CreateProductAlertInput, CreateUserInput, LoginPayload, ProductAlert, ProductAlertPayload,
    UpdateUserInput, User, UserPayload,
};

#[derive(Default)]
pub struct CustomerQuery;

#[Object]
impl CustomerQuery {
    async fn users(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, User>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            customer::count_users(&state.db),
            |page| customer::list_users(&state.db, page),
        )
        .await
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&id, "user")?;
        let row = customer::get_user(&state.db, user_id).await.db_err()?;
        Ok(row.map(User::from))
    }

    async fn product_alerts(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, ProductAlert>> {
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            customer::count_product_alerts(&state.db, None),
            |page| customer::list_product_alerts(&state.db, None, page),
        )
        .await
    }

    async fn product_alerts_by_user(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, ProductAlert>> {
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&user_id, "user")?;
        paginate(
            after,
            before,
            first,
            last,
            customer::count_product_alerts(&state.db, Some(user_id)),
            |page| customer::list_product_alerts(&state.db, Some(user_id), page),
        )
        .await
    }

    async fn product_alert(&self, ctx: &Context<'_>, id: ID) -> Result<Option<ProductAlert>> {
        let state = ctx.data::<AppState>()?;
        let alert_id = parse_id(&id, "product alert")?;
        let row = customer::get_product_alert(&state.db, alert_id)
            .await
            .db_err()?;
        Ok(row.map(ProductAlert::from))
    }
}

#[derive(Default)]
pub struct CustomerMutation;

#[Object]
impl CustomerMutation {
    /// Register a new account. Open to anonymous callers.
    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<UserPayload> {
        let state = ctx.data::<AppState>()?;

        let email = input.email.trim().to_string();
        if email.is_empty() {
            return Err(Error::new("Email is required."));
        }
        if customer::get_user_by_email(&state.db, &email)
            .await
            .db_err()?
            .is_some()
        {
            return Err(Error::new("A user with this email already exists"));
        }

        let password_hash = PasswordService::hash_password(&input.password)?;
        let row = customer::create_user(
            &state.db,
            CreateUserData {
                email,
                password_hash: Some(password_hash),
                first_name: input.first_name,
                last_name: input.last_name,
            },
        )
        .await
        .db_err()?;

        tracing::info!(user_id = %row.id, "User created");
        Ok(UserPayload { user: row.into() })
    }

    /// Users may edit their own account; staff may edit any account.
    async fn update_user(&self, ctx: &Context<'_>, input: UpdateUserInput) -> Result<UserPayload> {
        let caller = require_user(ctx, "update a user").await?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&input.id, "user")?;

        if caller.id != user_id && !caller.is_staff {
            return Err(Error::new("Not authorized to modify this user."));
        }

        if let Some(email) = input.email.as_deref() {
            let taken = customer::get_user_by_email(&state.db, email)
                .await
                .db_err()?
                .is_some_and(|other| other.id != user_id);
            if taken {
                return Err(Error::new("A user with this email already exists"));
            }
        }

        let data = UpdateUserData {
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            is_active: input.is_active,
        };
        let row = customer::update_user(&state.db, user_id, data)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("User not found"))?;

        Ok(UserPayload { user: row.into() })
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        let caller = require_user(ctx, "delete a user").await?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&id, "user")?;

        if caller.id != user_id && !caller.is_staff {
            return Err(Error::new("Not authorized to modify this user."));
        }

        if !customer::delete_user(&state.db, user_id).await.db_err()? {
            return Err(Error::new("User not found"));
        }

        tracing::info!(user_id = %user_id, "User deleted");
        Ok(true.into())
    }

    /// Anonymous alerts start unconfirmed; signed-in callers are attached
    /// and their alert is active straight away.
    async fn create_product_alert(
        &self,
        ctx: &Context<'_>,
        input: CreateProductAlertInput,
    ) -> Result<ProductAlertPayload> {
        let state = ctx.data::<AppState>()?;
        let product_id = parse_id(&input.product_id, "product")?;

        if catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .is_none()
        {
            return Err(Error::new("Product not found."));
        }

        let user = current_user(ctx).await?;
        let status = if user.is_some() {
            ALERT_STATUS_ACTIVE
        } else {
            ALERT_STATUS_UNCONFIRMED
        };

        let row = customer::create_product_alert(
            &state.db,
            CreateProductAlertData {
                product_id,
                user_id: user.map(|u| u.id),
                email: Some(input.email),
                key: random_key(ALERT_KEY_LENGTH),
                status: status.to_string(),
            },
        )
        .await
        .db_err()?;

        Ok(ProductAlertPayload {
            product_alert: row.into(),
        })
    }

    async fn cancel_product_alert(&self, ctx: &Context<'_>, id: ID) -> Result<SuccessPayload> {
        require_user(ctx, "cancel a product alert").await?;
        let state = ctx.data::<AppState>()?;
        let alert_id = parse_id(&id, "product alert")?;

        customer::cancel_product_alert(&state.db, alert_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Product Alert not found"))?;

        Ok(true.into())
    }

    /// Exchange credentials for a bearer token.
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<LoginPayload> {
        let state = ctx.data::<AppState>()?;
        let invalid = || Error::new("Invalid email or password.");

        let user = customer::get_user_by_email(&state.db, &email)
            .await
            .db_err()?
            .filter(|u| u.is_active)
            .ok_or_else(invalid)?;

        let verified = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| PasswordService::verify_password(&password, hash));
        if !verified {
            return Err(invalid());
        }

        let token = state.jwt_service().create_token(user.id, user.email.clone())?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginPayload {
            token,
            user: user.into(),
        })
    }
}
