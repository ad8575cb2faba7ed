use async_graphql::{Context, Error, Result};
use infra::{models::UserRow, repos::customer};

use crate::auth::Claims;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

/// Load the authenticated, active user behind the request, or fail with
/// "Authentication required to <action>."
pub async fn require_user(ctx: &Context<'_>, action: &str) -> Result<UserRow> {
    let denied = || Error::new(format!("Authentication required to {action}."));

    let claims = ctx.data_opt::<Claims>().ok_or_else(denied)?;
    let user_id = claims.user_id().ok_or_else(denied)?;

    let state = ctx.data::<AppState>()?;
    match customer::get_user(&state.db, user_id).await.db_err()? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(denied()),
    }
}

/// The request user when one is signed in. Anonymous callers, stale tokens
/// and deactivated accounts all resolve to `None`.
pub async fn current_user(ctx: &Context<'_>) -> Result<Option<UserRow>> {
    let Some(user_id) = ctx.data_opt::<Claims>().and_then(Claims::user_id) else {
        return Ok(None);
    };

    let state = ctx.data::<AppState>()?;
    let user = customer::get_user(&state.db, user_id).await.db_err()?;
    Ok(user.filter(|u| u.is_active))
}
