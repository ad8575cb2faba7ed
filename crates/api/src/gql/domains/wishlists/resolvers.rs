use async_graphql::connection::Connection;
use async_graphql::{Context, Error, Object, Result, ID};
use infra::keys::random_key;
use infra::models::{UserRow, WishListRow};
use infra::repos::{
    catalogue,
    wishlists::{self, Viewer, WISHLIST_KEY_LENGTH},
};
use uuid::Uuid;

use crate::auth::{current_user, require_user};
use crate::gql::common::{paginate, parse_id, SuccessPayload};
use crate::gql::error::DbResultExt;
use crate::state::AppState;

use super::types::{
    CreateWishListInput, ShareWishListInput, UpdateWishListInput, WishList, WishListLine,
    WishListPayload, WishListProductInput,
};

const KEY_ATTEMPTS: usize = 5;

fn viewer(user: &UserRow) -> Viewer<'_> {
    Viewer {
        user_id: user.id,
        email: &user.email,
    }
}

/// Whether the request user may see the list.
async fn can_see(ctx: &Context<'_>, state: &AppState, list: &WishListRow) -> Result<bool> {
    let user = current_user(ctx).await?;
    let emails: Vec<String> = wishlists::list_shared_emails(&state.db, list.id)
        .await
        .db_err()?
        .into_iter()
        .map(|e| e.email)
        .collect();
    Ok(list.is_allowed_to_see(user.as_ref().map(viewer), &emails))
}

/// Load a list the given user owns. Missing lists and lists owned by
/// someone else fail with distinct messages.
async fn owned_wishlist(
    state: &AppState,
    user: &UserRow,
    id: &ID,
    denied: &str,
) -> Result<WishListRow> {
    let wishlist_id = parse_id(id, "wishlist")?;
    let list = wishlists::get_wishlist(&state.db, wishlist_id)
        .await
        .db_err()?
        .ok_or_else(|| Error::new("Invalid wishlist ID."))?;

    if !list.is_allowed_to_edit(Some(viewer(user))) {
        return Err(Error::new(denied.to_string()));
    }
    Ok(list)
}

async fn unused_key(state: &AppState) -> Result<String> {
    for _ in 0..KEY_ATTEMPTS {
        let key = random_key(WISHLIST_KEY_LENGTH);
        if wishlists::get_wishlist_by_key(&state.db, &key)
            .await
            .db_err()?
            .is_none()
        {
            return Ok(key);
        }
    }
    Err(Error::new("Could not generate a wishlist key. Please try again."))
}

#[derive(Default)]
pub struct WishListQuery;

#[Object]
impl WishListQuery {
    async fn wishlist(&self, ctx: &Context<'_>, id: ID) -> Result<Option<WishList>> {
        let state = ctx.data::<AppState>()?;
        let wishlist_id = parse_id(&id, "wishlist")?;
        let Some(list) = wishlists::get_wishlist(&state.db, wishlist_id)
            .await
            .db_err()?
        else {
            return Ok(None);
        };

        if !can_see(ctx, state, &list).await? {
            return Err(Error::new("Not authorized to view this wishlist."));
        }
        Ok(Some(list.into()))
    }

    /// The caller's own lists. Anonymous callers get an empty connection.
    async fn wishlists(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, WishList>> {
        let Some(user) = current_user(ctx).await? else {
            return Ok(Connection::new(false, false));
        };
        let state = ctx.data::<AppState>()?;
        paginate(
            after,
            before,
            first,
            last,
            wishlists::count_for_owner(&state.db, user.id),
            |page| wishlists::list_for_owner(&state.db, user.id, page),
        )
        .await
    }

    /// Null when no list has the key or the caller may not see it.
    async fn wishlist_by_key(&self, ctx: &Context<'_>, key: String) -> Result<Option<WishList>> {
        let state = ctx.data::<AppState>()?;
        let Some(list) = wishlists::get_wishlist_by_key(&state.db, key.trim())
            .await
            .db_err()?
        else {
            return Ok(None);
        };

        if !can_see(ctx, state, &list).await? {
            return Ok(None);
        }
        Ok(Some(list.into()))
    }

    async fn wishlist_lines(
        &self,
        ctx: &Context<'_>,
        wishlist_id: ID,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, WishListLine>> {
        let state = ctx.data::<AppState>()?;
        let id: Uuid = parse_id(&wishlist_id, "wishlist")?;
        let Some(list) = wishlists::get_wishlist(&state.db, id).await.db_err()? else {
            return Ok(Connection::new(false, false));
        };
        if !can_see(ctx, state, &list).await? {
            return Ok(Connection::new(false, false));
        }

        paginate(
            after,
            before,
            first,
            last,
            wishlists::count_lines(&state.db, id),
            |page| wishlists::list_lines(&state.db, id, page),
        )
        .await
    }
}

#[derive(Default)]
pub struct WishListMutation;

#[Object]
impl WishListMutation {
    async fn create_wishlist(
        &self,
        ctx: &Context<'_>,
        input: CreateWishListInput,
    ) -> Result<WishListPayload> {
        let user = require_user(ctx, "create a wishlist").await?;
        let state = ctx.data::<AppState>()?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(Error::new("Wishlist name cannot be empty."));
        }

        let key = unused_key(state).await?;
        let row = wishlists::create_wishlist(&state.db, user.id, name, &key, input.visibility.into())
            .await
            .db_err()?;

        tracing::info!(wishlist_id = %row.id, owner_id = %user.id, "Wishlist created");
        Ok(WishListPayload {
            wishlist: row.into(),
        })
    }

    /// Adds one unit of the product; repeated adds raise the line quantity.
    async fn add_to_wishlist(
        &self,
        ctx: &Context<'_>,
        input: WishListProductInput,
    ) -> Result<WishListPayload> {
        let user = require_user(ctx, "add to wishlist").await?;
        let state = ctx.data::<AppState>()?;
        let list = owned_wishlist(
            state,
            &user,
            &input.wishlist_id,
            "Not authorized to edit this wishlist.",
        )
        .await?;

        let product_id = parse_id(&input.product_id, "product")?;
        let product = catalogue::get_product(&state.db, product_id)
            .await
            .db_err()?
            .ok_or_else(|| Error::new("Invalid product ID."))?;

        wishlists::add_product(&state.db, list.id, product.id, &product.title)
            .await
            .db_err()?;

        Ok(WishListPayload {
            wishlist: list.into(),
        })
    }

    async fn remove_from_wishlist(
        &self,
        ctx: &Context<'_>,
        input: WishListProductInput,
    ) -> Result<WishListPayload> {
        let user = require_user(ctx, "remove from wishlist").await?;
        let state = ctx.data::<AppState>()?;
        let list = owned_wishlist(
            state,
            &user,
            &input.wishlist_id,
            "Not authorized to edit this wishlist.",
        )
        .await?;

        let product_id = parse_id(&input.product_id, "product")?;
        wishlists::remove_product(&state.db, list.id, product_id)
            .await
            .db_err()?;

        Ok(WishListPayload {
            wishlist: list.into(),
        })
    }

    async fn delete_wishlist(&self, ctx: &Context<'_>, wishlist_id: ID) -> Result<SuccessPayload> {
        let user = require_user(ctx, "delete a wishlist").await?;
        let state = ctx.data::<AppState>()?;
        let list = owned_wishlist(
            state,
            &user,
            &wishlist_id,
            "Not authorized to delete this wishlist.",
        )
        .await?;

        let deleted = wishlists::delete_wishlist(&state.db, list.id)
            .await
            .db_err()?;

        if deleted {
            tracing::info!(wishlist_id = %list.id, "Wishlist deleted");
        }
        Ok(deleted.into())
    }

    async fn update_wishlist(
        &self,
        ctx: &Context<'_>,
        input: UpdateWishListInput,
    ) -> Result<WishListPayload> {
        let user = require_user(ctx, "update a wishlist").await?;
        let state = ctx.data::<AppState>()?;
        let list = owned_wishlist(
            state,
            &user,
            &input.wishlist_id,
            "Not authorized to update this wishlist.",
        )
        .await?;

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let row = wishlists::update_wishlist(
            &state.db,
            list.id,
            name,
            input.visibility.map(Into::into),
        )
        .await
        .db_err()?
        .ok_or_else(|| Error::new("Invalid wishlist ID."))?;

        Ok(WishListPayload {
            wishlist: row.into(),
        })
    }

    async fn share_wishlist(
        &self,
        ctx: &Context<'_>,
        input: ShareWishListInput,
    ) -> Result<SuccessPayload> {
        let user = require_user(ctx, "share a wishlist").await?;
        let state = ctx.data::<AppState>()?;
        let list = owned_wishlist(
            state,
            &user,
            &input.wishlist_id,
            "Not authorized to share this wishlist.",
        )
        .await?;

        let email = input.email.trim();
        if !email.contains('@') {
            return Err(Error::new("Invalid email address."));
        }

        wishlists::add_shared_email(&state.db, list.id, email)
            .await
            .db_err()?;

        Ok(true.into())
    }
}
