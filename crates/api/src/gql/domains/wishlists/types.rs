use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models::{WishListLineRow, WishListRow, WishListSharedEmailRow};
use infra::pagination::LimitOffset;
use infra::repos::wishlists::{self, Visibility as StoredVisibility};
use uuid::Uuid;

use crate::gql::domains::catalogue::types::Product;
use crate::gql::domains::customer::types::User;
use crate::gql::error::DbResultExt;
use crate::state::AppState;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "Visibility")]
pub enum WishListVisibility {
    Private,
    Shared,
    Public,
}

impl From<StoredVisibility> for WishListVisibility {
    fn from(value: StoredVisibility) -> Self {
        match value {
            StoredVisibility::Private => WishListVisibility::Private,
            StoredVisibility::Shared => WishListVisibility::Shared,
            StoredVisibility::Public => WishListVisibility::Public,
        }
    }
}

impl From<WishListVisibility> for StoredVisibility {
    fn from(value: WishListVisibility) -> Self {
        match value {
            WishListVisibility::Private => StoredVisibility::Private,
            WishListVisibility::Shared => StoredVisibility::Shared,
            WishListVisibility::Public => StoredVisibility::Public,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct WishList {
    pub id: ID,
    pub name: String,
    /// Short random key used in share links.
    pub key: String,
    pub visibility: WishListVisibility,
    pub is_shareable: bool,
    pub date_created: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
    #[graphql(skip)]
    pub owner_id: Uuid,
}

impl From<WishListRow> for WishList {
    fn from(row: WishListRow) -> Self {
        Self {
            id: row.id.into(),
            visibility: row.visibility().into(),
            is_shareable: row.is_shareable(),
            name: row.name,
            key: row.key,
            date_created: row.date_created,
            uuid: row.id,
            owner_id: row.owner_id,
        }
    }
}

#[ComplexObject]
impl WishList {
    async fn owner(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        User::load(ctx, self.owner_id).await
    }

    async fn shared_emails(&self, ctx: &Context<'_>) -> Result<Vec<WishListSharedEmail>> {
        let state = ctx.data::<AppState>()?;
        let rows = wishlists::list_shared_emails(&state.db, self.uuid)
            .await
            .db_err()?;
        Ok(rows.into_iter().map(WishListSharedEmail::from).collect())
    }

    /// First page of lines; use `wishlistLines` to page through the rest.
    async fn lines(&self, ctx: &Context<'_>) -> Result<Vec<WishListLine>> {
        let state = ctx.data::<AppState>()?;
        let rows = wishlists::list_lines(&state.db, self.uuid, LimitOffset::new(100, 0))
            .await
            .db_err()?;
        Ok(rows.into_iter().map(WishListLine::from).collect())
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct WishListLine {
    pub id: ID,
    pub quantity: i32,
    /// Product title at the time it was added; kept if the product goes away.
    pub title: String,
    #[graphql(skip)]
    pub wishlist_id: Uuid,
    #[graphql(skip)]
    pub product_id: Option<Uuid>,
}

impl From<WishListLineRow> for WishListLine {
    fn from(row: WishListLineRow) -> Self {
        Self {
            id: row.id.into(),
            quantity: row.quantity,
            title: row.title,
            wishlist_id: row.wishlist_id,
            product_id: row.product_id,
        }
    }
}

#[ComplexObject]
impl WishListLine {
    async fn wishlist(&self, ctx: &Context<'_>) -> Result<Option<WishList>> {
        let state = ctx.data::<AppState>()?;
        let row = wishlists::get_wishlist(&state.db, self.wishlist_id)
            .await
            .db_err()?;
        Ok(row.map(WishList::from))
    }

    async fn product(&self, ctx: &Context<'_>) -> Result<Option<Product>> {
        Product::load_opt(ctx, self.product_id).await
    }
}

#[derive(SimpleObject, Clone)]
pub struct WishListSharedEmail {
    pub id: ID,
    pub email: String,
    #[graphql(skip)]
    pub wishlist_id: Uuid,
}

impl From<WishListSharedEmailRow> for WishListSharedEmail {
    fn from(row: WishListSharedEmailRow) -> Self {
        Self {
            id: row.id.into(),
            email: row.email,
            wishlist_id: row.wishlist_id,
        }
    }
}

#[derive(InputObject)]
pub struct CreateWishListInput {
    pub name: String,
    #[graphql(default_with = "WishListVisibility::Private")]
    pub visibility: WishListVisibility,
}

#[derive(InputObject)]
pub struct UpdateWishListInput {
    pub wishlist_id: ID,
    pub name: Option<String>,
    pub visibility: Option<WishListVisibility>,
}

#[derive(InputObject)]
pub struct WishListProductInput {
    pub wishlist_id: ID,
    pub product_id: ID,
}

#[derive(InputObject)]
pub struct ShareWishListInput {
    pub wishlist_id: ID,
    pub email: String,
}

#[derive(SimpleObject)]
pub struct WishListPayload {
    pub wishlist: WishList,
}
