use sqlx::{PgExecutor, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    models::{WishListLineRow, WishListRow, WishListSharedEmailRow},
    pagination::LimitOffset,
};

pub const WISHLIST_KEY_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Shared,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "Private",
            Visibility::Shared => "Shared",
            Visibility::Public => "Public",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Visibility::Private),
            "shared" => Ok(Visibility::Shared),
            "public" => Ok(Visibility::Public),
            _ => Err(format!("Unknown wishlist visibility: {}", s)),
        }
    }
}

/// Who is looking at a wishlist.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
}

impl WishListRow {
    pub fn visibility(&self) -> Visibility {
        self.visibility.parse().unwrap_or(Visibility::Private)
    }

    pub fn is_shareable(&self) -> bool {
        self.visibility() != Visibility::Private
    }

    pub fn is_allowed_to_edit(&self, viewer: Option<Viewer<'_>>) -> bool {
        viewer.is_some_and(|v| v.user_id == self.owner_id)
    }

    /// The owner always sees their list. Public lists are visible to anyone;
    /// shared lists to signed-in users whose email it was shared with.
    pub fn is_allowed_to_see(&self, viewer: Option<Viewer<'_>>, shared_emails: &[String]) -> bool {
        if self.is_allowed_to_edit(viewer) {
            return true;
        }
        match self.visibility() {
            Visibility::Public => true,
            Visibility::Shared => viewer.is_some_and(|v| {
                shared_emails.iter().any(|e| e.eq_ignore_ascii_case(v.email))
            }),
            Visibility::Private => false,
        }
    }
}

// ── Wishlists ──

pub async fn list_for_owner<'e>(
    executor: impl PgExecutor<'e>,
    owner_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<WishListRow>> {
    sqlx::query_as::<_, WishListRow>(
        r#"
        SELECT id, owner_id, name, key, visibility, date_created
        FROM wishlists
        WHERE owner_id = $1
        ORDER BY date_created DESC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_for_owner<'e>(executor: impl PgExecutor<'e>, owner_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM wishlists WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(executor)
        .await
}

pub async fn get_wishlist<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<WishListRow>> {
    sqlx::query_as::<_, WishListRow>(
        "SELECT id, owner_id, name, key, visibility, date_created FROM wishlists WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_wishlist_by_key<'e>(
    executor: impl PgExecutor<'e>,
    key: &str,
) -> SqlxResult<Option<WishListRow>> {
    sqlx::query_as::<_, WishListRow>(
        "SELECT id, owner_id, name, key, visibility, date_created FROM wishlists WHERE key = $1",
    )
    .bind(key)
    .fetch_optional(executor)
    .await
}

pub async fn create_wishlist<'e>(
    executor: impl PgExecutor<'e>,
    owner_id: Uuid,
    name: &str,
    key: &str,
    visibility: Visibility,
) -> SqlxResult<WishListRow> {
    sqlx::query_as::<_, WishListRow>(
        r#"
        INSERT INTO wishlists (owner_id, name, key, visibility)
        VALUES ($1, $2, $3, $4)
        RETURNING id, owner_id, name, key, visibility, date_created
        "#,
    )
    .bind(owner_id)
    .bind(name)
    .bind(key)
    .bind(visibility.as_str())
    .fetch_one(executor)
    .await
}

pub async fn update_wishlist<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    name: Option<&str>,
    visibility: Option<Visibility>,
) -> SqlxResult<Option<WishListRow>> {
    sqlx::query_as::<_, WishListRow>(
        r#"
        UPDATE wishlists
        SET name = COALESCE($2, name),
            visibility = COALESCE($3, visibility)
        WHERE id = $1
        RETURNING id, owner_id, name, key, visibility, date_created
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(visibility.map(|v| v.as_str()))
    .fetch_optional(executor)
    .await
}

pub async fn delete_wishlist<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM wishlists WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Lines ──

pub async fn list_lines<'e>(
    executor: impl PgExecutor<'e>,
    wishlist_id: Uuid,
    page: LimitOffset,
) -> SqlxResult<Vec<WishListLineRow>> {
    sqlx::query_as::<_, WishListLineRow>(
        r#"
        SELECT id, wishlist_id, product_id, quantity, title
        FROM wishlist_lines
        WHERE wishlist_id = $1
        ORDER BY title ASC, id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(wishlist_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_lines<'e>(executor: impl PgExecutor<'e>, wishlist_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM wishlist_lines WHERE wishlist_id = $1")
        .bind(wishlist_id)
        .fetch_one(executor)
        .await
}

/// Add one unit of a product, creating the line the first time.
pub async fn add_product<'e>(
    executor: impl PgExecutor<'e>,
    wishlist_id: Uuid,
    product_id: Uuid,
    title: &str,
) -> SqlxResult<WishListLineRow> {
    sqlx::query_as::<_, WishListLineRow>(
        r#"
        INSERT INTO wishlist_lines (wishlist_id, product_id, quantity, title)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (wishlist_id, product_id)
            DO UPDATE SET quantity = wishlist_lines.quantity + 1
        RETURNING id, wishlist_id, product_id, quantity, title
        "#,
    )
    .bind(wishlist_id)
    .bind(product_id)
    .bind(title)
    .fetch_one(executor)
    .await
}

pub async fn remove_product<'e>(
    executor: impl PgExecutor<'e>,
    wishlist_id: Uuid,
    product_id: Uuid,
) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM wishlist_lines WHERE wishlist_id = $1 AND product_id = $2")
        .bind(wishlist_id)
        .bind(product_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Shared emails ──

pub async fn list_shared_emails<'e>(
    executor: impl PgExecutor<'e>,
    wishlist_id: Uuid,
) -> SqlxResult<Vec<WishListSharedEmailRow>> {
    sqlx::query_as::<_, WishListSharedEmailRow>(
        r#"
        SELECT id, wishlist_id, email
        FROM wishlist_shared_emails
        WHERE wishlist_id = $1
        ORDER BY email ASC
        "#,
    )
    .bind(wishlist_id)
    .fetch_all(executor)
    .await
}

pub async fn add_shared_email<'e>(
    executor: impl PgExecutor<'e>,
    wishlist_id: Uuid,
    email: &str,
) -> SqlxResult<WishListSharedEmailRow> {
    sqlx::query_as::<_, WishListSharedEmailRow>(
        r#"
        INSERT INTO wishlist_shared_emails (wishlist_id, email)
        VALUES ($1, $2)
        RETURNING id, wishlist_id, email
        "#,
    )
    .bind(wishlist_id)
    .bind(email)
    .fetch_one(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn list(visibility: Visibility, owner_id: Uuid) -> WishListRow {
        WishListRow {
            id: Uuid::new_v4(),
            owner_id,
            name: "Birthday".to_string(),
            key: "abc123".to_string(),
            visibility: visibility.as_str().to_string(),
            date_created: Utc::now(),
        }
    }

    #[test]
    fn owner_always_sees_and_edits() {
        let owner = Uuid::new_v4();
        let row = list(Visibility::Private, owner);
        let viewer = Viewer { user_id: owner, email: "owner@test.com" };

        assert!(row.is_allowed_to_see(Some(viewer), &[]));
        assert!(row.is_allowed_to_edit(Some(viewer)));
        assert!(!row.is_shareable());
    }

    #[test]
    fn shared_lists_need_an_invited_email() {
        let row = list(Visibility::Shared, Uuid::new_v4());
        let shared = vec!["Friend@Test.com".to_string()];
        let friend = Viewer { user_id: Uuid::new_v4(), email: "friend@test.com" };
        let stranger = Viewer { user_id: Uuid::new_v4(), email: "who@test.com" };

        assert!(row.is_allowed_to_see(Some(friend), &shared));
        assert!(!row.is_allowed_to_see(Some(stranger), &shared));
        assert!(!row.is_allowed_to_see(None, &shared));
        assert!(!row.is_allowed_to_edit(Some(friend)));
        assert!(row.is_shareable());
    }

    #[test]
    fn public_lists_are_visible_to_everyone() {
        let row = list(Visibility::Public, Uuid::new_v4());
        assert!(row.is_allowed_to_see(None, &[]));
        assert!(!row.is_allowed_to_edit(None));
    }

    #[test]
    fn unknown_stored_visibility_reads_as_private() {
        let mut row = list(Visibility::Public, Uuid::new_v4());
        row.visibility = "Friends".to_string();
        assert_eq!(row.visibility(), Visibility::Private);
    }
}
