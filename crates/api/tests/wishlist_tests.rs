#![recursion_limit = "256"]

mod common;

use api::auth::Claims;
use api::gql::ShopSchema;
use async_graphql::Variables;
use common::*;
use serde_json::json;

async fn create_wishlist(schema: &ShopSchema, claims: &Claims, visibility: &str) -> (String, String) {
    let query = r#"
        mutation Create($input: CreateWishListInput!) {
            createWishlist(input: $input) { wishlist { id key visibility isShareable } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "name": "Birthday", "visibility": visibility }
    }));

    let response = execute_graphql(schema, query, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createWishlist should succeed: {:?}",
        response.errors
    );
    let data = response.data.into_json().unwrap();
    let wishlist = &data["createWishlist"]["wishlist"];
    assert_eq!(wishlist["visibility"], visibility);
    assert_eq!(wishlist["key"].as_str().unwrap().len(), 6);

    (
        wishlist["id"].as_str().unwrap().to_string(),
        wishlist["key"].as_str().unwrap().to_string(),
    )
}

const WISHLIST: &str = r#"query One($id: ID!) { wishlist(id: $id) { id name } }"#;

#[tokio::test]
async fn test_private_lists_are_hidden_from_others() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, owner) = create_test_user(&app_state, &format!("owner_{}@test.com", unique())).await;
    let (_, stranger) =
        create_test_user(&app_state, &format!("stranger_{}@test.com", unique())).await;
    let (id, key) = create_wishlist(&schema, &owner, "PRIVATE").await;

    let variables = || Variables::from_json(json!({ "id": id }));

    let response = execute_graphql(&schema, WISHLIST, Some(variables()), Some(owner)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = execute_graphql(&schema, WISHLIST, Some(variables()), Some(stranger.clone())).await;
    assert_eq!(first_error(&response), "Not authorized to view this wishlist.");

    let by_key = r#"query Key($key: String!) { wishlistByKey(key: $key) { id } }"#;
    let response = execute_graphql(
        &schema,
        by_key,
        Some(Variables::from_json(json!({ "key": key }))),
        Some(stranger),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert!(response.data.into_json().unwrap()["wishlistByKey"].is_null());
}

#[tokio::test]
async fn test_shared_lists_are_visible_to_invited_emails() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, owner) = create_test_user(&app_state, &format!("owner_{}@test.com", unique())).await;
    let friend_email = format!("friend_{}@test.com", unique());
    let (_, friend) = create_test_user(&app_state, &friend_email).await;
    let (id, _) = create_wishlist(&schema, &owner, "SHARED").await;

    let share = r#"
        mutation Share($input: ShareWishListInput!) {
            shareWishlist(input: $input) { success }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "wishlistId": id, "email": friend_email.to_uppercase() }
    }));
    let response = execute_graphql(&schema, share, Some(variables), Some(owner)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = execute_graphql(
        &schema,
        WISHLIST,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(friend),
    )
    .await;
    assert!(
        response.errors.is_empty(),
        "invited user should see the list: {:?}",
        response.errors
    );

    // Anonymous callers never see shared lists.
    let response = execute_graphql(
        &schema,
        WISHLIST,
        Some(Variables::from_json(json!({ "id": id }))),
        None,
    )
    .await;
    assert_eq!(first_error(&response), "Not authorized to view this wishlist.");
}

#[tokio::test]
async fn test_only_the_owner_edits() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, owner) = create_test_user(&app_state, &format!("owner_{}@test.com", unique())).await;
    let (_, stranger) =
        create_test_user(&app_state, &format!("stranger_{}@test.com", unique())).await;
    let (id, _) = create_wishlist(&schema, &owner, "PUBLIC").await;
    let product_id = create_test_product(&app_state, "Scarf").await;

    let add = r#"
        mutation Add($input: WishListProductInput!) {
            addToWishlist(input: $input) { wishlist { lines { quantity title } } }
        }
    "#;
    let variables = || {
        Variables::from_json(json!({
            "input": { "wishlistId": id, "productId": product_id.to_string() }
        }))
    };

    let response = execute_graphql(&schema, add, Some(variables()), Some(stranger.clone())).await;
    assert_eq!(first_error(&response), "Not authorized to edit this wishlist.");

    execute_graphql(&schema, add, Some(variables()), Some(owner.clone())).await;
    let response = execute_graphql(&schema, add, Some(variables()), Some(owner)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(
        data["addToWishlist"]["wishlist"]["lines"],
        json!([{ "quantity": 2, "title": "Scarf" }])
    );

    // Public lists are readable by anyone.
    let response = execute_graphql(
        &schema,
        WISHLIST,
        Some(Variables::from_json(json!({ "id": id }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let delete = r#"mutation Delete($id: ID!) { deleteWishlist(wishlistId: $id) { success } }"#;
    let response = execute_graphql(
        &schema,
        delete,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(stranger),
    )
    .await;
    assert_eq!(first_error(&response), "Not authorized to delete this wishlist.");
}

#[tokio::test]
async fn test_paging_is_stable_when_lists_share_a_timestamp() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (owner_id, owner) =
        create_test_user(&app_state, &format!("pager_{}@test.com", unique())).await;

    sqlx::query(
        "INSERT INTO wishlists (owner_id, name, key, date_created)
         SELECT $1, 'List ' || n, $2 || n, '2026-01-01T00:00:00Z'::TIMESTAMPTZ
         FROM generate_series(1, 5) AS n",
    )
    .bind(owner_id)
    .bind(format!("k{}-", unique()))
    .execute(&app_state.db)
    .await
    .unwrap();

    let query = r#"
        query Page($after: String) {
            wishlists(first: 2, after: $after) {
                edges { node { id } }
                pageInfo { hasNextPage endCursor }
            }
        }
    "#;

    let mut seen = Vec::new();
    let mut after: Option<String> = None;
    loop {
        let variables = Variables::from_json(json!({ "after": after }));
        let response = execute_graphql(&schema, query, Some(variables), Some(owner.clone())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        let page = &data["wishlists"];
        for edge in page["edges"].as_array().unwrap() {
            seen.push(edge["node"]["id"].as_str().unwrap().to_string());
        }
        if page["pageInfo"]["hasNextPage"] != true {
            break;
        }
        after = page["pageInfo"]["endCursor"].as_str().map(str::to_string);
    }

    let mut distinct = seen.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(seen.len(), 5);
    assert_eq!(distinct.len(), 5, "pages repeated a wishlist: {seen:?}");
}
