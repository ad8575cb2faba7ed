#![recursion_limit = "256"]

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

// None of these requests reach the database: the pool behind
// `offline_state` never connects.

#[tokio::test]
async fn test_mutations_require_authentication() {
    let state = offline_state();
    let schema = test_schema(&state);

    let cases = [
        (
            r#"mutation { addToBasket(productId: "00000000-0000-0000-0000-000000000001") { basket { id } } }"#,
            "Authentication required to add to basket.",
        ),
        (
            r#"mutation { createWishlist(input: { name: "Gifts" }) { wishlist { id } } }"#,
            "Authentication required to create a wishlist.",
        ),
        (
            r#"mutation { createPartner(input: { name: "Acme", code: "acme" }) { partner { id } } }"#,
            "Authentication required to create a partner.",
        ),
        (
            r#"mutation { createSourceType(input: { name: "Gift card" }) { sourceType { id } } }"#,
            "Authentication required to create a source type.",
        ),
    ];

    for (query, expected) in cases {
        let response = execute_graphql(&schema, query, None, None).await;
        assert_eq!(first_error(&response), expected, "query: {query}");
    }
}

#[tokio::test]
async fn test_malformed_ids_are_rejected() {
    let state = offline_state();
    let schema = test_schema(&state);

    let response = execute_graphql(
        &schema,
        r#"query { product(id: "not-a-uuid") { id } }"#,
        None,
        None,
    )
    .await;

    assert!(
        first_error(&response).starts_with("Invalid product ID"),
        "unexpected error: {:?}",
        response.errors
    );
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let state = offline_state();
    let schema = test_schema(&state);

    let query = r#"
        query Countries($first: Int) {
            countries(first: $first) { edges { node { id } } }
        }
    "#;
    let variables = Variables::from_json(json!({ "first": 101 }));

    let response = execute_graphql(&schema, query, Some(variables), None).await;

    assert_eq!(
        first_error(&response),
        "Requesting 101 records exceeds the `first` limit of 100 records."
    );
}

#[tokio::test]
async fn test_anonymous_wishlists_are_empty() {
    let state = offline_state();
    let schema = test_schema(&state);

    let response = execute_graphql(
        &schema,
        "query { wishlists { edges { node { id } } pageInfo { hasNextPage } } }",
        None,
        None,
    )
    .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["wishlists"]["edges"], json!([]));
    assert_eq!(data["wishlists"]["pageInfo"]["hasNextPage"], false);
}
