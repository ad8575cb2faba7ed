#![recursion_limit = "256"]

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

const RECORD_VIEW: &str = r#"
    mutation View($productId: ID!) {
        createUserProductView(productId: $productId) {
            userProductView { id product { id } user { email } }
        }
    }
"#;

const RECORD_SEARCH: &str = r#"
    mutation Search($query: String!) {
        createUserSearch(query: $query) { userSearch { id query } }
    }
"#;

const MY_ACTIVITY: &str = r#"
    query {
        userProductViews { edges { node { product { id } } } }
        userSearches { edges { node { query } } }
    }
"#;

#[tokio::test]
async fn test_view_of_missing_product_is_rejected() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("viewer_{}@test.com", unique())).await;

    let variables = Variables::from_json(json!({ "productId": uuid::Uuid::new_v4().to_string() }));
    let response = execute_graphql(&schema, RECORD_VIEW, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Product not found.");
}

#[tokio::test]
async fn test_views_bump_the_product_record() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let email = format!("viewer_{}@test.com", unique());
    let (_, claims) = create_test_user(&app_state, &email).await;
    let product_id = create_test_product(&app_state, "Teapot").await;

    for _ in 0..2 {
        let variables = Variables::from_json(json!({ "productId": product_id.to_string() }));
        let response =
            execute_graphql(&schema, RECORD_VIEW, Some(variables), Some(claims.clone())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        let view = &data["createUserProductView"]["userProductView"];
        assert_eq!(view["product"]["id"], product_id.to_string());
        assert_eq!(view["user"]["email"], email.as_str());
    }

    let num_views: i32 =
        sqlx::query_scalar("SELECT num_views FROM product_records WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&app_state.db)
            .await
            .unwrap();
    assert_eq!(num_views, 2);
}

#[tokio::test]
async fn test_views_and_searches_are_scoped_to_the_caller() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, alice) = create_test_user(&app_state, &format!("alice_{}@test.com", unique())).await;
    let (_, bob) = create_test_user(&app_state, &format!("bob_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Saucer").await;

    let variables = Variables::from_json(json!({ "productId": product_id.to_string() }));
    let response = execute_graphql(&schema, RECORD_VIEW, Some(variables), Some(alice.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let variables = Variables::from_json(json!({ "query": "  green tea  " }));
    let response = execute_graphql(&schema, RECORD_SEARCH, Some(variables), Some(alice.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["createUserSearch"]["userSearch"]["query"], "green tea");

    let response = execute_graphql(&schema, MY_ACTIVITY, None, Some(alice)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let views = data["userProductViews"]["edges"].as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["node"]["product"]["id"], product_id.to_string());
    assert_eq!(data["userSearches"]["edges"][0]["node"]["query"], "green tea");

    let response = execute_graphql(&schema, MY_ACTIVITY, None, Some(bob)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert!(data["userProductViews"]["edges"].as_array().unwrap().is_empty());
    assert!(data["userSearches"]["edges"].as_array().unwrap().is_empty());
}
