#![recursion_limit = "256"]

mod common;

use std::str::FromStr;

use async_graphql::Variables;
use common::*;
use rust_decimal::Decimal;
use serde_json::json;

const ADD_TO_BASKET: &str = r#"
    mutation Add($productId: ID!, $quantity: Int) {
        addToBasket(productId: $productId, quantity: $quantity) {
            basket {
                id
                status
                numLines
                numItems
                isEmpty
                totalInclTax
                lines { id quantity lineReference }
            }
        }
    }
"#;

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).unwrap()
}

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("basket_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Tea Pot").await;
    create_test_stock_record(&app_state, product_id, "12.50", 10).await;

    for quantity in [1, 2] {
        let variables = Variables::from_json(json!({
            "productId": product_id.to_string(),
            "quantity": quantity
        }));
        let response =
            execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims.clone())).await;
        assert!(
            response.errors.is_empty(),
            "addToBasket should succeed: {:?}",
            response.errors
        );
    }

    let variables = Variables::from_json(json!({ "productId": product_id.to_string() }));
    let response = execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let basket = &data["addToBasket"]["basket"];
    assert_eq!(basket["status"], "Open");
    assert_eq!(basket["numLines"], 1);
    assert_eq!(basket["numItems"], 4);
    assert_eq!(basket["isEmpty"], false);
    assert_eq!(decimal(&basket["totalInclTax"]), Decimal::new(5000, 2));
    assert_eq!(basket["lines"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_missing_or_null_quantity_adds_one_item() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("basket_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Saucer").await;
    create_test_stock_record(&app_state, product_id, "3.00", 10).await;

    let variables = Variables::from_json(json!({ "productId": product_id.to_string() }));
    let response =
        execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["addToBasket"]["basket"]["numItems"], 1);

    let variables = Variables::from_json(json!({
        "productId": product_id.to_string(),
        "quantity": null
    }));
    let response = execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["addToBasket"]["basket"]["numItems"], 2);
    assert_eq!(data["addToBasket"]["basket"]["lines"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_add_to_basket_rejects_bad_input() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("basket_{}@test.com", unique())).await;
    let unpriced = create_test_product(&app_state, "Unpriced").await;

    let variables = Variables::from_json(json!({
        "productId": unpriced.to_string(),
        "quantity": 0
    }));
    let response =
        execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims.clone())).await;
    assert_eq!(first_error(&response), "Quantity must be greater than zero.");

    let variables = Variables::from_json(json!({ "productId": unpriced.to_string() }));
    let response =
        execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims.clone())).await;
    assert_eq!(first_error(&response), "Product is not available for purchase.");

    let variables = Variables::from_json(json!({
        "productId": uuid::Uuid::new_v4().to_string()
    }));
    let response = execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims)).await;
    assert_eq!(first_error(&response), "Product not found.");
}

#[tokio::test]
async fn test_lines_are_private_to_their_owner() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, owner) = create_test_user(&app_state, &format!("owner_{}@test.com", unique())).await;
    let (_, other) = create_test_user(&app_state, &format!("other_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Kettle").await;
    create_test_stock_record(&app_state, product_id, "30.00", 5).await;

    let variables = Variables::from_json(json!({ "productId": product_id.to_string() }));
    let response = execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(owner)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let line_id = data["addToBasket"]["basket"]["lines"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let remove = r#"
        mutation Remove($lineId: ID!) {
            removeFromBasket(lineId: $lineId) { success }
        }
    "#;
    let variables = Variables::from_json(json!({ "lineId": line_id }));
    let response = execute_graphql(&schema, remove, Some(variables), Some(other)).await;

    assert_eq!(first_error(&response), "Line not found.");
}

#[tokio::test]
async fn test_concurrent_first_adds_share_one_open_basket() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (user_id, claims) =
        create_test_user(&app_state, &format!("rush_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Mug").await;
    create_test_stock_record(&app_state, product_id, "4.00", 50).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..6 {
        let schema = schema.clone();
        let claims = claims.clone();
        tasks.spawn(async move {
            let variables = Variables::from_json(json!({ "productId": product_id.to_string() }));
            let response =
                execute_graphql(&schema, ADD_TO_BASKET, Some(variables), Some(claims)).await;
            first_error(&response)
        });
    }

    while let Some(result) = tasks.join_next().await {
        let error = result.expect("addToBasket task panicked");
        assert!(error.is_empty(), "concurrent addToBasket failed: {error}");
    }

    let (baskets, items): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(DISTINCT b.id), COALESCE(SUM(l.quantity), 0)::BIGINT
         FROM baskets b
         LEFT JOIN basket_lines l ON l.basket_id = b.id
         WHERE b.owner_id = $1 AND b.status = 'Open'",
    )
    .bind(user_id)
    .fetch_one(&app_state.db)
    .await
    .unwrap();

    assert_eq!(baskets, 1);
    assert_eq!(items, 6);
}
