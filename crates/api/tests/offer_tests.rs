#![recursion_limit = "256"]

mod common;

use api::auth::Claims;
use api::gql::ShopSchema;
use async_graphql::Variables;
use common::*;
use serde_json::json;
use uuid::Uuid;

const ADD_TO_RANGE: &str = r#"
    mutation Add($input: AddProductToRangeInput!) {
        addProductToRange(input: $input) { success }
    }
"#;

async fn create_range(schema: &ShopSchema, claims: &Claims) -> String {
    let query = r#"
        mutation Range($input: CreateRangeInput!) {
            createRange(input: $input) { range { id slug isPublic } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "name": format!("Summer Picks {}", unique()) }
    }));
    let response = execute_graphql(schema, query, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createRange should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let range = &data["createRange"]["range"];
    assert!(range["slug"].as_str().unwrap().starts_with("summer-picks-"));
    assert_eq!(range["isPublic"], true);
    range["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_adding_a_product_twice_keeps_one_membership() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("offers_{}@test.com", unique())).await;
    let range_id = create_range(&schema, &claims).await;
    let product_id = create_test_product(&app_state, "Sun Hat").await;

    for _ in 0..2 {
        let variables = Variables::from_json(json!({
            "input": { "rangeId": range_id, "productId": product_id.to_string() }
        }));
        let response =
            execute_graphql(&schema, ADD_TO_RANGE, Some(variables), Some(claims.clone())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap()["addProductToRange"]["success"],
            true
        );
    }

    let query = r#"query One($id: ID!) { range(id: $id) { products { product { id } } } }"#;
    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "id": range_id }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let products = data["range"]["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["product"]["id"], product_id.to_string());
}

#[tokio::test]
async fn test_missing_range_is_reported() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("offers_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Beach Towel").await;

    let variables = Variables::from_json(json!({
        "input": { "rangeId": Uuid::new_v4().to_string(), "productId": product_id.to_string() }
    }));
    let response = execute_graphql(&schema, ADD_TO_RANGE, Some(variables), Some(claims.clone())).await;
    assert_eq!(first_error(&response), "Range not found");

    let query = r#"
        mutation Condition($input: CreateConditionInput!) {
            createCondition(input: $input) { condition { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "rangeId": Uuid::new_v4().to_string(), "type": "Count", "value": "2" }
    }));
    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;
    assert_eq!(first_error(&response), "Range not found");
}

#[tokio::test]
async fn test_offer_needs_its_condition_and_benefit() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("offers_{}@test.com", unique())).await;
    let range_id = create_range(&schema, &claims).await;

    let condition = r#"
        mutation Condition($input: CreateConditionInput!) {
            createCondition(input: $input) { condition { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "rangeId": range_id, "type": "count", "value": "3" }
    }));
    let response = execute_graphql(&schema, condition, Some(variables), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let condition_id = response.data.into_json().unwrap()["createCondition"]["condition"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let offer = r#"
        mutation Offer($input: CreateConditionalOfferInput!) {
            createConditionalOffer(input: $input) { offer { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "name": "Three for two",
            "offerType": "Site",
            "conditionId": condition_id,
            "benefitId": Uuid::new_v4().to_string()
        }
    }));
    let response = execute_graphql(&schema, offer, Some(variables), Some(claims)).await;
    assert_eq!(first_error(&response), "Condition or Benefit not found");
}
