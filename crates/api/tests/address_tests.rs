#![recursion_limit = "256"]

mod common;

use api::auth::Claims;
use api::gql::ShopSchema;
use async_graphql::Variables;
use common::*;
use serde_json::json;

const CREATE_ADDRESS: &str = r#"
    mutation Create($input: CreateUserAddressInput!) {
        createUserAddress(input: $input) { address { id hash line1 country { id } } }
    }
"#;

const UPDATE_ADDRESS: &str = r#"
    mutation Update($input: UpdateUserAddressInput!) {
        updateUserAddress(input: $input) { address { id hash line1 } }
    }
"#;

async fn create_address(schema: &ShopSchema, claims: &Claims) -> (String, String) {
    let variables = Variables::from_json(json!({
        "input": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "line1": "1 High St",
            "postcode": "N1 1AA",
            "countryId": "GB"
        }
    }));
    let response = execute_graphql(schema, CREATE_ADDRESS, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createUserAddress should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let address = &data["createUserAddress"]["address"];
    assert_eq!(address["country"]["id"], "GB");
    (
        address["id"].as_str().unwrap().to_string(),
        address["hash"].as_str().unwrap().to_string(),
    )
}

async fn update_line1(
    schema: &ShopSchema,
    claims: &Claims,
    id: &str,
    line1: &str,
) -> async_graphql::Response {
    let variables = Variables::from_json(json!({ "input": { "id": id, "line1": line1 } }));
    execute_graphql(schema, UPDATE_ADDRESS, Some(variables), Some(claims.clone())).await
}

#[tokio::test]
async fn test_unknown_country_is_rejected() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("addr_{}@test.com", unique())).await;

    let variables = Variables::from_json(json!({
        "input": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "line1": "1 High St",
            "postcode": "N1 1AA",
            "countryId": "ZZ"
        }
    }));
    let response = execute_graphql(&schema, CREATE_ADDRESS, Some(variables), Some(claims.clone())).await;
    assert_eq!(first_error(&response), "Invalid country ID.");

    let (id, _) = create_address(&schema, &claims).await;
    let variables = Variables::from_json(json!({ "input": { "id": id, "countryId": "ZZ" } }));
    let response = execute_graphql(&schema, UPDATE_ADDRESS, Some(variables), Some(claims)).await;
    assert_eq!(first_error(&response), "Invalid country ID.");
}

#[tokio::test]
async fn test_hash_follows_the_address_fields() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("addr_{}@test.com", unique())).await;

    let (id, original_hash) = create_address(&schema, &claims).await;
    assert_eq!(original_hash.len(), 16);

    let response = update_line1(&schema, &claims, &id, "2 High St").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let moved = &data["updateUserAddress"]["address"];
    assert_eq!(moved["line1"], "2 High St");
    assert_ne!(moved["hash"], original_hash.as_str());

    // Case and padding do not count as a different address.
    let response = update_line1(&schema, &claims, &id, "  1 HIGH ST ").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateUserAddress"]["address"]["hash"], original_hash.as_str());
}

#[tokio::test]
async fn test_addresses_belong_to_their_owner() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, owner) = create_test_user(&app_state, &format!("owner_{}@test.com", unique())).await;
    let (_, other) = create_test_user(&app_state, &format!("other_{}@test.com", unique())).await;

    let (id, _) = create_address(&schema, &owner).await;

    let response = update_line1(&schema, &other, &id, "Elsewhere").await;
    assert_eq!(first_error(&response), "Address not found.");

    let delete = r#"mutation Delete($id: ID!) { deleteUserAddress(id: $id) { success } }"#;
    let response = execute_graphql(
        &schema,
        delete,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(other.clone()),
    )
    .await;
    assert_eq!(first_error(&response), "Address not found.");

    let one = r#"query One($id: ID!) { userAddress(id: $id) { id } }"#;
    let response = execute_graphql(
        &schema,
        one,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(other),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert!(response.data.into_json().unwrap()["userAddress"].is_null());

    let response = execute_graphql(
        &schema,
        delete,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(owner),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap()["deleteUserAddress"]["success"], true);
}
