#![recursion_limit = "256"]

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

const ADDRESS_INPUT: &str = r#"{ "line1": "1 High Street", "line4": "London", "postcode": "N1 1AA", "countryId": "gb" }"#;

async fn place_order(
    schema: &api::gql::ShopSchema,
    claims: &api::auth::Claims,
    user_id: uuid::Uuid,
) -> String {
    let address: serde_json::Value = serde_json::from_str(ADDRESS_INPUT).unwrap();

    let shipping = r#"
        mutation Ship($input: OrderAddressInput!) {
            createShippingAddress(input: $input) { shippingAddress { id country { id } } }
        }
    "#;
    let response = execute_graphql(
        schema,
        shipping,
        Some(Variables::from_json(json!({ "input": address }))),
        Some(claims.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["createShippingAddress"]["shippingAddress"]["country"]["id"], "GB");
    let shipping_id = data["createShippingAddress"]["shippingAddress"]["id"].clone();

    let billing = r#"
        mutation Bill($input: OrderAddressInput!) {
            createBillingAddress(input: $input) { billingAddress { id } }
        }
    "#;
    let response = execute_graphql(
        schema,
        billing,
        Some(Variables::from_json(json!({ "input": address }))),
        Some(claims.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let billing_id = data["createBillingAddress"]["billingAddress"]["id"].clone();

    let create = r#"
        mutation Create($input: CreateOrderInput!) {
            createOrder(input: $input) { order { id status number } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "userId": user_id.to_string(),
            "billingAddressId": billing_id,
            "shippingAddressId": shipping_id,
            "totalInclTax": "24.00",
            "totalExclTax": "20.00",
            "shippingInclTax": "0.00",
            "shippingExclTax": "0.00",
            "currency": "GBP"
        }
    }));
    let response = execute_graphql(schema, create, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createOrder should succeed: {:?}",
        response.errors
    );
    let data = response.data.into_json().unwrap();
    assert_eq!(data["createOrder"]["order"]["status"], "Pending");
    data["createOrder"]["order"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_status_changes_are_recorded_only_on_change() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (user_id, claims) = create_test_user(&app_state, &format!("order_{}@test.com", unique())).await;
    let order_id = place_order(&schema, &claims, user_id).await;

    let update = r#"
        mutation Update($input: UpdateOrderStatusInput!) {
            updateOrderStatus(input: $input) {
                order { status statusChanges { oldStatus newStatus } }
            }
        }
    "#;

    for status in ["Processing", "Processing"] {
        let variables = Variables::from_json(json!({
            "input": { "id": order_id, "status": status }
        }));
        let response = execute_graphql(&schema, update, Some(variables), Some(claims.clone())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }

    let query = r#"
        query Order($id: ID!) {
            order(id: $id) { status statusChanges { oldStatus newStatus } }
        }
    "#;
    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "id": order_id }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(data["order"]["status"], "Processing");
    assert_eq!(
        data["order"]["statusChanges"],
        json!([{ "oldStatus": "Pending", "newStatus": "Processing" }])
    );
}

#[tokio::test]
async fn test_create_order_with_unknown_references() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (user_id, claims) = create_test_user(&app_state, &format!("order_{}@test.com", unique())).await;

    let create = r#"
        mutation Create($input: CreateOrderInput!) {
            createOrder(input: $input) { order { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "userId": user_id.to_string(),
            "billingAddressId": uuid::Uuid::new_v4().to_string(),
            "shippingAddressId": "not-an-id",
            "totalInclTax": "1.00",
            "totalExclTax": "1.00",
            "shippingInclTax": "0.00",
            "shippingExclTax": "0.00",
            "currency": "GBP"
        }
    }));

    let response = execute_graphql(&schema, create, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Invalid user or address IDs");
}

#[tokio::test]
async fn test_order_address_requires_known_country() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("order_{}@test.com", unique())).await;

    let shipping = r#"
        mutation Ship($input: OrderAddressInput!) {
            createShippingAddress(input: $input) { shippingAddress { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "line1": "Nowhere", "countryId": "ZZ" }
    }));

    let response = execute_graphql(&schema, shipping, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Invalid country ID.");
}
