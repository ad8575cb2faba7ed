#![recursion_limit = "256"]

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;
use uuid::Uuid;

const UPDATE_STOCK: &str = r#"
    mutation Update($input: UpdateStockRecordInput!) {
        updateStockRecord(input: $input) {
            stockRecord { id numInStock isBelowThreshold netStockLevel }
        }
    }
"#;

async fn alert_statuses(app_state: &api::state::AppState, record_id: Uuid) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT status FROM stock_alerts WHERE stockrecord_id = $1 ORDER BY date_created",
    )
    .bind(record_id)
    .fetch_all(&app_state.db)
    .await
    .expect("Failed to read stock alerts")
}

#[tokio::test]
async fn test_stock_alerts_open_and_close_with_stock_level() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("stock_{}@test.com", unique())).await;
    let product_id = create_test_product(&app_state, "Mug").await;
    let (_, record_id) = create_test_stock_record(&app_state, product_id, "4.00", 20).await;

    let drop = Variables::from_json(json!({
        "input": { "id": record_id.to_string(), "numInStock": 2, "lowStockThreshold": 5 }
    }));
    let response = execute_graphql(&schema, UPDATE_STOCK, Some(drop), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateStockRecord"]["stockRecord"]["isBelowThreshold"], true);

    // A second low update keeps the single open alert.
    let still_low = Variables::from_json(json!({
        "input": { "id": record_id.to_string(), "numInStock": 1 }
    }));
    let response =
        execute_graphql(&schema, UPDATE_STOCK, Some(still_low), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(alert_statuses(&app_state, record_id).await, vec!["Open"]);

    let restock = Variables::from_json(json!({
        "input": { "id": record_id.to_string(), "numInStock": 50 }
    }));
    let response = execute_graphql(&schema, UPDATE_STOCK, Some(restock), Some(claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateStockRecord"]["stockRecord"]["isBelowThreshold"], false);
    assert_eq!(alert_statuses(&app_state, record_id).await, vec!["Closed"]);
}

#[tokio::test]
async fn test_stock_record_requires_existing_partner_and_product() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("stock_{}@test.com", unique())).await;

    let query = r#"
        mutation Create($input: CreateStockRecordInput!) {
            createStockRecord(input: $input) { stockRecord { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "partnerId": Uuid::new_v4().to_string(),
            "productId": Uuid::new_v4().to_string(),
            "partnerSku": "SKU-1",
            "priceCurrency": "GBP",
            "price": "1.00",
            "numInStock": 1
        }
    }));

    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Invalid partner or product ID");
}

#[tokio::test]
async fn test_update_missing_partner() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("partner_{}@test.com", unique())).await;

    let query = r#"
        mutation Update($input: UpdatePartnerInput!) {
            updatePartner(input: $input) { partner { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "id": Uuid::new_v4().to_string(), "name": "Renamed" }
    }));

    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Partner not found");
}
