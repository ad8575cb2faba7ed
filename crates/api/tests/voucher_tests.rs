#![recursion_limit = "256"]

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

const CREATE_VOUCHER: &str = r#"
    mutation Create($input: CreateVoucherInput!) {
        createVoucher(input: $input) { voucher { id code usage numOrders } }
    }
"#;

fn voucher_input(code: &str, usage: &str) -> Variables {
    Variables::from_json(json!({
        "input": {
            "name": "Spring sale",
            "code": code,
            "usage": usage,
            "startDatetime": "2025-01-01T00:00:00Z",
            "endDatetime": "2099-01-01T00:00:00Z"
        }
    }))
}

#[tokio::test]
async fn test_voucher_codes_are_case_insensitive() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("voucher_{}@test.com", unique())).await;
    let code = format!("spring{}", unique());

    let response = execute_graphql(
        &schema,
        CREATE_VOUCHER,
        Some(voucher_input(&code, "MULTI_USE")),
        Some(claims),
    )
    .await;
    assert!(
        response.errors.is_empty(),
        "createVoucher should succeed: {:?}",
        response.errors
    );
    let data = response.data.into_json().unwrap();
    assert_eq!(data["createVoucher"]["voucher"]["code"], code.to_uppercase());
    assert_eq!(data["createVoucher"]["voucher"]["usage"], "Multi-use");

    let lookup = r#"
        query ByCode($code: String!) { voucherByCode(code: $code) { code } }
    "#;
    let response = execute_graphql(
        &schema,
        lookup,
        Some(Variables::from_json(json!({ "code": code }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["voucherByCode"]["code"], code.to_uppercase());

    let response = execute_graphql(
        &schema,
        lookup,
        Some(Variables::from_json(json!({ "code": "NO-SUCH-CODE" }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert!(response.data.into_json().unwrap()["voucherByCode"].is_null());
}

#[tokio::test]
async fn test_unknown_usage_is_rejected() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("voucher_{}@test.com", unique())).await;

    let response = execute_graphql(
        &schema,
        CREATE_VOUCHER,
        Some(voucher_input(&format!("x{}", unique()), "Twice a day")),
        Some(claims),
    )
    .await;

    assert_eq!(first_error(&response), "Unknown voucher usage: Twice a day");
}

#[tokio::test]
async fn test_missing_references_report_failure() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("voucher_{}@test.com", unique())).await;

    let apply = r#"
        mutation Apply($input: CreateVoucherApplicationInput!) {
            createVoucherApplication(input: $input) { success }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "voucherId": uuid::Uuid::new_v4().to_string(),
            "orderId": uuid::Uuid::new_v4().to_string()
        }
    }));
    let response = execute_graphql(&schema, apply, Some(variables), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap()["createVoucherApplication"]["success"],
        false
    );

    let delete = r#"mutation Delete($id: ID!) { deleteVoucher(id: $id) { success } }"#;
    let variables = Variables::from_json(json!({ "id": uuid::Uuid::new_v4().to_string() }));
    let response = execute_graphql(&schema, delete, Some(variables), Some(claims)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap()["deleteVoucher"]["success"], false);
}
