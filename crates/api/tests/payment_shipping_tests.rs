#![recursion_limit = "256"]

mod common;

use std::str::FromStr;

use async_graphql::Variables;
use common::*;
use rust_decimal::Decimal;
use serde_json::json;

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).unwrap()
}

#[tokio::test]
async fn test_bankcards_store_only_the_last_digits() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (user_id, claims) = create_test_user(&app_state, &format!("card_{}@test.com", unique())).await;

    let query = r#"
        mutation Card($input: CreateBankcardInput!) {
            createBankcard(input: $input) {
                bankcard { number obfuscatedNumber expiryDate user { id } }
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "userId": user_id.to_string(),
            "cardType": "Visa",
            "number": "4111 1111 1111 1234",
            "expiryDate": "02/28"
        }
    }));

    let response = execute_graphql(&schema, query, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createBankcard should succeed: {:?}",
        response.errors
    );
    let data = response.data.into_json().unwrap();
    let card = &data["createBankcard"]["bankcard"];
    assert_eq!(card["number"], "XXXX-XXXX-XXXX-1234");
    assert_eq!(card["obfuscatedNumber"], "XXXX-XXXX-XXXX-1234");
    assert_eq!(card["expiryDate"], "2028-02-29");
    assert_eq!(card["user"]["id"], user_id.to_string());

    let variables = Variables::from_json(json!({
        "input": {
            "userId": user_id.to_string(),
            "cardType": "Visa",
            "number": "4111111111111234",
            "expiryDate": "13/28"
        }
    }));
    let response = execute_graphql(&schema, query, Some(variables), Some(claims.clone())).await;
    assert_eq!(first_error(&response), "Invalid expiry date. Use MM/YY.");

    let variables = Variables::from_json(json!({
        "input": {
            "userId": user_id.to_string(),
            "cardType": "Visa",
            "number": "12-ab",
            "expiryDate": "02/28"
        }
    }));
    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;
    assert_eq!(first_error(&response), "Invalid card number.");
}

#[tokio::test]
async fn test_source_requires_known_order() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("source_{}@test.com", unique())).await;

    let query = r#"
        mutation Source($input: CreateSourceInput!) {
            createSource(input: $input) { source { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "orderId": uuid::Uuid::new_v4().to_string(),
            "sourceTypeId": uuid::Uuid::new_v4().to_string(),
            "currency": "GBP",
            "amountAllocated": "10.00"
        }
    }));

    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Order not found");
}

#[tokio::test]
async fn test_weight_bands_chain_their_ranges() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("ship_{}@test.com", unique())).await;

    let create_method = r#"
        mutation Method($input: CreateWeightBasedMethodInput!) {
            createWeightBasedMethod(input: $input) {
                weightBasedMethod { id weightAttribute numBands countries { id } }
            }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "code": format!("wb-{}", unique()),
            "name": "By weight",
            "defaultWeight": "0.5",
            "countries": ["gb", "US"]
        }
    }));
    let response =
        execute_graphql(&schema, create_method, Some(variables), Some(claims.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    let method = &data["createWeightBasedMethod"]["weightBasedMethod"];
    assert_eq!(method["weightAttribute"], "weight");
    assert_eq!(method["numBands"], 0);
    assert_eq!(method["countries"].as_array().unwrap().len(), 2);
    let method_id = method["id"].as_str().unwrap().to_string();

    let create_band = r#"
        mutation Band($input: CreateWeightBandInput!) {
            createWeightBand(input: $input) { weightBand { id } }
        }
    "#;
    for (upper_limit, charge) in [("5", "7.50"), ("1", "2.50")] {
        let variables = Variables::from_json(json!({
            "input": { "methodId": method_id, "upperLimit": upper_limit, "charge": charge }
        }));
        let response =
            execute_graphql(&schema, create_band, Some(variables), Some(claims.clone())).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }

    let bands = r#"
        query Bands($methodId: ID!) {
            weightBandsByMethod(methodId: $methodId) {
                edges { node { weightFrom weightTo charge } }
            }
            weightBasedMethod(id: $methodId) { numBands topBand { weightTo } }
        }
    "#;
    let response = execute_graphql(
        &schema,
        bands,
        Some(Variables::from_json(json!({ "methodId": method_id }))),
        None,
    )
    .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();

    let edges = data["weightBandsByMethod"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(decimal(&edges[0]["node"]["weightFrom"]), Decimal::ZERO);
    assert_eq!(decimal(&edges[0]["node"]["weightTo"]), Decimal::ONE);
    assert_eq!(decimal(&edges[1]["node"]["weightFrom"]), Decimal::ONE);
    assert_eq!(decimal(&edges[1]["node"]["weightTo"]), Decimal::new(5, 0));

    assert_eq!(data["weightBasedMethod"]["numBands"], 2);
    assert_eq!(
        decimal(&data["weightBasedMethod"]["topBand"]["weightTo"]),
        Decimal::new(5, 0)
    );
}

#[tokio::test]
async fn test_weight_band_for_missing_method() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, claims) = create_test_user(&app_state, &format!("ship_{}@test.com", unique())).await;

    let query = r#"
        mutation Band($input: CreateWeightBandInput!) {
            createWeightBand(input: $input) { weightBand { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "methodId": uuid::Uuid::new_v4().to_string(),
            "upperLimit": "1",
            "charge": "1"
        }
    }));

    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "WeightBased method not found");
}
