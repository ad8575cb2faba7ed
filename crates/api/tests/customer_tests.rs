#![recursion_limit = "256"]

mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

const CREATE_USER: &str = r#"
    mutation CreateUser($input: CreateUserInput!) {
        createUser(input: $input) {
            user { id email firstName lastName isActive }
        }
    }
"#;

#[tokio::test]
async fn test_create_user_then_login() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let email = format!("shopper_{}@test.com", unique());
    let variables = Variables::from_json(json!({
        "input": {
            "email": email,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "password": "correct horse"
        }
    }));

    let response = execute_graphql(&schema, CREATE_USER, Some(variables), None).await;
    assert!(
        response.errors.is_empty(),
        "createUser should succeed: {:?}",
        response.errors
    );
    let data = response.data.into_json().unwrap();
    assert_eq!(data["createUser"]["user"]["email"], email.as_str());
    assert_eq!(data["createUser"]["user"]["isActive"], true);

    let login = r#"
        mutation Login($email: String!, $password: String!) {
            login(email: $email, password: $password) { token user { email } }
        }
    "#;

    let good = Variables::from_json(json!({ "email": email, "password": "correct horse" }));
    let response = execute_graphql(&schema, login, Some(good), None).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert!(!data["login"]["token"].as_str().unwrap().is_empty());

    let bad = Variables::from_json(json!({ "email": email, "password": "wrong" }));
    let response = execute_graphql(&schema, login, Some(bad), None).await;
    assert_eq!(first_error(&response), "Invalid email or password.");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let email = format!("dupe_{}@test.com", unique());
    create_test_user(&app_state, &email).await;

    let variables = Variables::from_json(json!({
        "input": {
            "email": email,
            "firstName": "Second",
            "lastName": "User",
            "password": "password123"
        }
    }));
    let response = execute_graphql(&schema, CREATE_USER, Some(variables), None).await;

    assert_eq!(
        first_error(&response),
        "A user with this email already exists"
    );
}

#[tokio::test]
async fn test_users_cannot_update_each_other() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let (_, alice) = create_test_user(&app_state, &format!("alice_{}@test.com", unique())).await;
    let (bob_id, _) = create_test_user(&app_state, &format!("bob_{}@test.com", unique())).await;

    let query = r#"
        mutation UpdateUser($input: UpdateUserInput!) {
            updateUser(input: $input) { user { id firstName } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": { "id": bob_id.to_string(), "firstName": "Mallory" }
    }));

    let response = execute_graphql(&schema, query, Some(variables), Some(alice)).await;

    assert_eq!(first_error(&response), "Not authorized to modify this user.");
}

#[tokio::test]
async fn test_product_alert_for_missing_product() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);

    let query = r#"
        mutation CreateAlert($input: CreateProductAlertInput!) {
            createProductAlert(input: $input) { productAlert { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "productId": uuid::Uuid::new_v4().to_string(),
            "email": "watcher@test.com"
        }
    }));

    let response = execute_graphql(&schema, query, Some(variables), None).await;

    assert_eq!(first_error(&response), "Product not found.");
}
