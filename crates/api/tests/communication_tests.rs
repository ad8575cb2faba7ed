#![recursion_limit = "256"]

mod common;

use api::auth::Claims;
use api::gql::ShopSchema;
use async_graphql::Variables;
use common::*;
use serde_json::json;
use uuid::Uuid;

const MARK_READ: &str = r#"
    mutation Read($id: ID!) { markNotificationAsRead(id: $id) { success } }
"#;

const NOTIFICATION: &str = r#"
    query One($id: ID!) { notification(id: $id) { id dateRead location } }
"#;

async fn notify(schema: &ShopSchema, claims: &Claims, recipient_id: Uuid) -> String {
    let query = r#"
        mutation Notify($input: CreateNotificationInput!) {
            createNotification(input: $input) { notification { id location dateRead } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "recipientId": recipient_id.to_string(),
            "subject": "Your order shipped",
            "body": "It is on its way."
        }
    }));
    let response = execute_graphql(schema, query, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createNotification should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let notification = &data["createNotification"]["notification"];
    assert_eq!(notification["location"], "Inbox");
    assert!(notification["dateRead"].is_null());
    notification["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_only_the_recipient_marks_a_notification_read() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (recipient_id, recipient) =
        create_test_user(&app_state, &format!("inbox_{}@test.com", unique())).await;
    let (_, other) = create_test_user(&app_state, &format!("nosy_{}@test.com", unique())).await;

    let id = notify(&schema, &other, recipient_id).await;
    let variables = || Variables::from_json(json!({ "id": id }));

    let response = execute_graphql(&schema, MARK_READ, Some(variables()), Some(other)).await;
    assert_eq!(
        first_error(&response),
        "Notification not found or not accessible."
    );

    let response = execute_graphql(&schema, NOTIFICATION, Some(variables()), None).await;
    let data = response.data.into_json().unwrap();
    assert!(data["notification"]["dateRead"].is_null());

    let response = execute_graphql(&schema, MARK_READ, Some(variables()), Some(recipient)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap()["markNotificationAsRead"]["success"],
        true
    );

    let response = execute_graphql(&schema, NOTIFICATION, Some(variables()), None).await;
    let data = response.data.into_json().unwrap();
    assert!(!data["notification"]["dateRead"].is_null());
}

#[tokio::test]
async fn test_notification_needs_an_existing_recipient() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("sender_{}@test.com", unique())).await;

    let query = r#"
        mutation Notify($input: CreateNotificationInput!) {
            createNotification(input: $input) { notification { id } }
        }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "recipientId": Uuid::new_v4().to_string(),
            "subject": "Hello",
            "body": "Anyone there?"
        }
    }));
    let response = execute_graphql(&schema, query, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Recipient not found.");
}
