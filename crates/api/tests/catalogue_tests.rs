#![recursion_limit = "256"]

mod common;

use api::auth::Claims;
use api::gql::ShopSchema;
use async_graphql::Variables;
use common::*;
use serde_json::json;
use uuid::Uuid;

const CREATE_PRODUCT: &str = r#"
    mutation Create($input: CreateProductInput!) {
        createProduct(input: $input) { product { id structure slug } }
    }
"#;

const UPDATE_STRUCTURE: &str = r#"
    mutation Update($id: ID!, $structure: ProductStructure!) {
        updateProduct(input: { id: $id, structure: $structure }) { product { id structure } }
    }
"#;

const DELETE_PRODUCT: &str = r#"
    mutation Delete($id: ID!) { deleteProduct(id: $id) { success } }
"#;

async fn create_product(
    schema: &ShopSchema,
    claims: &Claims,
    class_id: Uuid,
    title: &str,
    structure: &str,
    parent_id: Option<&str>,
) -> String {
    let variables = Variables::from_json(json!({
        "input": {
            "title": title,
            "productClassId": class_id.to_string(),
            "structure": structure,
            "parentId": parent_id
        }
    }));
    let response = execute_graphql(schema, CREATE_PRODUCT, Some(variables), Some(claims.clone())).await;
    assert!(
        response.errors.is_empty(),
        "createProduct should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let product = &data["createProduct"]["product"];
    assert_eq!(product["structure"], structure);
    product["id"].as_str().unwrap().to_string()
}

async fn set_structure(
    schema: &ShopSchema,
    claims: &Claims,
    id: &str,
    structure: &str,
) -> async_graphql::Response {
    let variables = Variables::from_json(json!({ "id": id, "structure": structure }));
    execute_graphql(schema, UPDATE_STRUCTURE, Some(variables), Some(claims.clone())).await
}

async fn delete_product(schema: &ShopSchema, claims: &Claims, id: &str) -> async_graphql::Response {
    let variables = Variables::from_json(json!({ "id": id }));
    execute_graphql(schema, DELETE_PRODUCT, Some(variables), Some(claims.clone())).await
}

async fn variant_count(app_state: &api::state::AppState, parent_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE parent_id = $1")
        .bind(Uuid::parse_str(parent_id).unwrap())
        .fetch_one(&app_state.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_unknown_product_class_is_rejected() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("cat_{}@test.com", unique())).await;

    let variables = Variables::from_json(json!({
        "input": {
            "title": "Orphan",
            "productClassId": Uuid::new_v4().to_string(),
            "structure": "STANDALONE"
        }
    }));
    let response = execute_graphql(&schema, CREATE_PRODUCT, Some(variables), Some(claims)).await;

    assert_eq!(first_error(&response), "Product class not found.");
}

#[tokio::test]
async fn test_structure_changes_between_variant_and_top_level_are_refused() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("cat_{}@test.com", unique())).await;
    let class_id = create_test_product_class(&app_state, "Shirts").await;

    let parent = create_product(&schema, &claims, class_id, "Shirt", "PARENT", None).await;
    let child = create_product(&schema, &claims, class_id, "Shirt (M)", "CHILD", Some(&parent)).await;
    let single = create_product(&schema, &claims, class_id, "Scarf", "STANDALONE", None).await;

    let response = set_structure(&schema, &claims, &child, "STANDALONE").await;
    assert_eq!(
        first_error(&response),
        "Cannot change a variant to a standalone or parent product."
    );

    let response = set_structure(&schema, &claims, &single, "CHILD").await;
    assert_eq!(
        first_error(&response),
        "Cannot change a standalone or parent product to a variant."
    );

    let response = set_structure(&schema, &claims, &single, "PARENT").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateProduct"]["product"]["structure"], "PARENT");
}

#[tokio::test]
async fn test_parent_with_variants_cannot_be_deleted_or_demoted() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("cat_{}@test.com", unique())).await;
    let class_id = create_test_product_class(&app_state, "Mugs").await;

    let parent = create_product(&schema, &claims, class_id, "Mug", "PARENT", None).await;
    let child = create_product(&schema, &claims, class_id, "Mug (blue)", "CHILD", Some(&parent)).await;

    let response = delete_product(&schema, &claims, &parent).await;
    assert_eq!(
        first_error(&response),
        "Cannot delete a parent product with variants. Delete the variants first."
    );

    // Demoting first must not open a path to deleting the variants with it.
    let response = set_structure(&schema, &claims, &parent, "STANDALONE").await;
    assert_eq!(
        first_error(&response),
        "Cannot change a parent product with variants to standalone. Delete the variants first."
    );
    let response = delete_product(&schema, &claims, &parent).await;
    assert!(!response.errors.is_empty());
    assert_eq!(variant_count(&app_state, &parent).await, 1);

    let response = delete_product(&schema, &claims, &child).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = set_structure(&schema, &claims, &parent, "STANDALONE").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let response = delete_product(&schema, &claims, &parent).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap()["deleteProduct"]["success"], true);
}

#[tokio::test]
async fn test_delete_guard_does_not_trust_the_stored_structure() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("cat_{}@test.com", unique())).await;
    let class_id = create_test_product_class(&app_state, "Lamps").await;

    let parent = create_product(&schema, &claims, class_id, "Lamp", "PARENT", None).await;
    create_product(&schema, &claims, class_id, "Lamp (brass)", "CHILD", Some(&parent)).await;

    sqlx::query("UPDATE products SET structure = 'standalone' WHERE id = $1")
        .bind(Uuid::parse_str(&parent).unwrap())
        .execute(&app_state.db)
        .await
        .unwrap();

    let response = delete_product(&schema, &claims, &parent).await;
    assert_eq!(
        first_error(&response),
        "Cannot delete a parent product with variants. Delete the variants first."
    );
    assert_eq!(variant_count(&app_state, &parent).await, 1);
}

#[tokio::test]
async fn test_demoting_and_adding_a_variant_race_cleanly() {
    let app_state = setup_test_db().await;
    let schema = test_schema(&app_state);
    let (_, claims) = create_test_user(&app_state, &format!("cat_{}@test.com", unique())).await;
    let class_id = create_test_product_class(&app_state, "Kettles").await;

    for round in 0..10 {
        let parent = create_product(&schema, &claims, class_id, "Kettle", "PARENT", None).await;

        let demote = {
            let (schema, claims, parent) = (schema.clone(), claims.clone(), parent.clone());
            tokio::spawn(async move {
                let variables = Variables::from_json(json!({ "id": parent, "structure": "STANDALONE" }));
                execute_graphql(&schema, UPDATE_STRUCTURE, Some(variables), Some(claims)).await
            })
        };
        let attach = {
            let (schema, claims, parent) = (schema.clone(), claims.clone(), parent.clone());
            tokio::spawn(async move {
                let variables = Variables::from_json(json!({
                    "input": {
                        "title": format!("Kettle (steel {round})"),
                        "productClassId": class_id.to_string(),
                        "structure": "CHILD",
                        "parentId": parent
                    }
                }));
                execute_graphql(&schema, CREATE_PRODUCT, Some(variables), Some(claims)).await
            })
        };

        let demoted = demote.await.unwrap().errors.is_empty();
        let attached = attach.await.unwrap().errors.is_empty();
        assert!(demoted != attached, "exactly one of demote/attach must win");

        let structure: String = sqlx::query_scalar("SELECT structure FROM products WHERE id = $1")
            .bind(Uuid::parse_str(&parent).unwrap())
            .fetch_one(&app_state.db)
            .await
            .unwrap();
        let variants = variant_count(&app_state, &parent).await;
        if structure == "standalone" {
            assert_eq!(variants, 0);
        } else {
            assert_eq!(variants, 1);
        }
    }
}
