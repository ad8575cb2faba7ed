use async_graphql::{SimpleObject, ID};
use uuid::Uuid;

use crate::gql::error::ResultExt;

/// Parse a GraphQL `ID` into a row id, naming the entity in the error:
/// `parse_id(&id, "product")` fails with "Invalid product ID: …".
pub fn parse_id(id: &ID, entity: &str) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).gql_err(&format!("Invalid {entity} ID"))
}

/// Payload of mutations that only report whether they took effect.
#[derive(SimpleObject, Clone, Copy, Debug)]
pub struct SuccessPayload {
    pub success: bool,
}

impl From<bool> for SuccessPayload {
    fn from(success: bool) -> Self {
        Self { success }
    }
}
