pub mod helpers;
pub mod pagination;

pub use helpers::{parse_id, SuccessPayload};
pub use pagination::paginate;
