pub mod resolvers;
pub mod types;

pub use resolvers::{VoucherMutation, VoucherQuery};
