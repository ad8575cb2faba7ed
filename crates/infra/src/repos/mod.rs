pub mod address;
pub mod analytics;
pub mod basket;
pub mod catalogue;
pub mod communication;
pub mod customer;
pub mod offer;
pub mod order;
pub mod partner;
pub mod payment;
pub mod shipping;
pub mod voucher;
pub mod wishlists;

pub use catalogue::{ProductStructure, StructureError};
pub use shipping::MethodKind;
pub use voucher::VoucherUsage;
pub use wishlists::{Viewer, Visibility};
