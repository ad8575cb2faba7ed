// Each domain contains: mod.rs, resolvers.rs, types.rs

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
