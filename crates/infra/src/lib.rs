pub mod db;
pub mod keys;
pub mod models;
pub mod pagination;
pub mod repos;
