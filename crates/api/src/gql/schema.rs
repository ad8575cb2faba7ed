use std::env;

use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, Schema};

use super::loaders::{
    CountryLoader, OrderLoader, PartnerLoader, ProductClassLoader, ProductLoader,
    StockRecordLoader, UserLoader,
};
use super::{MutationRoot, QueryRoot};
use crate::state::AppState;

pub type ShopSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema and inject shared state (AppState) into the context.
pub fn build_schema(state: AppState) -> ShopSchema {
    let user_loader = DataLoader::new(UserLoader::new(state.db.clone()), tokio::spawn);
    let product_loader = DataLoader::new(ProductLoader::new(state.db.clone()), tokio::spawn);
    let product_class_loader =
        DataLoader::new(ProductClassLoader::new(state.db.clone()), tokio::spawn);
    let country_loader = DataLoader::new(CountryLoader::new(state.db.clone()), tokio::spawn);
    let partner_loader = DataLoader::new(PartnerLoader::new(state.db.clone()), tokio::spawn);
    let stock_record_loader =
        DataLoader::new(StockRecordLoader::new(state.db.clone()), tokio::spawn);
    let order_loader = DataLoader::new(OrderLoader::new(state.db.clone()), tokio::spawn);

    let introspection_enabled = env::var("GQL_INTROSPECTION")
        .map(|v| v == "true")
        .unwrap_or(false);

    let mut builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(state) // AppState is Clone; available in resolvers via ctx.data::<AppState>()
    .data(user_loader)
    .data(product_loader)
    .data(product_class_loader)
    .data(country_loader)
    .data(partner_loader)
    .data(stock_record_loader)
    .data(order_loader)
    .limit_depth(15)
    .limit_complexity(500);

    if !introspection_enabled {
        builder = builder.disable_introspection();
    }

    builder.finish()
}
