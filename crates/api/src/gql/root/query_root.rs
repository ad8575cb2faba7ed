use async_graphql::MergedObject;

use crate::gql::domains::address::AddressQuery;
use crate::gql::domains::analytics::AnalyticsQuery;
use crate::gql::domains::basket::BasketQuery;
use crate::gql::domains::catalogue::CatalogueQuery;
use crate::gql::domains::communication::CommunicationQuery;
use crate::gql::domains::customer::CustomerQuery;
use crate::gql::domains::offer::OfferQuery;
use crate::gql::domains::order::OrderQuery;
use crate::gql::domains::partner::PartnerQuery;
use crate::gql::domains::payment::PaymentQuery;
use crate::gql::domains::shipping::ShippingQuery;
use crate::gql::domains::voucher::VoucherQuery;
use crate::gql::domains::wishlists::WishListQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    AddressQuery,
    AnalyticsQuery,
    BasketQuery,
    CatalogueQuery,
    CommunicationQuery,
    CustomerQuery,
    OfferQuery,
    OrderQuery,
    PartnerQuery,
    PaymentQuery,
    ShippingQuery,
    VoucherQuery,
    WishListQuery,
);
