use async_graphql::MergedObject;

use crate::gql::domains::address::AddressMutation;
use crate::gql::domains::analytics::AnalyticsMutation;
use crate::gql::domains::basket::BasketMutation;
use crate::gql::domains::catalogue::CatalogueMutation;
use crate::gql::domains::communication::CommunicationMutation;
use crate::gql::domains::customer::CustomerMutation;
use crate::gql::domains::offer::OfferMutation;
use crate::gql::domains::order::OrderMutation;
use crate::gql::domains::partner::PartnerMutation;
use crate::gql::domains::payment::PaymentMutation;
use crate::gql::domains::shipping::ShippingMutation;
use crate::gql::domains::voucher::VoucherMutation;
use crate::gql::domains::wishlists::WishListMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    AddressMutation,
    AnalyticsMutation,
    BasketMutation,
    CatalogueMutation,
    CommunicationMutation,
    CustomerMutation,
    OfferMutation,
    OrderMutation,
    PartnerMutation,
    PaymentMutation,
    ShippingMutation,
    VoucherMutation,
    WishListMutation,
);
