use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::money::AmountValue;
use super::core::{AuctionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(rename = "auctionId")]
    pub for_auction: AuctionId,
    #[serde(rename = "bidderId")]
    pub bidder_id: UserId,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub amount: AmountValue,
}

/// The bids already standing on an auction, in the order they were placed.
#[derive(Debug, Clone, Copy)]
pub struct ExistingBids<'a> {
    bids: &'a [Bid],
}

impl<'a> ExistingBids<'a> {
    pub fn new(bids: &'a [Bid]) -> Self {
        ExistingBids { bids }
    }

    pub fn none() -> ExistingBids<'static> {
        ExistingBids { bids: &[] }
    }

    /// The best standing bid. Lower is better.
    pub fn current_minimum(&self) -> Option<AmountValue> {
        self.bids.iter().map(|bid| bid.amount).min()
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}
