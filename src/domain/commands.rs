use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::money::RawAmount;
use super::auctions::Auction;
use super::bids::Bid;
use super::core::{AuctionId, User, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Command {
    #[serde(rename = "AddUser")]
    AddUser {
        #[serde(with = "time::serde::rfc3339", rename = "at")]
        timestamp: OffsetDateTime,
        user: User,
    },

    #[serde(rename = "AddAuction")]
    AddAuction {
        #[serde(with = "time::serde::rfc3339", rename = "at")]
        timestamp: OffsetDateTime,
        auction: Auction,
    },

    /// The amount is kept as submitted so that replaying the log re-runs the
    /// same validation.
    #[serde(rename = "PlaceBid")]
    PlaceBid {
        #[serde(with = "time::serde::rfc3339", rename = "at")]
        timestamp: OffsetDateTime,
        #[serde(rename = "auctionId")]
        auction_id: AuctionId,
        #[serde(rename = "bidderId")]
        bidder_id: UserId,
        amount: RawAmount,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum CommandSuccess {
    #[serde(rename = "UserAdded")]
    UserAdded {
        #[serde(with = "time::serde::rfc3339", rename = "at")]
        timestamp: OffsetDateTime,
        user: User,
    },

    #[serde(rename = "AuctionAdded")]
    AuctionAdded {
        #[serde(with = "time::serde::rfc3339", rename = "at")]
        timestamp: OffsetDateTime,
        auction: Auction,
    },

    #[serde(rename = "BidAccepted")]
    BidAccepted {
        #[serde(with = "time::serde::rfc3339", rename = "at")]
        timestamp: OffsetDateTime,
        bid: Bid,
    },
}
