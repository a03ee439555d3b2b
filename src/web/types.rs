use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::auth::{AdminList, Identity, StaticIdentityProvider};
use crate::domain::{
    Auction, AuctionId, AuctionStatus, Bid, Command, ExistingBids, Repository, UserId, MICRO_PURCHASE_THRESHOLD,
};
use crate::money::{AmountValue, RawAmount};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Mutex<Repository>>,
    /// Every command applied so far, locked only while `repository` is held.
    pub commands: Arc<Mutex<Vec<Command>>>,
    pub provider: Arc<StaticIdentityProvider>,
    pub admins: Arc<AdminList>,
    pub commands_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BidParams {
    #[serde(default)]
    pub amount: RawAmount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BidRequest {
    pub bid: BidParams,
}

impl BidRequest {
    /// Reads the bid amount from a JSON or form body. A body that cannot be
    /// read at all yields a missing amount, which validation rejects.
    pub fn amount_from_body(content_type: &str, body: &[u8]) -> RawAmount {
        if content_type.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            return url::form_urlencoded::parse(body)
                .find(|(key, _)| key == "bid[amount]" || key == "amount")
                .map(|(_, value)| RawAmount::Text(value.into_owned()))
                .unwrap_or_default();
        }
        serde_json::from_slice::<BidRequest>(body)
            .map(|request| request.bid.amount)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Identity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddAuctionRequest {
    pub id: AuctionId,
    #[serde(with = "time::serde::rfc3339", rename = "startsAt")]
    pub starts_at: OffsetDateTime,
    pub title: String,
    #[serde(with = "time::serde::rfc3339", rename = "endsAt")]
    pub ends_at: OffsetDateTime,
    #[serde(rename = "startPrice")]
    pub start_price: Option<AmountValue>,
}

impl AddAuctionRequest {
    pub fn to_auction(&self) -> Auction {
        Auction {
            auction_id: self.id,
            title: self.title.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            start_price: self.start_price.unwrap_or(MICRO_PURCHASE_THRESHOLD),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuctionItem {
    pub id: AuctionId,
    #[serde(with = "time::serde::rfc3339", rename = "startsAt")]
    pub starts_at: OffsetDateTime,
    pub title: String,
    #[serde(with = "time::serde::rfc3339", rename = "endsAt")]
    pub ends_at: OffsetDateTime,
    pub status: AuctionStatus,
    #[serde(rename = "startPrice")]
    pub start_price: AmountValue,
    #[serde(rename = "currentPrice")]
    pub current_price: Option<AmountValue>,
    #[serde(rename = "bidCount")]
    pub bid_count: usize,
}

impl AuctionItem {
    pub fn new(auction: &Auction, bids: &[Bid], now: OffsetDateTime) -> Self {
        let standing = ExistingBids::new(bids);
        AuctionItem {
            id: auction.auction_id,
            starts_at: auction.starts_at,
            title: auction.title.clone(),
            ends_at: auction.ends_at,
            status: auction.window().status_at(now),
            start_price: auction.start_price,
            current_price: standing.current_minimum(),
            bid_count: standing.len(),
        }
    }
}

/// A bid as shown to the public. `bidder_id` is only filled in when the
/// viewer placed the bid, or is an admin.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuctionBid {
    pub amount: AmountValue,
    #[serde(rename = "bidderId")]
    pub bidder_id: Option<UserId>,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl AuctionBid {
    pub fn veiled(bid: &Bid, viewer: Option<UserId>) -> Self {
        AuctionBid {
            amount: bid.amount,
            bidder_id: viewer.filter(|viewer| *viewer == bid.bidder_id),
            at: bid.at,
        }
    }

    pub fn unveiled(bid: &Bid) -> Self {
        AuctionBid {
            amount: bid.amount,
            bidder_id: Some(bid.bidder_id),
            at: bid.at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuctionDetail {
    #[serde(flatten)]
    pub item: AuctionItem,
    pub bids: Vec<AuctionBid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BidResponse {
    pub bid: Bid,
}
