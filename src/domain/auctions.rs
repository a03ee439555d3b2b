use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use crate::money::AmountValue;
use super::core::{AuctionId, Errors};

/// Upper bound on a single bid unless an auction sets its own.
pub const MICRO_PURCHASE_THRESHOLD: AmountValue = 3500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Future,
    Running,
    Closed,
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionStatus::Future => write!(f, "Future"),
            AuctionStatus::Running => write!(f, "Running"),
            AuctionStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// The period during which bids are taken. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidWindow {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl BidWindow {
    pub fn status_at(&self, now: OffsetDateTime) -> AuctionStatus {
        if now < self.start {
            AuctionStatus::Future
        } else if now > self.end {
            AuctionStatus::Closed
        } else {
            AuctionStatus::Running
        }
    }
}

fn default_start_price() -> AmountValue {
    MICRO_PURCHASE_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    #[serde(rename = "id")]
    pub auction_id: AuctionId,
    pub title: String,
    #[serde(with = "time::serde::rfc3339", rename = "startsAt")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339", rename = "endsAt")]
    pub ends_at: OffsetDateTime,
    /// Highest acceptable bid.
    #[serde(rename = "startPrice", default = "default_start_price")]
    pub start_price: AmountValue,
}

impl Auction {
    pub fn window(&self) -> BidWindow {
        BidWindow {
            start: self.starts_at,
            end: self.ends_at,
        }
    }

    pub fn state_at(&self, now: OffsetDateTime) -> AuctionState {
        let window = self.window();
        AuctionState {
            status: window.status_at(now),
            current_window: window,
            start_price: self.start_price,
        }
    }
}

pub fn validate_auction(auction: &Auction) -> Result<(), Errors> {
    if auction.ends_at < auction.starts_at {
        return Err(Errors::InvalidAuctionWindow(auction.auction_id));
    }
    if auction.start_price <= 0 {
        return Err(Errors::InvalidStartPrice(auction.auction_id));
    }
    Ok(())
}

/// Snapshot of an auction at the instant a bid is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionState {
    pub status: AuctionStatus,
    pub current_window: BidWindow,
    pub start_price: AmountValue,
}
