use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type UserId = i64;
pub type AuctionId = i64;

/// Stable id issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub String);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        ExternalId(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "externalId")]
    pub external_id: ExternalId,
    pub name: String,
    /// Whether the bidder holds a valid SAM.gov registration.
    #[serde(rename = "samAccount", default)]
    pub sam_account: bool,
}

/// Authentication and authorization failures. Only raised where authentication
/// is mandatory; a missing identity on an optional path is not an error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Unauthorized")]
    MustBeAdmin,
}

/// Why a bid was turned down, listed in evaluation order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidRejection {
    #[error("Auction not available")]
    AuctionNotAvailable,

    #[error("You must have a valid SAM.gov account to place a bid")]
    BidderIneligible,

    #[error("Bid amount out of range")]
    BidOutOfRange,

    #[error("Bids must be in increments of one dollar")]
    BidNotIntegral,

    #[error("Bids cannot be greater than the current max bid")]
    BidNotLowest,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Errors {
    #[error("Unknown auction: {0}")]
    UnknownAuction(AuctionId),

    #[error("Auction already exists: {0}")]
    AuctionAlreadyExists(AuctionId),

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("User already exists: {0}")]
    UserAlreadyExists(UserId),

    #[error("Auction window ends before it starts: {0}")]
    InvalidAuctionWindow(AuctionId),

    #[error("Auction start price must be positive: {0}")]
    InvalidStartPrice(AuctionId),
}
