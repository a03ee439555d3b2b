#![allow(dead_code)]
use micropurchase::auth::{AdminList, StaticIdentityProvider};
use micropurchase::domain::{
    Auction, AuctionState, AuctionStatus, Bid, BidderEligibility, CandidateBid, Command, ExternalId, Repository,
    User, UserId, handle,
};
use micropurchase::money::{AmountValue, RawAmount};
use std::collections::HashMap;
use time::{macros::datetime, Duration, OffsetDateTime};
// See https://users.rust-lang.org/t/sharing-code-and-macros-in-tests-directory/3098/7

pub const VALID_API_KEY: &str = "valid-api-key";
pub const INVALID_API_KEY: &str = "invalid-api-key";
pub const ADMIN_API_KEY: &str = "admin-api-key";
pub const STRANGER_API_KEY: &str = "stranger-api-key";

// Sample data for tests
pub fn sample_auction_id() -> i64 {
    1
}

pub fn sample_title() -> String {
    "Build a status page".to_string()
}

pub fn sample_starts_at() -> OffsetDateTime {
    datetime!(2016-01-01 8:28 UTC)
}

pub fn sample_ends_at() -> OffsetDateTime {
    datetime!(2016-02-01 8:28 UTC)
}

pub fn sample_bid_time() -> OffsetDateTime {
    datetime!(2016-01-15 8:28 UTC)
}

pub fn bidder() -> User {
    User {
        id: 1,
        external_id: ExternalId::from("86790"),
        name: "Bidder".to_string(),
        sam_account: true,
    }
}

pub fn other_bidder() -> User {
    User {
        id: 2,
        external_id: ExternalId::from("12345"),
        name: "Other bidder".to_string(),
        sam_account: true,
    }
}

pub fn ineligible_bidder() -> User {
    User {
        id: 3,
        external_id: ExternalId::from("55555"),
        name: "Not in SAM".to_string(),
        sam_account: false,
    }
}

pub fn admin() -> User {
    User {
        id: 4,
        external_id: ExternalId::from("1"),
        name: "Admin".to_string(),
        sam_account: true,
    }
}

pub fn sample_auction() -> Auction {
    Auction {
        auction_id: sample_auction_id(),
        title: sample_title(),
        starts_at: sample_starts_at(),
        ends_at: sample_ends_at(),
        start_price: 3500,
    }
}

/// An auction whose window contains the current time.
pub fn running_auction(auction_id: i64) -> Auction {
    let now = OffsetDateTime::now_utc();
    Auction {
        auction_id,
        title: sample_title(),
        starts_at: now - Duration::days(1),
        ends_at: now + Duration::days(1),
        start_price: 3500,
    }
}

pub fn closed_auction(auction_id: i64) -> Auction {
    let now = OffsetDateTime::now_utc();
    Auction {
        auction_id,
        title: sample_title(),
        starts_at: now - Duration::days(3),
        ends_at: now - Duration::days(1),
        start_price: 3500,
    }
}

pub fn future_auction(auction_id: i64) -> Auction {
    let now = OffsetDateTime::now_utc();
    Auction {
        auction_id,
        title: sample_title(),
        starts_at: now + Duration::days(1),
        ends_at: now + Duration::days(3),
        start_price: 3500,
    }
}

pub fn state_with_status(status: AuctionStatus) -> AuctionState {
    AuctionState {
        status,
        current_window: sample_auction().window(),
        start_price: 3500,
    }
}

pub fn running_state() -> AuctionState {
    state_with_status(AuctionStatus::Running)
}

pub fn bid_of(amount: AmountValue, bidder_id: UserId) -> Bid {
    Bid {
        for_auction: sample_auction_id(),
        bidder_id,
        at: sample_bid_time(),
        amount,
    }
}

/// Bids of 100 and 120 from the other bidder.
pub fn existing_bids() -> Vec<Bid> {
    vec![bid_of(120, other_bidder().id), bid_of(100, other_bidder().id)]
}

pub fn candidate<A: Into<RawAmount>>(amount: A) -> CandidateBid {
    CandidateBid {
        raw_amount: amount.into(),
        bidder_id: bidder().id,
    }
}

pub fn eligible() -> BidderEligibility {
    BidderEligibility { has_valid_sam_account: true }
}

pub fn ineligible() -> BidderEligibility {
    BidderEligibility { has_valid_sam_account: false }
}

pub fn identity_provider() -> StaticIdentityProvider {
    let mut keys = HashMap::new();
    keys.insert(VALID_API_KEY.to_string(), bidder().external_id);
    keys.insert(ADMIN_API_KEY.to_string(), admin().external_id);
    keys.insert(STRANGER_API_KEY.to_string(), ExternalId::from("99999"));
    StaticIdentityProvider::new(keys)
}

pub fn admin_list() -> AdminList {
    AdminList::new(vec![admin().external_id])
}

pub fn add_user(user: User) -> Command {
    Command::AddUser {
        timestamp: sample_starts_at(),
        user,
    }
}

pub fn add_auction(auction: Auction) -> Command {
    Command::AddAuction {
        timestamp: sample_starts_at(),
        auction,
    }
}

pub fn place_bid<A: Into<RawAmount>>(auction_id: i64, bidder_id: UserId, amount: A, at: OffsetDateTime) -> Command {
    Command::PlaceBid {
        timestamp: at,
        auction_id,
        bidder_id,
        amount: amount.into(),
    }
}

pub fn apply_all(commands: Vec<Command>) -> Repository {
    commands.into_iter().fold(Repository::new(), |repository, command| {
        let (_, next) = handle(command, repository).unwrap();
        next
    })
}

/// Users plus the sample auction.
pub fn seeded_repository() -> Repository {
    apply_all(vec![
        add_user(bidder()),
        add_user(other_bidder()),
        add_user(ineligible_bidder()),
        add_user(admin()),
        add_auction(sample_auction()),
    ])
}
