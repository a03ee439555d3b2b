pub mod auctions;
pub mod bids;
pub mod commands;
pub mod core;
pub mod validator;

use log::{debug, info};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

pub use self::auctions::*;
pub use self::bids::*;
pub use self::commands::*;
pub use self::core::*;
pub use self::validator::*;

/// In-memory records. Bids are kept per auction in the order they were accepted.
/// Sessions are not part of the command log and do not survive a restart.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub users: HashMap<UserId, User>,
    pub auctions: HashMap<AuctionId, (Auction, Vec<Bid>)>,
    sessions: HashMap<String, UserId>,
}

impl Repository {
    pub fn new() -> Self {
        Repository::default()
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn auction(&self, auction_id: AuctionId) -> Option<&(Auction, Vec<Bid>)> {
        self.auctions.get(&auction_id)
    }

    /// Starts a session for `user_id` and returns its random token.
    pub fn issue_session(&mut self, user_id: UserId) -> Result<String, Errors> {
        if !self.users.contains_key(&user_id) {
            return Err(Errors::UnknownUser(user_id));
        }
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user_id);
        Ok(token)
    }

    pub fn end_session(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// The user an issued session token belongs to.
    pub fn session_user(&self, token: &str) -> Option<&User> {
        let user_id = self.sessions.get(token)?;
        self.user(*user_id)
    }
}

pub fn auctions(repository: &Repository) -> Vec<Auction> {
    let mut auctions: Vec<Auction> = repository
        .auctions
        .values()
        .map(|(auction, _)| auction.clone())
        .collect();
    auctions.sort_by_key(|auction| auction.auction_id);
    auctions
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("Auction error: {0}")]
    AuctionError(#[from] Errors),

    #[error("{0}")]
    BidRejected(#[from] BidRejection),
}

/// Applies `command` to `repository`. A bid is validated against the same
/// snapshot it is written into, so callers holding the repository lock get
/// read-validate-write as one step.
pub fn handle(command: Command, mut repository: Repository) -> Result<(CommandSuccess, Repository), HandleError> {
    match command {
        Command::AddUser { timestamp, user } => {
            if repository.users.contains_key(&user.id) {
                return Err(HandleError::from(Errors::UserAlreadyExists(user.id)));
            }
            repository.users.insert(user.id, user.clone());
            Ok((CommandSuccess::UserAdded { timestamp, user }, repository))
        }

        Command::AddAuction { timestamp, auction } => {
            let auction_id = auction.auction_id;
            if repository.auctions.contains_key(&auction_id) {
                return Err(HandleError::from(Errors::AuctionAlreadyExists(auction_id)));
            }
            validate_auction(&auction)?;
            repository.auctions.insert(auction_id, (auction.clone(), Vec::new()));
            info!("Auction {} added", auction_id);

            Ok((CommandSuccess::AuctionAdded { timestamp, auction }, repository))
        }

        Command::PlaceBid { timestamp, auction_id, bidder_id, amount } => {
            let bidder = repository
                .user(bidder_id)
                .ok_or(Errors::UnknownUser(bidder_id))?;
            let eligibility = BidderEligibility::from(bidder);

            let (auction, bids) = repository
                .auctions
                .get_mut(&auction_id)
                .ok_or(Errors::UnknownAuction(auction_id))?;

            let candidate = CandidateBid {
                raw_amount: amount,
                bidder_id,
            };
            let accepted = validate(
                &auction.state_at(timestamp),
                ExistingBids::new(bids),
                &candidate,
                eligibility,
            )
            .map_err(|rejection| {
                debug!(
                    "Bid of {} by user {} on auction {} rejected: {}",
                    candidate.raw_amount, bidder_id, auction_id, rejection
                );
                rejection
            })?;

            let bid = Bid {
                for_auction: auction_id,
                bidder_id: accepted.bidder_id,
                at: timestamp,
                amount: accepted.amount,
            };
            bids.push(bid.clone());
            info!("Bid of {} by user {} accepted on auction {}", bid.amount, bidder_id, auction_id);

            Ok((CommandSuccess::BidAccepted { timestamp, bid }, repository))
        }
    }
}
