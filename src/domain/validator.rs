use serde::{Deserialize, Serialize};
use crate::money::{AmountValue, BidNumber, RawAmount};
use super::auctions::{AuctionState, AuctionStatus};
use super::bids::ExistingBids;
use super::core::{BidRejection, User, UserId};

/// Whether the bidder may place bids at all, independent of what they bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidderEligibility {
    pub has_valid_sam_account: bool,
}

impl From<&User> for BidderEligibility {
    fn from(user: &User) -> Self {
        BidderEligibility {
            has_valid_sam_account: user.sam_account,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidateBid {
    pub raw_amount: RawAmount,
    pub bidder_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedBid {
    pub amount: AmountValue,
    #[serde(rename = "bidderId")]
    pub bidder_id: UserId,
}

/// Decides whether `candidate` may be placed on a descending-price auction.
///
/// Rules are checked in a fixed order and the first one that fails is the
/// reason reported:
///
/// 1. the auction is running
/// 2. the bidder is eligible
/// 3. the amount is a number in `(0, start_price]`
/// 4. the amount is a whole number of dollars
/// 5. the amount undercuts every existing bid
pub fn validate(
    auction: &AuctionState,
    existing_bids: ExistingBids<'_>,
    candidate: &CandidateBid,
    eligibility: BidderEligibility,
) -> Result<AcceptedBid, BidRejection> {
    check_available(auction)?;
    check_eligible(eligibility)?;
    let number = check_in_range(&candidate.raw_amount, auction.start_price)?;
    let amount = check_integral(number)?;
    check_lowest(amount, existing_bids)?;

    Ok(AcceptedBid {
        amount,
        bidder_id: candidate.bidder_id,
    })
}

fn check_available(auction: &AuctionState) -> Result<(), BidRejection> {
    match auction.status {
        AuctionStatus::Running => Ok(()),
        AuctionStatus::Future | AuctionStatus::Closed => Err(BidRejection::AuctionNotAvailable),
    }
}

fn check_eligible(eligibility: BidderEligibility) -> Result<(), BidRejection> {
    if eligibility.has_valid_sam_account {
        Ok(())
    } else {
        Err(BidRejection::BidderIneligible)
    }
}

fn check_in_range(raw: &RawAmount, upper: AmountValue) -> Result<BidNumber, BidRejection> {
    let number = raw.to_number().map_err(|_| BidRejection::BidOutOfRange)?;
    if !number.is_positive() || number.exceeds(upper) {
        return Err(BidRejection::BidOutOfRange);
    }
    Ok(number)
}

fn check_integral(number: BidNumber) -> Result<AmountValue, BidRejection> {
    number.whole_dollars().ok_or(BidRejection::BidNotIntegral)
}

fn check_lowest(amount: AmountValue, existing_bids: ExistingBids<'_>) -> Result<(), BidRejection> {
    match existing_bids.current_minimum() {
        Some(minimum) if amount >= minimum => Err(BidRejection::BidNotLowest),
        _ => Ok(()),
    }
}
