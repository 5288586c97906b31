//! The vote-aggregation and ranking engine.
//!
//! Reads and writes go through a [`DataStore`](crate::store::DataStore); nothing
//! in here caches or holds state between calls except an explicit
//! [`RankingSession`].

pub mod aggregate;
pub mod eligibility;
pub mod results;
pub mod session;
pub mod status;
pub mod submission;

pub use aggregate::{fetch_edition_aggregate, EditionAggregate, VoterRef};
pub use eligibility::eligible_roster;
pub use results::{
    check_ranks, compute_results, fetch_edition_results, EditionResults, MemberScore,
    QuestionResult,
};
pub use session::RankingSession;
pub use status::{edition_status, editions_for_member, EditionOverview, EditionStatus};
pub use submission::{submit_vote, Rankings, VoteReceipt};
