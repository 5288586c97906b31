//! The narrow data-access interface the vote engine talks to.
//!
//! Everything persistent (members, editions, questions, votes) lives behind
//! [`DataStore`]. The engine never reaches past it, so the backing store can be
//! MongoDB in production and an in-process table set in tests.

use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use thiserror::Error;

use crate::model::{
    common::{EditionId, GroupId, MemberId, VoteBatchId, VoteId},
    db::{
        edition::Edition,
        member::Member,
        question::Question,
        vote::{NewVote, Vote},
    },
};

#[cfg(test)]
mod memory;
mod mongo;

#[cfg(test)]
pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Shared handle to whichever store the server was configured with.
pub type SharedStore = Arc<dyn DataStore>;

/// Request guard handing out the managed [`SharedStore`].
#[derive(Clone)]
pub struct Store(SharedStore);

impl Deref for Store {
    type Target = dyn DataStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Store {
    type Error = StoreError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.rocket().state::<SharedStore>() {
            Some(store) => Outcome::Success(Store(store.clone())),
            None => {
                error!("No data store is managed");
                Outcome::Failure((
                    Status::InternalServerError,
                    StoreError::Unavailable(StoreOp::Connect),
                ))
            }
        }
    }
}

/// A failed round-trip to the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Store unavailable during {0}")]
    Unavailable(StoreOp),
}

/// The individual store operations, used for logging and fault injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetEdition,
    GetQuestionsForEdition,
    GetGroupMembers,
    GetVotesForEdition,
    GetVotesByVoter,
    InsertVoteBatch,
    ResolveMemberByEmail,
    GetMember,
    GetEditionsForGroups,
    DeleteVote,
    Connect,
}

impl Display for StoreOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GetEdition => "getEdition",
            Self::GetQuestionsForEdition => "getQuestionsForEdition",
            Self::GetGroupMembers => "getGroupMembers",
            Self::GetVotesForEdition => "getVotesForEdition",
            Self::GetVotesByVoter => "getVotesByVoter",
            Self::InsertVoteBatch => "insertVoteBatch",
            Self::ResolveMemberByEmail => "resolveMemberByEmail",
            Self::GetMember => "getMember",
            Self::GetEditionsForGroups => "getEditionsForGroups",
            Self::DeleteVote => "deleteVote",
            Self::Connect => "connect",
        };
        f.write_str(name)
    }
}

/// Operations the vote engine consumes from the hosted backend.
///
/// Every call may suspend; none of them hold locks across calls, so callers
/// must treat any read as possibly stale by the time they act on it.
#[rocket::async_trait]
pub trait DataStore: Send + Sync {
    /// Get an edition by ID, or `None` if it doesn't exist.
    async fn edition(&self, id: EditionId) -> Result<Option<Edition>, StoreError>;

    /// All questions linked to the given edition, in question ID order.
    async fn questions_for_edition(
        &self,
        edition_id: EditionId,
    ) -> Result<Vec<Question>, StoreError>;

    /// Members of the given group, optionally only the active ones.
    async fn group_members(
        &self,
        group_id: GroupId,
        active_only: bool,
    ) -> Result<Vec<Member>, StoreError>;

    /// Every vote row cast in the given edition.
    async fn votes_for_edition(&self, edition_id: EditionId) -> Result<Vec<Vote>, StoreError>;

    /// Every vote row the given voter cast in the given edition.
    async fn votes_by_voter(
        &self,
        edition_id: EditionId,
        voter_id: MemberId,
    ) -> Result<Vec<Vote>, StoreError>;

    /// Insert one submission's rows together, assigning IDs and a shared batch ID.
    ///
    /// Not guaranteed atomic: a failure part-way may leave some rows written.
    async fn insert_vote_batch(&self, rows: Vec<NewVote>) -> Result<VoteBatchId, StoreError>;

    /// Find a member by login email, regardless of group or activity.
    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError>;

    /// Find a member by ID, regardless of group or activity.
    async fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError>;

    /// Editions belonging to any of the given groups, newest (highest ID) first.
    async fn editions_for_groups(&self, group_ids: &[GroupId])
        -> Result<Vec<Edition>, StoreError>;

    /// Delete a single vote row. Returns whether a row was removed.
    async fn delete_vote(&self, edition_id: EditionId, vote_id: VoteId)
        -> Result<bool, StoreError>;
}

