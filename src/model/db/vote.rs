use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{EditionId, MemberId, QuestionId, VoteBatchId, VoteId};

/// Core vote data, as stored in the database.
///
/// One row records where one voter placed one member for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    /// Foreign Key edition ID.
    pub edition_id: EditionId,
    /// Foreign Key question ID.
    pub question_id: QuestionId,
    /// The member who cast the vote.
    pub voter_id: MemberId,
    /// Rows written before `voter_id` existed recorded the voter here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_voter_id: Option<MemberId>,
    /// The member being ranked.
    pub ranked_member_id: MemberId,
    /// 1-based position in the voter's ranking; 1 is best.
    pub rank: u32,
    /// The submission this row belongs to. Absent on legacy rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<VoteBatchId>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}

impl VoteCore {
    /// Was this vote cast by the given member?
    pub fn is_cast_by(&self, member: MemberId) -> bool {
        self.voter_id == member || self.legacy_voter_id == Some(member)
    }

    /// The member who cast this vote, preferring the field older rows carry.
    pub fn effective_voter(&self) -> MemberId {
        self.legacy_voter_id.unwrap_or(self.voter_id)
    }
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: VoteId,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    /// Build a vote row with an arbitrary ID.
    pub fn vote(
        id: VoteId,
        question_id: QuestionId,
        voter_id: MemberId,
        ranked_member_id: MemberId,
        rank: u32,
    ) -> Vote {
        Vote {
            id,
            vote: VoteCore {
                edition_id: 1,
                question_id,
                voter_id,
                legacy_voter_id: None,
                ranked_member_id,
                rank,
                batch_id: None,
                cast_at: Utc::now(),
            },
        }
    }
}
