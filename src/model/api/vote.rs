use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{Rankings, VoteReceipt};
use crate::model::{
    common::{EditionId, MemberId, QuestionId, VoteBatchId, VoteId},
    db::vote::{Vote, VoteCore},
};

/// A stored vote row. Legacy rows are reported under their effective voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDesc {
    pub id: VoteId,
    pub edition_id: EditionId,
    pub question_id: QuestionId,
    pub voter_id: MemberId,
    pub ranked_member_id: MemberId,
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<VoteBatchId>,
    #[serde(default = "Utc::now")]
    pub cast_at: DateTime<Utc>,
}

impl From<Vote> for VoteDesc {
    fn from(vote: Vote) -> Self {
        let voter_id = vote.effective_voter();
        Self {
            id: vote.id,
            edition_id: vote.edition_id,
            question_id: vote.question_id,
            voter_id,
            ranked_member_id: vote.ranked_member_id,
            rank: vote.rank,
            batch_id: vote.batch_id,
            cast_at: vote.cast_at,
        }
    }
}

impl From<VoteDesc> for Vote {
    fn from(desc: VoteDesc) -> Self {
        Self {
            id: desc.id,
            vote: VoteCore {
                edition_id: desc.edition_id,
                question_id: desc.question_id,
                voter_id: desc.voter_id,
                legacy_voter_id: None,
                ranked_member_id: desc.ranked_member_id,
                rank: desc.rank,
                batch_id: desc.batch_id,
                cast_at: desc.cast_at,
            },
        }
    }
}

/// A full ballot: for every question, the eligible members best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub voter_id: MemberId,
    pub rankings: Rankings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceiptDesc {
    pub batch_id: VoteBatchId,
    pub edition_id: EditionId,
    pub voter_id: MemberId,
    pub questions: usize,
    pub rows: usize,
}

impl From<VoteReceipt> for VoteReceiptDesc {
    fn from(receipt: VoteReceipt) -> Self {
        Self {
            batch_id: receipt.batch_id,
            edition_id: receipt.edition_id,
            voter_id: receipt.voter_id,
            questions: receipt.questions,
            rows: receipt.rows,
        }
    }
}
