use serde::{Deserialize, Serialize};

use crate::engine::{results::PODIUM_PLACES, MemberScore, QuestionResult};
use crate::model::api::{member::MemberDesc, question::QuestionDesc, vote::VoteDesc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberScoreDesc {
    pub member: MemberDesc,
    pub place: u32,
    pub podium: bool,
    pub average_rank: f64,
    pub vote_count: u32,
    pub total_points: u64,
}

impl From<MemberScore> for MemberScoreDesc {
    fn from(score: MemberScore) -> Self {
        Self {
            podium: score.place <= PODIUM_PLACES,
            member: score.member.into(),
            place: score.place,
            average_rank: score.average_rank,
            vote_count: score.vote_count,
            total_points: score.total_points,
        }
    }
}

/// Leaderboard for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResultDesc {
    pub question: QuestionDesc,
    pub total_votes: usize,
    pub ranked_members: Vec<MemberScoreDesc>,
    /// Roster members nobody has ranked for this question yet.
    pub unranked_members: Vec<MemberDesc>,
}

impl From<QuestionResult> for QuestionResultDesc {
    fn from(result: QuestionResult) -> Self {
        Self {
            question: result.question.into(),
            total_votes: result.total_votes,
            ranked_members: result.ranked_members.into_iter().map(Into::into).collect(),
            unranked_members: result.unranked_members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Already-fetched edition data to rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResultsRequest {
    pub questions: Vec<QuestionDesc>,
    pub members: Vec<MemberDesc>,
    pub votes: Vec<VoteDesc>,
}
