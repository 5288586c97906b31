use serde::{Deserialize, Serialize};

use crate::engine::RankingSession;
use crate::model::{
    api::member::MemberDesc,
    common::{EditionId, MemberId, QuestionId},
};

/// Move the member at `from_index` to `to_index` in one question's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub question_id: QuestionId,
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRankingDesc {
    pub question_id: QuestionId,
    pub members: Vec<MemberDesc>,
}

/// Current state of a voter's in-progress ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDesc {
    pub edition_id: EditionId,
    pub voter_id: MemberId,
    pub rankings: Vec<QuestionRankingDesc>,
}

impl From<&RankingSession> for SessionDesc {
    fn from(session: &RankingSession) -> Self {
        Self {
            edition_id: session.edition_id(),
            voter_id: session.voter_id(),
            rankings: session
                .iter()
                .map(|(question_id, members)| QuestionRankingDesc {
                    question_id,
                    members: members.iter().cloned().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}
