use serde::{Deserialize, Serialize};

use crate::engine::{EditionAggregate, EditionOverview, EditionStatus};
use crate::model::{
    api::{member::MemberDesc, question::QuestionDesc, vote::VoteDesc},
    common::{EditionId, GroupId, MemberId},
    db::edition::Edition,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionDesc {
    pub id: EditionId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub group_id: GroupId,
    pub no_self_vote: bool,
}

impl From<Edition> for EditionDesc {
    fn from(edition: Edition) -> Self {
        Self {
            id: edition.id,
            title: edition.title,
            description: edition.description,
            group_id: edition.group_id,
            no_self_vote: edition.no_self_vote,
        }
    }
}

/// Everything a voting or results page needs about one edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionAggregateDesc {
    pub edition: EditionDesc,
    pub members: Vec<MemberDesc>,
    pub votes: Vec<VoteDesc>,
    pub questions: Vec<QuestionDesc>,
    pub user_has_voted: bool,
}

impl From<EditionAggregate> for EditionAggregateDesc {
    fn from(aggregate: EditionAggregate) -> Self {
        Self {
            edition: aggregate.edition.into(),
            members: aggregate.members.into_iter().map(Into::into).collect(),
            votes: aggregate.votes.into_iter().map(Into::into).collect(),
            questions: aggregate.questions.into_iter().map(Into::into).collect(),
            user_has_voted: aggregate.user_has_voted,
        }
    }
}

/// The members one voter is asked to rank, in baseline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDesc {
    pub edition_id: EditionId,
    pub voter_id: MemberId,
    pub members: Vec<MemberDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionStatusDesc {
    pub total_members: usize,
    pub total_voters: usize,
    pub progress: f64,
    pub is_complete: bool,
}

impl From<EditionStatus> for EditionStatusDesc {
    fn from(status: EditionStatus) -> Self {
        Self {
            total_members: status.total_members,
            total_voters: status.total_voters,
            progress: status.progress,
            is_complete: status.is_complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionOverviewDesc {
    pub edition: EditionDesc,
    pub status: EditionStatusDesc,
    pub user_has_voted: bool,
    pub can_view_results: bool,
}

impl From<EditionOverview> for EditionOverviewDesc {
    fn from(overview: EditionOverview) -> Self {
        Self {
            edition: overview.edition.into(),
            status: overview.status.into(),
            user_has_voted: overview.user_has_voted,
            can_view_results: overview.can_view_results,
        }
    }
}
