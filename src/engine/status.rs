use std::collections::BTreeSet;

use rocket::futures::future::try_join_all;
use rocket::tokio::join;

use crate::error::{Error, Result};
use crate::model::{
    common::{EditionId, MemberId},
    db::{edition::Edition, member::Member, vote::Vote},
};
use crate::store::DataStore;

/// Voting progress of an edition.
#[derive(Debug, Clone, PartialEq)]
pub struct EditionStatus {
    /// Size of the active roster.
    pub total_members: usize,
    /// Distinct members who have cast at least one vote.
    pub total_voters: usize,
    /// Percentage of the roster that has voted.
    pub progress: f64,
    pub is_complete: bool,
}

impl EditionStatus {
    pub fn from_roster(members: &[Member], votes: &[Vote]) -> Self {
        let voters = votes.iter().map(|v| v.effective_voter()).collect::<BTreeSet<_>>();
        let total_members = members.len();
        let total_voters = voters.len();
        let progress = if total_members > 0 {
            total_voters as f64 / total_members as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_members,
            total_voters,
            progress,
            is_complete: total_members > 0 && total_voters >= total_members,
        }
    }
}

/// An edition as seen by one member.
#[derive(Debug, Clone, PartialEq)]
pub struct EditionOverview {
    pub edition: Edition,
    pub status: EditionStatus,
    pub user_has_voted: bool,
    /// Results open up once everyone voted, or once this member did.
    pub can_view_results: bool,
}

pub async fn edition_status(store: &dyn DataStore, edition_id: EditionId) -> Result<EditionStatus> {
    let edition = store
        .edition(edition_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Edition with ID '{edition_id}'")))?;
    let (members, votes) = join!(
        store.group_members(edition.group_id, true),
        store.votes_for_edition(edition_id)
    );
    Ok(EditionStatus::from_roster(&members?, &votes?))
}

/// Every edition of every group the member belongs to, newest first.
pub async fn editions_for_member(
    store: &dyn DataStore,
    member_id: MemberId,
) -> Result<Vec<EditionOverview>> {
    let member = store
        .member(member_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Member with ID '{member_id}'")))?;
    if member.group_ids.is_empty() {
        return Ok(Vec::new());
    }

    let group_ids = member.group_ids.iter().copied().collect::<Vec<_>>();
    let editions = store.editions_for_groups(&group_ids).await?;
    try_join_all(
        editions
            .into_iter()
            .map(|edition| overview(store, edition, member_id)),
    )
    .await
}

async fn overview(
    store: &dyn DataStore,
    edition: Edition,
    member_id: MemberId,
) -> Result<EditionOverview> {
    let (members, votes) = join!(
        store.group_members(edition.group_id, true),
        store.votes_for_edition(edition.id)
    );
    let votes = votes?;
    let status = EditionStatus::from_roster(&members?, &votes);
    let user_has_voted = votes.iter().any(|v| v.is_cast_by(member_id));
    Ok(EditionOverview {
        can_view_results: status.is_complete || user_has_voted,
        edition,
        status,
        user_has_voted,
    })
}
