use rocket::{serde::json::Json, Route, State};

use crate::config::RosterCache;
use crate::engine::{
    edition_status, editions_for_member, eligible_roster, fetch_edition_aggregate, VoterRef,
};
use crate::error::{Error, Result};
use crate::model::{
    api::edition::{EditionAggregateDesc, EditionOverviewDesc, EditionStatusDesc, RosterDesc},
    common::{EditionId, MemberId},
};
use crate::store::Store;

use super::cached_roster;

pub fn routes() -> Vec<Route> {
    routes![aggregate, roster, status, member_editions]
}

#[get("/editions/<edition_id>/aggregate?<voter_email>&<voter_id>")]
async fn aggregate(
    edition_id: EditionId,
    voter_email: Option<String>,
    voter_id: Option<MemberId>,
    store: Store,
) -> Result<Json<EditionAggregateDesc>> {
    let voter = match (voter_email, voter_id) {
        (Some(_), Some(_)) => {
            return Err(Error::BadRequest(
                "Identify the voter by email or by ID, not both".to_string(),
            ))
        }
        (Some(email), None) => Some(VoterRef::Email(email)),
        (None, Some(id)) => Some(VoterRef::Id(id)),
        (None, None) => None,
    };
    let aggregate = fetch_edition_aggregate(&*store, edition_id, voter.as_ref()).await?;
    Ok(Json(aggregate.into()))
}

#[get("/editions/<edition_id>/roster?<voter_id>")]
async fn roster(
    edition_id: EditionId,
    voter_id: MemberId,
    store: Store,
    rosters: &State<RosterCache>,
) -> Result<Json<RosterDesc>> {
    let edition = store
        .edition(edition_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Edition with ID '{edition_id}'")))?;
    let members = cached_roster(&*store, rosters, edition.group_id).await?;

    let eligible = eligible_roster(&edition, &members, voter_id);
    if eligible.is_empty() {
        return Err(Error::NothingToRank(edition_id));
    }
    Ok(Json(RosterDesc {
        edition_id,
        voter_id,
        members: eligible.into_iter().map(Into::into).collect(),
    }))
}

#[get("/editions/<edition_id>/status")]
async fn status(edition_id: EditionId, store: Store) -> Result<Json<EditionStatusDesc>> {
    let status = edition_status(&*store, edition_id).await?;
    Ok(Json(status.into()))
}

#[get("/members/<member_id>/editions")]
async fn member_editions(
    member_id: MemberId,
    store: Store,
) -> Result<Json<Vec<EditionOverviewDesc>>> {
    let overviews = editions_for_member(&*store, member_id).await?;
    Ok(Json(overviews.into_iter().map(Into::into).collect()))
}
