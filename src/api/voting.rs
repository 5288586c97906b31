use rocket::{serde::json::Json, Route, State};

use crate::config::{RosterCache, SessionCache};
use crate::engine::{eligible_roster, submit_vote, RankingSession};
use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{
    api::{
        session::{ReorderRequest, SessionDesc},
        vote::{SubmitVoteRequest, VoteReceiptDesc},
    },
    common::{EditionId, MemberId},
};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![
        cast_votes,
        start_session,
        get_session,
        reorder,
        submit_session,
        discard_session,
    ]
}

#[post("/editions/<edition_id>/votes", data = "<ballot>", format = "json")]
async fn cast_votes(
    edition_id: EditionId,
    ballot: Json<SubmitVoteRequest>,
    store: Store,
    request_id: &RequestId,
) -> Result<Json<VoteReceiptDesc>> {
    debug!(
        "req{request_id}: ballot from member {} for edition {edition_id}",
        ballot.voter_id
    );
    let receipt = submit_vote(&*store, edition_id, ballot.voter_id, &ballot.rankings).await?;
    Ok(Json(receipt.into()))
}

fn no_session(edition_id: EditionId, voter_id: MemberId) -> Error {
    Error::not_found(format!(
        "Ranking session of member {voter_id} in edition {edition_id}"
    ))
}

/// Start (or restart) a voter's ranking session, every question seeded with the
/// eligible roster in baseline order.
#[post("/editions/<edition_id>/sessions/<voter_id>")]
async fn start_session(
    edition_id: EditionId,
    voter_id: MemberId,
    store: Store,
    sessions: &State<SessionCache>,
    rosters: &State<RosterCache>,
) -> Result<Json<SessionDesc>> {
    let voter = store
        .member(voter_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Member with ID '{voter_id}'")))?;
    let edition = store
        .edition(edition_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Edition with ID '{edition_id}'")))?;
    if !store.votes_by_voter(edition_id, voter.id).await?.is_empty() {
        return Err(Error::AlreadyVoted {
            edition: edition_id,
            voter: voter.id,
        });
    }

    // Sessions always start from a fresh roster, which then refreshes the cache.
    let questions = store.questions_for_edition(edition_id).await?;
    let members = store.group_members(edition.group_id, true).await?;
    rosters.lock().await.insert(edition.group_id, members.clone());

    let roster = eligible_roster(&edition, &members, voter.id);
    if roster.is_empty() || questions.is_empty() {
        return Err(Error::NothingToRank(edition_id));
    }
    let session = RankingSession::new(edition_id, voter.id, &questions, &roster);
    let desc = SessionDesc::from(&session);
    let mut sessions = sessions.lock().await;
    let abandoned = sessions.purge_expired();
    if abandoned > 0 {
        debug!("Dropped {abandoned} abandoned ranking sessions");
    }
    if sessions.insert((edition_id, voter.id), session).is_some() {
        debug!("Replaced ranking session of member {voter_id} in edition {edition_id}");
    }
    Ok(Json(desc))
}

#[get("/editions/<edition_id>/sessions/<voter_id>")]
async fn get_session(
    edition_id: EditionId,
    voter_id: MemberId,
    sessions: &State<SessionCache>,
) -> Result<Json<SessionDesc>> {
    let sessions = sessions.lock().await;
    let session = sessions
        .get(&(edition_id, voter_id))
        .ok_or_else(|| no_session(edition_id, voter_id))?;
    Ok(Json(session.into()))
}

#[post(
    "/editions/<edition_id>/sessions/<voter_id>/reorder",
    data = "<request>",
    format = "json"
)]
async fn reorder(
    edition_id: EditionId,
    voter_id: MemberId,
    request: Json<ReorderRequest>,
    sessions: &State<SessionCache>,
) -> Result<Json<SessionDesc>> {
    let mut sessions = sessions.lock().await;
    let session = sessions
        .get_mut(&(edition_id, voter_id))
        .ok_or_else(|| no_session(edition_id, voter_id))?;
    session.reorder(request.question_id, request.from_index, request.to_index)?;
    Ok(Json(SessionDesc::from(&*session)))
}

/// Submit the session's current rankings. The session is dropped once the
/// submission is recorded, or once it can never succeed.
#[post("/editions/<edition_id>/sessions/<voter_id>/submit")]
async fn submit_session(
    edition_id: EditionId,
    voter_id: MemberId,
    store: Store,
    sessions: &State<SessionCache>,
    request_id: &RequestId,
) -> Result<Json<VoteReceiptDesc>> {
    let rankings = sessions
        .lock()
        .await
        .get(&(edition_id, voter_id))
        .map(RankingSession::rankings)
        .ok_or_else(|| no_session(edition_id, voter_id))?;

    debug!("req{request_id}: submitting session of member {voter_id} for edition {edition_id}");
    let result = submit_vote(&*store, edition_id, voter_id, &rankings).await;
    if matches!(result, Ok(_) | Err(Error::AlreadyVoted { .. })) {
        sessions.lock().await.remove(&(edition_id, voter_id));
    }
    Ok(Json(result?.into()))
}

#[delete("/editions/<edition_id>/sessions/<voter_id>")]
async fn discard_session(
    edition_id: EditionId,
    voter_id: MemberId,
    sessions: &State<SessionCache>,
) -> Result<()> {
    sessions
        .lock()
        .await
        .remove(&(edition_id, voter_id))
        .map(|_| ())
        .ok_or_else(|| no_session(edition_id, voter_id))
}
