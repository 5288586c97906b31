use rocket::{serde::json::Json, Route};

use crate::engine::{check_ranks, compute_results, fetch_edition_results, EditionResults};
use crate::error::{Error, Result};
use crate::model::{
    api::{
        caller::Caller,
        results::{ComputeResultsRequest, QuestionResultDesc},
    },
    common::EditionId,
    db::{member::Member, question::Question, vote::Vote},
};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![edition_results, compute]
}

/// Leaderboards of every question in an edition, for members of its group and admins.
#[get("/editions/<edition_id>/results")]
async fn edition_results(
    edition_id: EditionId,
    caller: std::result::Result<Caller, Error>,
    store: Store,
) -> Result<Json<Vec<QuestionResultDesc>>> {
    let caller = caller?;
    let EditionResults { edition, results } = fetch_edition_results(&*store, edition_id).await?;
    if !caller.can_view_group(edition.group_id) {
        return Err(Error::Forbidden(format!(
            "Member {} may not view results of edition {edition_id}",
            caller.0.id
        )));
    }

    Ok(Json(results.into_iter().map(Into::into).collect()))
}

/// Rank already-fetched data without touching the store.
#[post("/results/compute", data = "<request>", format = "json")]
fn compute(request: Json<ComputeResultsRequest>) -> Result<Json<Vec<QuestionResultDesc>>> {
    let ComputeResultsRequest {
        questions,
        members,
        votes,
    } = request.into_inner();
    let questions = questions.into_iter().map(Question::from).collect::<Vec<_>>();
    let members = members.into_iter().map(Member::from).collect::<Vec<_>>();
    let votes = votes.into_iter().map(Vote::from).collect::<Vec<_>>();
    check_ranks(&members, &votes)?;

    let results = compute_results(&questions, &members, &votes);
    Ok(Json(results.into_iter().map(Into::into).collect()))
}
