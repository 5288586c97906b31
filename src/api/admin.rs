use rocket::Route;

use crate::error::{Error, Result};
use crate::model::{
    api::caller::SuperAdmin,
    common::{EditionId, VoteId},
};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![delete_vote]
}

#[delete("/editions/<edition_id>/votes/<vote_id>")]
async fn delete_vote(
    edition_id: EditionId,
    vote_id: VoteId,
    admin: std::result::Result<SuperAdmin, Error>,
    store: Store,
) -> Result<()> {
    let SuperAdmin(admin) = admin?;
    if !store.delete_vote(edition_id, vote_id).await? {
        return Err(Error::not_found(format!(
            "Vote {vote_id} in edition {edition_id}"
        )));
    }
    info!(
        "Super admin {} deleted vote {vote_id} of edition {edition_id}",
        admin.id
    );
    Ok(())
}
