use rocket::Route;

use crate::config::RosterCache;
use crate::error::Result;
use crate::model::{common::GroupId, db::member::Member};
use crate::store::DataStore;

mod admin;
mod editions;
mod results;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(editions::routes());
    routes.extend(voting::routes());
    routes.extend(results::routes());
    routes.extend(admin::routes());
    routes
}

/// The active roster of a group, served from the cache while it is fresh.
///
/// The lock is never held across a store call.
async fn cached_roster(
    store: &dyn DataStore,
    rosters: &RosterCache,
    group_id: GroupId,
) -> Result<Vec<Member>> {
    if let Some(members) = rosters.lock().await.get(&group_id) {
        debug!("Roster of group {group_id} served from cache");
        return Ok(members.clone());
    }
    let members = store.group_members(group_id, true).await?;
    rosters.lock().await.insert(group_id, members.clone());
    Ok(members)
}
