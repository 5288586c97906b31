use rocket::tokio::join;

use crate::error::{Error, Result};
use crate::model::{
    common::{EditionId, MemberId},
    db::{edition::Edition, member::Member, question::Question, vote::Vote},
};
use crate::store::DataStore;

/// How a caller identifies the voter whose status they want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterRef {
    Id(MemberId),
    Email(String),
}

/// Everything needed to render an edition: the edition itself, its active roster,
/// its questions, every vote cast, and whether the given voter is among the voters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionAggregate {
    pub edition: Edition,
    pub members: Vec<Member>,
    pub votes: Vec<Vote>,
    pub questions: Vec<Question>,
    /// The resolved voter, if one was asked about and could be found.
    pub voter_id: Option<MemberId>,
    pub user_has_voted: bool,
}

/// Fetch an edition together with its roster, questions and votes.
///
/// The edition, its votes and its questions are read concurrently; the roster
/// needs the edition's group so is read afterwards.
pub async fn fetch_edition_aggregate(
    store: &dyn DataStore,
    edition_id: EditionId,
    voter: Option<&VoterRef>,
) -> Result<EditionAggregate> {
    let (edition, votes, questions) = join!(
        store.edition(edition_id),
        store.votes_for_edition(edition_id),
        store.questions_for_edition(edition_id)
    );
    let edition = edition?
        .ok_or_else(|| Error::not_found(format!("Edition with ID '{edition_id}'")))?;
    let members = store.group_members(edition.group_id, true).await?;
    let votes = votes?;
    let questions = questions?;
    debug!(
        "Edition {edition_id}: {} members, {} questions, {} votes",
        members.len(),
        questions.len(),
        votes.len()
    );

    let voter_id = match voter {
        Some(voter) => resolve_voter(store, &members, voter).await?,
        None => None,
    };
    let user_has_voted = voter_id.map_or(false, |id| votes.iter().any(|v| v.is_cast_by(id)));

    Ok(EditionAggregate {
        edition,
        members,
        votes,
        questions,
        voter_id,
        user_has_voted,
    })
}

/// Look the voter up in the roster we already have, falling back to the full member
/// set: a voter can be a legitimate member without being on the active roster.
async fn resolve_voter(
    store: &dyn DataStore,
    roster: &[Member],
    voter: &VoterRef,
) -> Result<Option<MemberId>> {
    let in_roster = roster.iter().find(|m| match voter {
        VoterRef::Id(id) => m.id == *id,
        VoterRef::Email(email) => m.email.as_deref() == Some(email.as_str()),
    });
    if let Some(member) = in_roster {
        return Ok(Some(member.id));
    }

    let member = match voter {
        VoterRef::Id(id) => store.member(*id).await?,
        VoterRef::Email(email) => store.member_by_email(email).await?,
    };
    Ok(member.map(|m| m.id))
}

#[cfg(test)]
mod tests {
    use crate::model::db::vote::examples::vote;
    use crate::store::{MemoryStore, StoreOp};

    use super::*;

    fn email(address: &str) -> VoterRef {
        VoterRef::Email(address.to_string())
    }

    #[rocket::async_test]
    async fn aggregates_edition_data() {
        let store = MemoryStore::example().await;
        store.insert_vote(vote(1, 1, 2, 1, 1)).await;

        let aggregate = fetch_edition_aggregate(&store, 1, Some(&email("bob@example.com")))
            .await
            .unwrap();

        assert_eq!(aggregate.edition, Edition::example());
        assert_eq!(
            aggregate.members.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(aggregate.questions.len(), 2);
        assert_eq!(aggregate.votes.len(), 1);
        assert_eq!(aggregate.voter_id, Some(2));
        assert!(aggregate.user_has_voted);
    }

    #[rocket::async_test]
    async fn being_ranked_is_not_voting() {
        let store = MemoryStore::example().await;
        store.insert_vote(vote(1, 1, 2, 1, 1)).await;

        let aggregate = fetch_edition_aggregate(&store, 1, Some(&VoterRef::Id(1)))
            .await
            .unwrap();
        assert_eq!(aggregate.voter_id, Some(1));
        assert!(!aggregate.user_has_voted);
    }

    #[rocket::async_test]
    async fn falls_back_to_full_member_lookup() {
        let store = MemoryStore::example().await;
        // Denis is inactive, so not on the roster, but voted before being deactivated.
        store.insert_vote(vote(1, 1, 4, 2, 1)).await;

        let aggregate = fetch_edition_aggregate(&store, 1, Some(&email("denis@example.com")))
            .await
            .unwrap();
        assert!(aggregate.members.iter().all(|m| m.id != 4));
        assert_eq!(aggregate.voter_id, Some(4));
        assert!(aggregate.user_has_voted);
    }

    #[rocket::async_test]
    async fn unknown_voter_has_not_voted() {
        let store = MemoryStore::example().await;
        store.insert_vote(vote(1, 1, 2, 1, 1)).await;

        let aggregate = fetch_edition_aggregate(&store, 1, Some(&email("nobody@example.com")))
            .await
            .unwrap();
        assert_eq!(aggregate.voter_id, None);
        assert!(!aggregate.user_has_voted);

        let aggregate = fetch_edition_aggregate(&store, 1, None).await.unwrap();
        assert!(!aggregate.user_has_voted);
    }

    #[rocket::async_test]
    async fn missing_edition() {
        let store = MemoryStore::example().await;
        let result = fetch_edition_aggregate(&store, 999, Some(&email("bob@example.com"))).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[rocket::async_test]
    async fn store_failures_are_not_empty_results() {
        let store = MemoryStore::example().await;
        for op in [
            StoreOp::GetVotesForEdition,
            StoreOp::GetQuestionsForEdition,
            StoreOp::GetGroupMembers,
            StoreOp::ResolveMemberByEmail,
        ] {
            store.clear_failures().await;
            store.fail_on(op).await;
            let result =
                fetch_edition_aggregate(&store, 1, Some(&email("nobody@example.com"))).await;
            assert!(matches!(result, Err(Error::DataAccess(_))), "{op}");
        }
    }
}
