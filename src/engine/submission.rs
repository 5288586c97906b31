use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rocket::tokio::join;

use crate::error::{Error, Result};
use crate::model::{
    common::{EditionId, MemberId, QuestionId, VoteBatchId},
    db::{member::Member, question::Question, vote::NewVote},
};
use crate::store::DataStore;

use super::eligibility::eligible_roster;

/// Member IDs in ranked order (best first), per question.
pub type Rankings = BTreeMap<QuestionId, Vec<MemberId>>;

/// Confirmation of a recorded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub batch_id: VoteBatchId,
    pub edition_id: EditionId,
    pub voter_id: MemberId,
    pub questions: usize,
    pub rows: usize,
}

/// Record `voter_id`'s rankings for every question of `edition_id`.
///
/// The rankings are validated against the eligible roster before anything is
/// read from the vote table. The duplicate-vote check then runs strictly before
/// the write; two concurrent submissions can still both pass it, as nothing at
/// the storage level forbids a second batch.
pub async fn submit_vote(
    store: &dyn DataStore,
    edition_id: EditionId,
    voter_id: MemberId,
    rankings: &Rankings,
) -> Result<VoteReceipt> {
    let voter = store
        .member(voter_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Member with ID '{voter_id}'")))?;
    let edition = store
        .edition(edition_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Edition with ID '{edition_id}'")))?;

    let (questions, members) = join!(
        store.questions_for_edition(edition_id),
        store.group_members(edition.group_id, true)
    );
    let (questions, members) = (questions?, members?);

    let roster = eligible_roster(&edition, &members, voter.id);
    if roster.is_empty() || questions.is_empty() {
        return Err(Error::NothingToRank(edition_id));
    }
    validate_rankings(&questions, &roster, rankings)?;

    // Duplicate guard: must be evaluated before the write is issued.
    let existing = store.votes_by_voter(edition_id, voter_id).await?;
    if !existing.is_empty() {
        warn!(
            "Refusing second submission from member {voter_id} in edition {edition_id} \
({} rows already recorded)",
            existing.len()
        );
        return Err(Error::AlreadyVoted {
            edition: edition_id,
            voter: voter_id,
        });
    }

    let rows = vote_rows(edition_id, voter_id, &questions, rankings, Utc::now());
    let row_count = rows.len();
    let batch_id = store.insert_vote_batch(rows).await.map_err(|e| {
        error!("Vote batch for member {voter_id} in edition {edition_id} failed: {e}");
        Error::Submission(e)
    })?;

    info!("Recorded vote batch {batch_id}: member {voter_id}, edition {edition_id}, {row_count} rows");
    Ok(VoteReceipt {
        batch_id,
        edition_id,
        voter_id,
        questions: questions.len(),
        rows: row_count,
    })
}

/// Check that every question has a ranking that is exactly a permutation of the roster,
/// and that no ranking was supplied for a question outside the edition.
pub fn validate_rankings(
    questions: &[Question],
    roster: &[Member],
    rankings: &Rankings,
) -> Result<()> {
    if let Some(unknown) = rankings
        .keys()
        .find(|id| !questions.iter().any(|q| q.id == **id))
    {
        return Err(Error::IncompleteRanking(format!(
            "question {unknown} is not part of this edition"
        )));
    }

    let expected = roster.iter().map(|m| m.id).collect::<BTreeSet<_>>();
    for question in questions {
        let ranking = rankings.get(&question.id).ok_or_else(|| {
            Error::IncompleteRanking(format!("question {} has not been ranked", question.id))
        })?;
        let supplied = ranking.iter().copied().collect::<BTreeSet<_>>();
        if supplied.len() != ranking.len() {
            return Err(Error::IncompleteRanking(format!(
                "question {} ranks a member more than once",
                question.id
            )));
        }
        if supplied != expected {
            return Err(Error::IncompleteRanking(format!(
                "question {} must rank exactly the {} eligible members",
                question.id,
                expected.len()
            )));
        }
    }
    Ok(())
}

/// One row per (question, ranked member), with 1-based ranks in list order.
fn vote_rows(
    edition_id: EditionId,
    voter_id: MemberId,
    questions: &[Question],
    rankings: &Rankings,
    cast_at: DateTime<Utc>,
) -> Vec<NewVote> {
    questions
        .iter()
        .filter_map(|q| rankings.get(&q.id).map(|ranking| (q.id, ranking)))
        .flat_map(|(question_id, ranking)| {
            ranking
                .iter()
                .zip(1..)
                .map(move |(ranked_member_id, rank)| NewVote {
                    edition_id,
                    question_id,
                    voter_id,
                    legacy_voter_id: None,
                    ranked_member_id: *ranked_member_id,
                    rank,
                    batch_id: None,
                    cast_at,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::model::db::vote::examples::vote;
    use crate::store::{MemoryStore, StoreOp};

    use super::*;

    fn rankings(entries: &[(QuestionId, &[MemberId])]) -> Rankings {
        entries
            .iter()
            .map(|(q, members)| (*q, members.to_vec()))
            .collect()
    }

    /// Rows as (question, ranked member, rank) triples.
    async fn recorded(store: &MemoryStore) -> Vec<(QuestionId, MemberId, u32)> {
        store
            .all_votes()
            .await
            .into_iter()
            .map(|v| (v.question_id, v.ranked_member_id, v.rank))
            .collect()
    }

    #[rocket::async_test]
    async fn ranks_are_one_based_list_positions() {
        let store = MemoryStore::example().await;
        let rankings = rankings(&[(1, &[3, 1, 2]), (2, &[1, 2, 3])]);

        let receipt = submit_vote(&store, 2, 1, &rankings).await.unwrap();

        assert_eq!(receipt.rows, 6);
        assert_eq!(receipt.questions, 2);
        assert_eq!(
            recorded(&store).await,
            vec![
                (1, 3, 1),
                (1, 1, 2),
                (1, 2, 3),
                (2, 1, 1),
                (2, 2, 2),
                (2, 3, 3)
            ]
        );
        let votes = store.all_votes().await;
        assert!(votes
            .iter()
            .all(|v| v.voter_id == 1 && v.edition_id == 2 && v.batch_id == Some(receipt.batch_id)));
    }

    #[rocket::async_test]
    async fn second_submission_is_refused() {
        let store = MemoryStore::example().await;
        let first = rankings(&[(1, &[2, 3]), (2, &[3, 2])]);
        let second = rankings(&[(1, &[3, 2]), (2, &[2, 3])]);

        submit_vote(&store, 1, 1, &first).await.unwrap();
        let result = submit_vote(&store, 1, 1, &second).await;

        assert!(matches!(
            result,
            Err(Error::AlreadyVoted {
                edition: 1,
                voter: 1
            })
        ));
        assert_eq!(store.all_votes().await.len(), 4);
    }

    #[rocket::async_test]
    async fn voting_in_one_edition_does_not_block_another() {
        let store = MemoryStore::example().await;
        submit_vote(&store, 1, 1, &rankings(&[(1, &[2, 3]), (2, &[2, 3])]))
            .await
            .unwrap();
        submit_vote(&store, 2, 1, &rankings(&[(1, &[1, 2, 3]), (2, &[1, 2, 3])]))
            .await
            .unwrap();
        assert_eq!(store.all_votes().await.len(), 10);
    }

    #[rocket::async_test]
    async fn legacy_rows_trip_the_guard() {
        let store = MemoryStore::example().await;
        let mut legacy = vote(40, 1, 0, 2, 1);
        legacy.legacy_voter_id = Some(1);
        store.insert_vote(legacy).await;

        let result = submit_vote(&store, 1, 1, &rankings(&[(1, &[2, 3]), (2, &[2, 3])])).await;
        assert!(matches!(result, Err(Error::AlreadyVoted { .. })));
    }

    #[rocket::async_test]
    async fn incomplete_rankings_write_nothing() {
        let store = MemoryStore::example().await;
        let cases = [
            // Question 2 missing.
            rankings(&[(1, &[2, 3])]),
            // Member 3 missing.
            rankings(&[(1, &[2]), (2, &[2, 3])]),
            // Member 2 twice.
            rankings(&[(1, &[2, 2]), (2, &[2, 3])]),
            // The voter ranks themselves despite the self vote exclusion.
            rankings(&[(1, &[1, 2, 3]), (2, &[2, 3])]),
            // An inactive member.
            rankings(&[(1, &[2, 3, 4]), (2, &[2, 3])]),
            // A question outside the edition.
            rankings(&[(1, &[2, 3]), (2, &[2, 3]), (9, &[2, 3])]),
        ];

        for case in cases {
            let result = submit_vote(&store, 1, 1, &case).await;
            assert!(
                matches!(result, Err(Error::IncompleteRanking(_))),
                "{case:?} gave {result:?}"
            );
        }
        assert!(store.all_votes().await.is_empty());
    }

    #[rocket::async_test]
    async fn validation_runs_before_duplicate_check() {
        let store = MemoryStore::example().await;
        store.fail_on(StoreOp::GetVotesByVoter).await;

        let result = submit_vote(&store, 1, 1, &rankings(&[(1, &[2, 3])])).await;
        assert!(matches!(result, Err(Error::IncompleteRanking(_))));

        let result = submit_vote(&store, 1, 1, &rankings(&[(1, &[2, 3]), (2, &[3, 2])])).await;
        assert!(matches!(
            result,
            Err(Error::DataAccess(_))
        ));
        assert!(store.all_votes().await.is_empty());
    }

    #[rocket::async_test]
    async fn nothing_to_rank_is_reported() {
        let store = MemoryStore::example().await;
        let result = submit_vote(&store, 3, 6, &Rankings::new()).await;
        assert!(matches!(result, Err(Error::NothingToRank(3))));
    }

    #[rocket::async_test]
    async fn unknown_edition_or_voter() {
        let store = MemoryStore::example().await;
        let ranking = rankings(&[(1, &[2, 3]), (2, &[2, 3])]);

        assert!(matches!(
            submit_vote(&store, 99, 1, &ranking).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            submit_vote(&store, 1, 99, &ranking).await,
            Err(Error::NotFound(_))
        ));
    }

    #[rocket::async_test]
    async fn failed_insert_is_not_masked() {
        let store = MemoryStore::example().await;
        store.fail_insert_after(1).await;
        let ranking = rankings(&[(1, &[2, 3]), (2, &[2, 3])]);

        let result = submit_vote(&store, 1, 1, &ranking).await;
        assert!(matches!(result, Err(Error::Submission(_))));

        // The partial row stays, and keeps the voter from submitting again.
        store.clear_failures().await;
        assert_eq!(store.all_votes().await.len(), 1);
        let result = submit_vote(&store, 1, 1, &ranking).await;
        assert!(matches!(result, Err(Error::AlreadyVoted { .. })));
    }
}
