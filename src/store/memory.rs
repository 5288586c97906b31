use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use rocket::tokio::sync::Mutex;

use crate::model::{
    common::{EditionId, GroupId, MemberId, QuestionId, VoteBatchId, VoteId},
    db::{
        edition::Edition,
        member::Member,
        question::{EditionQuestion, Question},
        vote::{NewVote, Vote},
    },
};

use super::{DataStore, StoreError, StoreOp};

/// In-process tables.
#[derive(Default)]
struct Tables {
    members: BTreeMap<MemberId, Member>,
    editions: BTreeMap<EditionId, Edition>,
    questions: BTreeMap<QuestionId, Question>,
    edition_questions: BTreeSet<(EditionId, QuestionId)>,
    votes: BTreeMap<VoteId, Vote>,
    next_vote_id: VoteId,
    next_batch_id: VoteBatchId,
    /// Operations that fail until cleared.
    failing: HashSet<StoreOp>,
    /// If set, batch inserts write this many rows before failing.
    partial_insert: Option<usize>,
}

/// [`DataStore`] kept entirely in memory.
///
/// Clones share the same tables, so a test can keep a handle while the server
/// owns another. Failures can be injected per operation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_member(&self, member: Member) {
        self.tables.lock().await.members.insert(member.id, member);
    }

    pub async fn insert_edition(&self, edition: Edition) {
        self.tables.lock().await.editions.insert(edition.id, edition);
    }

    pub async fn insert_question(&self, question: Question) {
        self.tables
            .lock()
            .await
            .questions
            .insert(question.id, question);
    }

    pub async fn link_question(&self, link: EditionQuestion) {
        self.tables
            .lock()
            .await
            .edition_questions
            .insert((link.edition_id, link.question_id));
    }

    /// Insert an existing vote row as-is, e.g. one written by an older schema.
    pub async fn insert_vote(&self, vote: Vote) {
        let mut tables = self.tables.lock().await;
        tables.next_vote_id = tables.next_vote_id.max(vote.id + 1);
        tables.votes.insert(vote.id, vote);
    }

    /// All stored vote rows, in ID order.
    pub async fn all_votes(&self) -> Vec<Vote> {
        self.tables.lock().await.votes.values().cloned().collect()
    }

    /// Make the given operation fail until [`MemoryStore::clear_failures`] is called.
    pub async fn fail_on(&self, op: StoreOp) {
        self.tables.lock().await.failing.insert(op);
    }

    /// Make batch inserts write only the first `rows` rows, then fail.
    pub async fn fail_insert_after(&self, rows: usize) {
        self.tables.lock().await.partial_insert = Some(rows);
    }

    pub async fn clear_failures(&self) {
        let mut tables = self.tables.lock().await;
        tables.failing.clear();
        tables.partial_insert = None;
    }
}

impl Tables {
    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.contains(&op) {
            warn!("Injected failure for {op}");
            return Err(StoreError::Unavailable(op));
        }
        Ok(())
    }

    fn votes_where(&self, pred: impl Fn(&Vote) -> bool) -> Vec<Vote> {
        self.votes.values().filter(|v| pred(v)).cloned().collect()
    }
}

#[rocket::async_trait]
impl DataStore for MemoryStore {
    async fn edition(&self, id: EditionId) -> Result<Option<Edition>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetEdition)?;
        Ok(tables.editions.get(&id).cloned())
    }

    async fn questions_for_edition(
        &self,
        edition_id: EditionId,
    ) -> Result<Vec<Question>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetQuestionsForEdition)?;
        let questions = tables
            .edition_questions
            .range((edition_id, QuestionId::MIN)..=(edition_id, QuestionId::MAX))
            .filter_map(|(_, question_id)| tables.questions.get(question_id).cloned())
            .collect();
        Ok(questions)
    }

    async fn group_members(
        &self,
        group_id: GroupId,
        active_only: bool,
    ) -> Result<Vec<Member>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetGroupMembers)?;
        let members = tables
            .members
            .values()
            .filter(|m| m.is_in_group(group_id) && (m.is_active || !active_only))
            .cloned()
            .collect();
        Ok(members)
    }

    async fn votes_for_edition(&self, edition_id: EditionId) -> Result<Vec<Vote>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetVotesForEdition)?;
        Ok(tables.votes_where(|v| v.edition_id == edition_id))
    }

    async fn votes_by_voter(
        &self,
        edition_id: EditionId,
        voter_id: MemberId,
    ) -> Result<Vec<Vote>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetVotesByVoter)?;
        Ok(tables.votes_where(|v| v.edition_id == edition_id && v.is_cast_by(voter_id)))
    }

    async fn insert_vote_batch(&self, rows: Vec<NewVote>) -> Result<VoteBatchId, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.check(StoreOp::InsertVoteBatch)?;

        tables.next_batch_id += 1;
        let batch_id = tables.next_batch_id;
        let written = tables.partial_insert.unwrap_or(rows.len());
        for (i, mut vote) in rows.into_iter().enumerate() {
            if i >= written {
                return Err(StoreError::Unavailable(StoreOp::InsertVoteBatch));
            }
            tables.next_vote_id = tables.next_vote_id.max(1);
            let id = tables.next_vote_id;
            tables.next_vote_id += 1;
            vote.batch_id = Some(batch_id);
            tables.votes.insert(id, Vote { id, vote });
        }
        Ok(batch_id)
    }

    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::ResolveMemberByEmail)?;
        let member = tables
            .members
            .values()
            .find(|m| m.email.as_deref() == Some(email))
            .cloned();
        Ok(member)
    }

    async fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetMember)?;
        Ok(tables.members.get(&id).cloned())
    }

    async fn editions_for_groups(
        &self,
        group_ids: &[GroupId],
    ) -> Result<Vec<Edition>, StoreError> {
        let tables = self.tables.lock().await;
        tables.check(StoreOp::GetEditionsForGroups)?;
        let editions = tables
            .editions
            .values()
            .rev()
            .filter(|e| group_ids.contains(&e.group_id))
            .cloned()
            .collect();
        Ok(editions)
    }

    async fn delete_vote(
        &self,
        edition_id: EditionId,
        vote_id: VoteId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.check(StoreOp::DeleteVote)?;
        let matches = tables
            .votes
            .get(&vote_id)
            .map_or(false, |v| v.edition_id == edition_id);
        if matches {
            tables.votes.remove(&vote_id);
        }
        Ok(matches)
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl MemoryStore {
        /// A store holding the example groups, members, editions and questions, with no votes.
        ///
        /// Editions 1 and 2 both ask questions 1 and 2 of group 1 (Alice, Bob, Chloé and an
        /// inactive Denis). Edition 3 asks question 1 of the single-member group 2.
        pub async fn example() -> Self {
            let store = Self::new();
            for member in [
                Member::example_alice(),
                Member::example_bob(),
                Member::example_chloe(),
                Member::example_inactive(),
                Member::example_admin(),
                Member::example_solo(),
            ] {
                store.insert_member(member).await;
            }
            for edition in [
                Edition::example(),
                Edition::example_self_vote(),
                Edition::example_solo(),
            ] {
                store.insert_edition(edition).await;
            }
            store.insert_question(Question::example1()).await;
            store.insert_question(Question::example2()).await;
            for (edition_id, question_id) in [(1, 1), (1, 2), (2, 1), (2, 2), (3, 1)] {
                store
                    .link_question(EditionQuestion {
                        edition_id,
                        question_id,
                    })
                    .await;
            }
            store
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::db::vote::examples::vote;

    use super::*;

    #[rocket::async_test]
    async fn roster_respects_activity_filter() {
        let store = MemoryStore::example().await;

        let active = store.group_members(1, true).await.unwrap();
        let ids = active.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);

        let everyone = store.group_members(1, false).await.unwrap();
        assert_eq!(everyone.len(), 4);
    }

    #[rocket::async_test]
    async fn questions_follow_link_table() {
        let store = MemoryStore::example().await;

        let questions = store.questions_for_edition(1).await.unwrap();
        assert_eq!(questions, vec![Question::example1(), Question::example2()]);
        let questions = store.questions_for_edition(3).await.unwrap();
        assert_eq!(questions, vec![Question::example1()]);
        assert!(store.questions_for_edition(99).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn batch_insert_assigns_ids_and_batch() {
        let store = MemoryStore::example().await;
        store.insert_vote(vote(10, 1, 3, 1, 1)).await;

        let rows = vec![vote(0, 1, 1, 2, 1).vote, vote(0, 1, 1, 3, 2).vote];
        let batch = store.insert_vote_batch(rows).await.unwrap();

        let votes = store.votes_by_voter(1, 1).await.unwrap();
        assert_eq!(votes.len(), 2);
        assert!(votes.iter().all(|v| v.batch_id == Some(batch)));
        assert_eq!(votes.iter().map(|v| v.id).collect::<Vec<_>>(), vec![11, 12]);
    }

    #[rocket::async_test]
    async fn partial_insert_leaves_written_rows() {
        let store = MemoryStore::example().await;
        store.fail_insert_after(1).await;

        let rows = vec![vote(0, 1, 1, 2, 1).vote, vote(0, 1, 1, 3, 2).vote];
        let result = store.insert_vote_batch(rows).await;

        assert!(matches!(
            result,
            Err(StoreError::Unavailable(StoreOp::InsertVoteBatch))
        ));
        assert_eq!(store.all_votes().await.len(), 1);
    }

    #[rocket::async_test]
    async fn injected_failures_can_be_cleared() {
        let store = MemoryStore::example().await;
        store.fail_on(StoreOp::GetEdition).await;
        assert!(store.edition(1).await.is_err());

        store.clear_failures().await;
        assert_eq!(store.edition(1).await.unwrap(), Some(Edition::example()));
    }

    #[rocket::async_test]
    async fn editions_for_groups_newest_first() {
        let store = MemoryStore::example().await;
        let ids = store
            .editions_for_groups(&[1, 2])
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[rocket::async_test]
    async fn delete_vote_checks_edition() {
        let store = MemoryStore::example().await;
        store.insert_vote(vote(1, 1, 1, 2, 1)).await;

        assert!(!store.delete_vote(2, 1).await.unwrap());
        assert!(store.delete_vote(1, 1).await.unwrap());
        assert!(store.all_votes().await.is_empty());
    }
}
