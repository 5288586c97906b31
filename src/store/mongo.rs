use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, InsertManyOptions},
    Database,
};
use rocket::futures::TryStreamExt;

use crate::model::{
    common::{EditionId, GroupId, MemberId, QuestionId, VoteBatchId, VoteId},
    db::{
        edition::Edition,
        member::Member,
        question::{EditionQuestion, Question},
        vote::{NewVote, Vote},
    },
    mongodb::{u32_id_filter, Coll, Counter, VOTE_BATCH_COUNTER_ID, VOTE_ID_COUNTER_ID},
};

use super::{DataStore, StoreError, StoreOp};

/// Links between an edition and its questions.
fn edition_links_filter(edition_id: EditionId) -> Document {
    doc! {"edition_id": edition_id}
}

fn questions_filter(question_ids: Vec<QuestionId>) -> Document {
    doc! {"_id": {"$in": question_ids}}
}

/// Members of a group. A missing `is_active` flag counts as active.
fn roster_filter(group_id: GroupId, active_only: bool) -> Document {
    let mut filter = doc! {"group_ids": group_id};
    if active_only {
        filter.insert("is_active", doc! {"$ne": false});
    }
    filter
}

/// Votes cast by a member in an edition, including rows that only carry the
/// legacy voter field.
fn voter_filter(edition_id: EditionId, voter_id: MemberId) -> Document {
    doc! {
        "edition_id": edition_id,
        "$or": [{"voter_id": voter_id}, {"legacy_voter_id": voter_id}],
    }
}

/// Give each row of a batch the batch ID and the next of a run of reserved IDs.
fn number_rows(rows: Vec<NewVote>, batch_id: VoteBatchId, first_id: VoteId) -> Vec<Vote> {
    rows.into_iter()
        .zip(first_id..)
        .map(|(mut vote, id)| {
            vote.batch_id = Some(batch_id);
            Vote { id, vote }
        })
        .collect()
}

/// [`DataStore`] backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    editions: Coll<Edition>,
    members: Coll<Member>,
    questions: Coll<Question>,
    edition_questions: Coll<EditionQuestion>,
    votes: Coll<Vote>,
    counters: Coll<Counter>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            editions: Coll::from_db(db),
            members: Coll::from_db(db),
            questions: Coll::from_db(db),
            edition_questions: Coll::from_db(db),
            votes: Coll::from_db(db),
            counters: Coll::from_db(db),
        }
    }

    async fn find_votes(&self, filter: Document) -> Result<Vec<Vote>, StoreError> {
        let options = FindOptions::builder().sort(doc! {"_id": 1}).build();
        let votes = self
            .votes
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        Ok(votes)
    }

    async fn reserve(&self, counter: &str, count: u32, op: StoreOp) -> Result<u32, StoreError> {
        Counter::reserve(&self.counters, counter, count)
            .await?
            .ok_or_else(|| {
                error!("Counter '{counter}' is missing from the database");
                StoreError::Unavailable(op)
            })
    }
}

#[rocket::async_trait]
impl DataStore for MongoStore {
    async fn edition(&self, id: EditionId) -> Result<Option<Edition>, StoreError> {
        Ok(self.editions.find_one(u32_id_filter(id), None).await?)
    }

    async fn questions_for_edition(
        &self,
        edition_id: EditionId,
    ) -> Result<Vec<Question>, StoreError> {
        let question_ids = self
            .edition_questions
            .find(edition_links_filter(edition_id), None)
            .await?
            .map_ok(|link| link.question_id)
            .try_collect::<Vec<_>>()
            .await?;
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }

        let options = FindOptions::builder().sort(doc! {"_id": 1}).build();
        let questions = self
            .questions
            .find(questions_filter(question_ids), options)
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn group_members(
        &self,
        group_id: GroupId,
        active_only: bool,
    ) -> Result<Vec<Member>, StoreError> {
        let options = FindOptions::builder().sort(doc! {"_id": 1}).build();
        let members = self
            .members
            .find(roster_filter(group_id, active_only), options)
            .await?
            .try_collect()
            .await?;
        Ok(members)
    }

    async fn votes_for_edition(&self, edition_id: EditionId) -> Result<Vec<Vote>, StoreError> {
        self.find_votes(doc! {"edition_id": edition_id}).await
    }

    async fn votes_by_voter(
        &self,
        edition_id: EditionId,
        voter_id: MemberId,
    ) -> Result<Vec<Vote>, StoreError> {
        self.find_votes(voter_filter(edition_id, voter_id)).await
    }

    async fn insert_vote_batch(&self, rows: Vec<NewVote>) -> Result<VoteBatchId, StoreError> {
        let count = u32::try_from(rows.len())
            .map_err(|_| StoreError::Unavailable(StoreOp::InsertVoteBatch))?;
        let batch_id = self
            .reserve(VOTE_BATCH_COUNTER_ID, 1, StoreOp::InsertVoteBatch)
            .await?;
        let first_id = self
            .reserve(VOTE_ID_COUNTER_ID, count, StoreOp::InsertVoteBatch)
            .await?;

        let votes = number_rows(rows, batch_id, first_id);

        // Multi-document inserts are not transactional; an ordered insert at least
        // stops at the first failing row.
        let options = InsertManyOptions::builder().ordered(true).build();
        self.votes.insert_many(votes.iter(), options).await?;
        debug!("Inserted vote batch {batch_id} ({count} rows)");
        Ok(batch_id)
    }

    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        Ok(self.members.find_one(doc! {"email": email}, None).await?)
    }

    async fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        Ok(self.members.find_one(u32_id_filter(id), None).await?)
    }

    async fn editions_for_groups(
        &self,
        group_ids: &[GroupId],
    ) -> Result<Vec<Edition>, StoreError> {
        let options = FindOptions::builder().sort(doc! {"_id": -1}).build();
        let editions = self
            .editions
            .find(doc! {"group_id": {"$in": group_ids.to_vec()}}, options)
            .await?
            .try_collect()
            .await?;
        Ok(editions)
    }

    async fn delete_vote(
        &self,
        edition_id: EditionId,
        vote_id: VoteId,
    ) -> Result<bool, StoreError> {
        let filter = doc! {"_id": vote_id, "edition_id": edition_id};
        let result = self.votes.delete_one(filter, None).await?;
        Ok(result.deleted_count > 0)
    }
}
