use std::ops::Deref;

use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
    options::IndexOptions,
    Collection, Database, IndexModel,
};

use crate::model::db::{
    edition::Edition,
    member::Member,
    question::{EditionQuestion, Question},
    vote::Vote,
};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A filter matching the document with the given integer `_id`.
pub fn u32_id_filter(id: u32) -> Document {
    doc! { "_id": id }
}

impl MongoCollection for Member {
    const NAME: &'static str = "members";
}

impl MongoCollection for Edition {
    const NAME: &'static str = "editions";
}

impl MongoCollection for Question {
    const NAME: &'static str = "questions";
}

impl MongoCollection for EditionQuestion {
    const NAME: &'static str = "edition_questions";
}

impl MongoCollection for Vote {
    const NAME: &'static str = "votes";
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

/// Ensure that all the required indexes exist on the given database.
///
/// Votes are deliberately not unique per voter: the duplicate-vote guard is a
/// read-then-write check, not a storage constraint.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Member collection: emails identify voters, but not every member has one.
    let member_index = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(IndexOptions::builder().unique(true).sparse(true).build())
        .build();
    Coll::<Member>::from_db(db)
        .create_index(member_index, None)
        .await?;
    let membership_index = IndexModel::builder().keys(doc! {"group_ids": 1}).build();
    Coll::<Member>::from_db(db)
        .create_index(membership_index, None)
        .await?;

    // Edition <-> question link table.
    let link_index = IndexModel::builder()
        .keys(doc! {"edition_id": 1, "question_id": 1})
        .options(unique)
        .build();
    Coll::<EditionQuestion>::from_db(db)
        .create_index(link_index, None)
        .await?;

    // Vote collection, for the duplicate-vote guard and per-edition reads.
    let vote_index = IndexModel::builder()
        .keys(doc! {"edition_id": 1, "voter_id": 1})
        .build();
    Coll::<Vote>::from_db(db)
        .create_index(vote_index, None)
        .await?;

    Ok(())
}
