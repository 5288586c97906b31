//! Types shared between the database and API representations.

/// Our group IDs are integers.
pub type GroupId = u32;
/// Our member IDs are integers.
pub type MemberId = u32;
/// Our edition IDs are integers.
pub type EditionId = u32;
/// Our question IDs are integers.
pub type QuestionId = u32;
/// Our vote IDs are integers.
pub type VoteId = u32;
/// Every vote row written by one submission shares a batch ID.
pub type VoteBatchId = u32;
