use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{
    common::{EditionId, MemberId, QuestionId},
    db::{member::Member, question::Question},
};

use super::submission::Rankings;

/// One voter's in-progress rankings for one edition.
///
/// Every question starts from its own copy of the eligible roster; reordering one
/// question never touches another. Nothing here is persisted: dropping the
/// session discards the voter's work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingSession {
    edition_id: EditionId,
    voter_id: MemberId,
    rankings: BTreeMap<QuestionId, Vec<Member>>,
}

impl RankingSession {
    /// Start a session where every question is ranked in roster order.
    pub fn new(
        edition_id: EditionId,
        voter_id: MemberId,
        questions: &[Question],
        roster: &[Member],
    ) -> Self {
        let rankings = questions
            .iter()
            .map(|q| (q.id, roster.to_vec()))
            .collect();
        Self {
            edition_id,
            voter_id,
            rankings,
        }
    }

    pub fn edition_id(&self) -> EditionId {
        self.edition_id
    }

    pub fn voter_id(&self) -> MemberId {
        self.voter_id
    }

    /// The current ordering for a question, best first.
    pub fn ranking(&self, question_id: QuestionId) -> Option<&[Member]> {
        self.rankings.get(&question_id).map(Vec::as_slice)
    }

    /// Iterate over every question's current ordering, in question ID order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &[Member])> {
        self.rankings.iter().map(|(id, members)| (*id, members.as_slice()))
    }

    /// Move the member at `from` so that it ends up at `to`, shifting the members in
    /// between. This is a splice, not a swap.
    pub fn reorder(
        &mut self,
        question_id: QuestionId,
        from: usize,
        to: usize,
    ) -> Result<&[Member]> {
        let ranking = self
            .rankings
            .get_mut(&question_id)
            .ok_or_else(|| Error::not_found(format!("Question {question_id} in this session")))?;
        let len = ranking.len();
        if from >= len || to >= len {
            return Err(Error::InvalidReorder(format!(
                "cannot move position {from} to {to} in a ranking of {len}"
            )));
        }
        let member = ranking.remove(from);
        ranking.insert(to, member);
        Ok(ranking)
    }

    /// The member IDs of every ranking, ready for submission.
    pub fn rankings(&self) -> Rankings {
        self.rankings
            .iter()
            .map(|(id, members)| (*id, members.iter().map(|m| m.id).collect()))
            .collect()
    }
}
