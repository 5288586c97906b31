use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rocket::tokio::join;

use crate::error::{Error, Result};
use crate::model::{
    common::{EditionId, MemberId},
    db::{edition::Edition, member::Member, question::Question, vote::Vote},
};
use crate::store::DataStore;

/// Places up to and including this one are shown on the podium.
pub const PODIUM_PLACES: u32 = 3;

/// How one member fared on one question.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberScore {
    pub member: Member,
    /// 1-based place; members with equal average ranks share a place.
    pub place: u32,
    /// Mean rank received; lower is better.
    pub average_rank: f64,
    pub vote_count: u32,
    /// Sum over votes of `max_rank + 1 - rank`, where `max_rank` is the largest
    /// rank observed for the question.
    pub total_points: u64,
    rank_sum: u64,
}

impl MemberScore {
    /// Compare average ranks exactly, without going through floats.
    fn cmp_average(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.rank_sum) * u128::from(other.vote_count);
        let rhs = u128::from(other.rank_sum) * u128::from(self.vote_count);
        lhs.cmp(&rhs)
    }
}

/// The leaderboard for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionResult {
    pub question: Question,
    /// Number of vote rows for the question: voters times members ranked by each.
    pub total_votes: usize,
    /// Members with at least one vote, best average rank first. Ties are broken by
    /// member ID ascending.
    pub ranked_members: Vec<MemberScore>,
    /// Active roster members nobody has ranked yet.
    pub unranked_members: Vec<Member>,
}

impl QuestionResult {
    /// Entries placed first to third. Longer than three when places are shared.
    pub fn podium(&self) -> &[MemberScore] {
        let end = self
            .ranked_members
            .iter()
            .position(|s| s.place > PODIUM_PLACES)
            .unwrap_or(self.ranked_members.len());
        &self.ranked_members[..end]
    }

    pub fn score_of(&self, member_id: MemberId) -> Option<&MemberScore> {
        self.ranked_members.iter().find(|s| s.member.id == member_id)
    }
}

/// An edition together with the leaderboards of its questions.
#[derive(Debug, Clone, PartialEq)]
pub struct EditionResults {
    pub edition: Edition,
    pub results: Vec<QuestionResult>,
}

/// Read an edition's questions, votes and whole group roster, and rank them.
///
/// Deactivated members are read too: whoever was ranked stays on the leaderboard
/// after leaving.
pub async fn fetch_edition_results(
    store: &dyn DataStore,
    edition_id: EditionId,
) -> Result<EditionResults> {
    let (edition, votes, questions) = join!(
        store.edition(edition_id),
        store.votes_for_edition(edition_id),
        store.questions_for_edition(edition_id)
    );
    let edition = edition?
        .ok_or_else(|| Error::not_found(format!("Edition with ID '{edition_id}'")))?;
    let members = store.group_members(edition.group_id, false).await?;
    let votes = votes?;
    let questions = questions?;
    debug!(
        "Ranking edition {edition_id}: {} members, {} questions, {} votes",
        members.len(),
        questions.len(),
        votes.len()
    );

    let results = compute_results(&questions, &members, &votes);
    Ok(EditionResults { edition, results })
}

/// Reject ranks no ballot could have produced.
///
/// Ranks start at 1, and a voter ranks each member at most once, so no rank can
/// exceed the number of distinct members known to the request.
pub fn check_ranks(members: &[Member], votes: &[Vote]) -> Result<()> {
    let known = members
        .iter()
        .map(|m| m.id)
        .chain(votes.iter().map(|v| v.ranked_member_id))
        .collect::<BTreeSet<_>>()
        .len();
    match votes
        .iter()
        .find(|v| v.rank == 0 || v.rank as usize > known)
    {
        Some(vote) => Err(Error::BadRequest(format!(
            "Vote {} has rank {}, expected 1 to {known}",
            vote.id, vote.rank
        ))),
        None => Ok(()),
    }
}

/// Build per-question leaderboards from raw vote rows.
///
/// Only members of `members` can appear on a leaderboard; rows about anyone else
/// (e.g. a member deleted since) still count towards `total_votes` and the
/// observed maximum rank. Inactive members are ranked when they received votes
/// but never listed as unranked. Points use the observed maximum, so they only
/// compare meaningfully across editions once every voter has submitted.
pub fn compute_results(
    questions: &[Question],
    members: &[Member],
    votes: &[Vote],
) -> Vec<QuestionResult> {
    questions
        .iter()
        .map(|question| question_result(question, members, votes))
        .collect()
}

fn question_result(question: &Question, members: &[Member], votes: &[Vote]) -> QuestionResult {
    let question_votes = votes
        .iter()
        .filter(|v| v.question_id == question.id)
        .collect::<Vec<_>>();
    let max_rank = question_votes.iter().map(|v| v.rank).max().unwrap_or(0);

    // (rank sum, vote count) per ranked member.
    let mut tallies: BTreeMap<MemberId, (u64, u32)> = BTreeMap::new();
    for vote in &question_votes {
        let tally = tallies.entry(vote.ranked_member_id).or_default();
        tally.0 += u64::from(vote.rank);
        tally.1 += 1;
    }

    let mut ranked_members = Vec::new();
    let mut unranked_members = Vec::new();
    let mut seen = Vec::with_capacity(members.len());
    for member in members {
        if seen.contains(&member.id) {
            continue;
        }
        seen.push(member.id);
        match tallies.get(&member.id) {
            Some(&(rank_sum, vote_count)) => {
                let total_points = u64::from(vote_count) * (u64::from(max_rank) + 1) - rank_sum;
                ranked_members.push(MemberScore {
                    member: member.clone(),
                    place: 0,
                    average_rank: rank_sum as f64 / f64::from(vote_count),
                    vote_count,
                    total_points,
                    rank_sum,
                });
            }
            None if member.is_active => unranked_members.push(member.clone()),
            None => {}
        }
    }

    ranked_members.sort_by(|a, b| a.cmp_average(b).then_with(|| a.member.id.cmp(&b.member.id)));
    assign_places(&mut ranked_members);
    unranked_members.sort_by_key(|m| m.id);

    QuestionResult {
        question: question.clone(),
        total_votes: question_votes.len(),
        ranked_members,
        unranked_members,
    }
}

/// Standard competition places ("1224"): ties share the better place.
fn assign_places(scores: &mut [MemberScore]) {
    let mut place = 0;
    for i in 0..scores.len() {
        if i == 0 || scores[i].cmp_average(&scores[i - 1]) != Ordering::Equal {
            place = i as u32 + 1;
        }
        scores[i].place = place;
    }
}
