use crate::model::{
    common::MemberId,
    db::{edition::Edition, member::Member},
};

/// The members `voter_id` is asked to rank in `edition`.
///
/// Keeps the active members of the edition's group, drops the voter when the
/// edition forbids self votes, and orders the rest by display name then ID so
/// every call yields the same baseline ranking.
pub fn eligible_roster(
    edition: &Edition,
    group_members: &[Member],
    voter_id: MemberId,
) -> Vec<Member> {
    let mut roster = group_members
        .iter()
        .filter(|m| m.is_active && m.is_in_group(edition.group_id))
        .filter(|m| !(edition.no_self_vote && m.id == voter_id))
        .cloned()
        .collect::<Vec<_>>();
    roster.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.id.cmp(&b.id))
    });
    roster
}
