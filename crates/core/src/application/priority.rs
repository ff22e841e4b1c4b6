//! Priority Change Detector
//!
//! Compares a queue's order before and after one mutation and picks out the
//! members that were pushed back because someone was inserted ahead of them.
//! Drift caused purely by departures moves members forward and never matches.

use crate::domain::{Member, MemberId};
use std::collections::HashMap;

/// Members whose rank worsened while a different member took their old slot.
///
/// Only members present in both snapshots are candidates. Results follow
/// the `after` order.
pub fn detect_overtaken(before: &[Member], after: &[Member]) -> Vec<MemberId> {
    let old_index: HashMap<MemberId, usize> = before
        .iter()
        .enumerate()
        .map(|(index, member)| (member.id, index))
        .collect();

    after
        .iter()
        .enumerate()
        .filter_map(|(new_index, member)| {
            let old = *old_index.get(&member.id)?;
            if new_index <= old {
                return None;
            }
            let previous_occupant = before.get(old).map(|m| m.id);
            let current_occupant = after.get(old).map(|m| m.id);
            (previous_occupant != current_occupant).then_some(member.id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(entries: &[(&str, i32)]) -> Vec<Member> {
        entries.iter()
            .map(|(name, weight)| Member::new_test(*name, *weight))
            .collect()
    }

    #[test]
    fn test_higher_priority_insert_pushes_back_everyone_behind() {
        let before = members(&[("a", 1), ("b", 1)]);
        let c = Member::new_test("c", 5);
        let after = vec![c.clone(), before[0].clone(), before[1].clone()];

        let overtaken = detect_overtaken(&before, &after);

        // a's old slot 0 is now c, b's old slot 1 is now a
        assert_eq!(overtaken, vec![before[0].id, before[1].id]);
        assert!(!overtaken.contains(&c.id), "new joiners are never candidates");
    }

    #[test]
    fn test_insert_behind_does_not_notify() {
        let before = members(&[("a", 5), ("b", 3)]);
        let c = Member::new_test("c", 1);
        let after = vec![before[0].clone(), before[1].clone(), c];

        assert!(detect_overtaken(&before, &after).is_empty());
    }

    #[test]
    fn test_insert_in_middle_only_notifies_members_behind() {
        let before = members(&[("a", 9), ("b", 1), ("c", 1)]);
        let d = Member::new_test("d", 5);
        let after = vec![
            before[0].clone(),
            d,
            before[1].clone(),
            before[2].clone(),
        ];

        assert_eq!(
            detect_overtaken(&before, &after),
            vec![before[1].id, before[2].id]
        );
    }

    #[test]
    fn test_departure_is_not_an_overtake() {
        let before = members(&[("a", 3), ("b", 2), ("c", 1)]);
        let after = vec![before[0].clone(), before[2].clone()];

        assert!(detect_overtaken(&before, &after).is_empty());
    }

    #[test]
    fn test_empty_snapshots() {
        assert!(detect_overtaken(&[], &[]).is_empty());
        let after = members(&[("a", 1)]);
        assert!(detect_overtaken(&[], &after).is_empty());
    }
}
