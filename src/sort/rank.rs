//! Rank assignment for a fully sorted sequence.

use crate::record::{RankedRecord, Record};

/// Attach 1-based ranks in sequence order.
pub fn assign_ranks(sorted: Vec<Record>) -> Vec<RankedRecord> {
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, record)| RankedRecord {
            rank: idx + 1,
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Attribute;

    #[test]
    fn ranks_are_contiguous_from_one() {
        let records: Vec<Record> = ["c", "a", "b", "a"]
            .iter()
            .map(|s| Record::subject_only("item", *s))
            .collect();
        let ranked = assign_ranks(records);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_input_yields_no_ranks() {
        assert!(assign_ranks(Vec::new()).is_empty());
    }

    #[test]
    fn attributes_are_carried_unchanged() {
        let record = Record::new(
            Attribute::new("Movie Title", "Sorcerer's Stone"),
            vec![
                Attribute::new("Release Year", 2001),
                Attribute::new("Box Office Earnings", "$1.024 billion"),
            ],
        );
        let ranked = assign_ranks(vec![record.clone()]);
        assert_eq!(ranked[0].record, record);
    }
}
