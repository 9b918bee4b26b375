// Draft-order validation: align a submitted ranking with a reference ranking
// and report every index where they disagree.
//
// The comparison is positional, not a name join. Two lists that contain the
// same players in a different order must produce mismatches, since ordering
// drift is what the validator exists to catch. If the lists diverge early,
// every later index mismatches too; callers should read the first mismatch
// as the interesting one.

use serde::Serialize;

use crate::player::PlayerRecord;

/// League size used for depth cutoffs when none is configured.
pub const DEFAULT_NUMBER_OF_TEAMS: usize = 9;

/// One index at which the two rankings disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub index: usize,
    pub candidate: PlayerRecord,
    pub reference: PlayerRecord,
}

/// Result of [`RankComparator::compare`].
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub mismatches: Vec<Mismatch>,
    /// Filtered length of the candidate list.
    pub candidate_len: usize,
    /// Filtered length of the reference list.
    pub reference_len: usize,
}

impl Comparison {
    pub fn lengths_differ(&self) -> bool {
        self.candidate_len != self.reference_len
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankComparator {
    number_of_teams: usize,
}

impl Default for RankComparator {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBER_OF_TEAMS)
    }
}

impl RankComparator {
    pub fn new(number_of_teams: usize) -> Self {
        Self { number_of_teams }
    }

    pub fn number_of_teams(&self) -> usize {
        self.number_of_teams
    }

    /// Deepest position rank still worth ranking at the record's position.
    /// `None` for kickers and defenses, which are never ranked.
    pub fn depth_cutoff(&self, record: &PlayerRecord) -> Option<usize> {
        record
            .position
            .depth_multiplier()
            .map(|m| m * self.number_of_teams)
    }

    /// Whether `record` survives preprocessing.
    pub fn is_relevant(&self, record: &PlayerRecord) -> bool {
        if record.is_blank() {
            return false;
        }
        match self.depth_cutoff(record) {
            Some(cutoff) => record.position_rank <= cutoff,
            None => false,
        }
    }

    /// Drop blank rows, excluded position types, and players ranked deeper
    /// than the position cutoff. Order is preserved.
    pub fn preprocess<'a>(&self, records: &'a [PlayerRecord]) -> Vec<&'a PlayerRecord> {
        records.iter().filter(|r| self.is_relevant(r)).collect()
    }

    /// Compare the two rankings index by index over their common prefix.
    pub fn compare(&self, candidate: &[PlayerRecord], reference: &[PlayerRecord]) -> Comparison {
        let candidate = self.preprocess(candidate);
        let reference = self.preprocess(reference);

        let mismatches = candidate
            .iter()
            .zip(reference.iter())
            .enumerate()
            .filter(|(_, (c, r))| c.name_key() != r.name_key())
            .map(|(index, (c, r))| Mismatch {
                index,
                candidate: (*c).clone(),
                reference: (*r).clone(),
            })
            .collect();

        Comparison {
            mismatches,
            candidate_len: candidate.len(),
            reference_len: reference.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;

    fn wr(name: &str, rank: usize) -> PlayerRecord {
        PlayerRecord::from_name_key(name, Position::WideReceiver, rank)
    }

    #[test]
    fn identical_rankings_have_no_mismatches() {
        let cmp = RankComparator::default();
        let result = cmp.compare(&[wr("john_smith", 1)], &[wr("john_smith", 1)]);
        assert!(result.mismatches.is_empty());
        assert!(!result.lengths_differ());
    }

    #[test]
    fn different_name_is_one_mismatch() {
        let cmp = RankComparator::default();
        let result = cmp.compare(&[wr("john_smith", 1)], &[wr("jon_smyth", 1)]);
        assert_eq!(result.mismatches.len(), 1);
        let m = &result.mismatches[0];
        assert_eq!(m.index, 0);
        assert_eq!(m.candidate.name_key(), "john_smith");
        assert_eq!(m.reference.name_key(), "jon_smyth");
    }

    #[test]
    fn swapped_order_mismatches_both_indices() {
        let cmp = RankComparator::default();
        let candidate = [wr("a_one", 1), wr("b_two", 2), wr("c_three", 3)];
        let reference = [wr("b_two", 1), wr("a_one", 2), wr("c_three", 3)];
        let result = cmp.compare(&candidate, &reference);
        let indices: Vec<usize> = result.mismatches.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn excluded_positions_are_dropped() {
        let cmp = RankComparator::default();
        let records = vec![
            PlayerRecord::new("justin", "tucker", Position::Kicker, 1),
            PlayerRecord::new("buffalo", "bills", Position::Defense, 1),
            PlayerRecord::new("josh", "allen", Position::Quarterback, 1),
        ];
        let kept = cmp.preprocess(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].position, Position::Quarterback);
    }

    #[test]
    fn depth_cutoffs_follow_league_size() {
        let cmp = RankComparator::new(10);
        let records = vec![
            PlayerRecord::new("rb", "fifty", Position::RunningBack, 50),
            PlayerRecord::new("rb", "fiftyone", Position::RunningBack, 51),
            PlayerRecord::new("wr", "fifty", Position::WideReceiver, 50),
            PlayerRecord::new("wr", "fiftyone", Position::WideReceiver, 51),
            PlayerRecord::new("qb", "twenty", Position::Quarterback, 20),
            PlayerRecord::new("qb", "twentyone", Position::Quarterback, 21),
            PlayerRecord::new("te", "twenty", Position::TightEnd, 20),
            PlayerRecord::new("te", "twentyone", Position::TightEnd, 21),
        ];
        let kept: Vec<String> = cmp.preprocess(&records).iter().map(|r| r.name_key()).collect();
        assert_eq!(kept, vec!["rb_fifty", "wr_fifty", "qb_twenty", "te_twenty"]);
    }

    #[test]
    fn preprocessing_leaves_no_out_of_bounds_rows() {
        let cmp = RankComparator::default();
        let mut records = Vec::new();
        for rank in 1..=60 {
            for pos in [
                Position::Quarterback,
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
                Position::Kicker,
                Position::Defense,
            ] {
                records.push(PlayerRecord::new(format!("p{rank}"), pos.display_str(), pos, rank));
            }
        }
        for r in cmp.preprocess(&records) {
            assert!(!r.position.is_excluded());
            match r.position {
                Position::RunningBack | Position::WideReceiver => assert!(r.position_rank <= 45),
                Position::Quarterback | Position::TightEnd => assert!(r.position_rank <= 18),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn blank_rows_are_dropped() {
        let cmp = RankComparator::default();
        let candidate = [PlayerRecord::new("", "", Position::WideReceiver, 1), wr("a_one", 2)];
        let reference = [wr("a_one", 1)];
        let result = cmp.compare(&candidate, &reference);
        assert!(result.mismatches.is_empty());
        assert_eq!(result.candidate_len, 1);
    }

    #[test]
    fn only_common_prefix_is_compared() {
        let cmp = RankComparator::default();
        let candidate = [wr("a_one", 1), wr("b_two", 2), wr("x_extra", 3), wr("y_extra", 4)];
        let reference = [wr("a_one", 1), wr("z_other", 2)];
        let result = cmp.compare(&candidate, &reference);
        assert!(result.lengths_differ());
        assert_eq!(result.mismatches.len(), 1);
        let max_index = candidate.len().min(reference.len()) - 1;
        assert!(result.mismatches.iter().all(|m| m.index <= max_index));
    }

    #[test]
    fn empty_lists_compare_cleanly() {
        let cmp = RankComparator::default();
        let result = cmp.compare(&[], &[wr("a_one", 1)]);
        assert!(result.mismatches.is_empty());
        assert_eq!(result.reference_len, 1);
    }
}
