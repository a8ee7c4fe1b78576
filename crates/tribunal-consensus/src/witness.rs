//! Reliable witness selection

use crate::majority_answers;
use std::collections::BTreeMap;
use tribunal_domain::{TierOneEntry, Witness};

/// Picks the witness used to challenge the consensus
pub struct ReliableWitnessLocator;

impl ReliableWitnessLocator {
    /// Highest reliability wins; ties go to the lexicographically smallest name
    ///
    /// An empty candidate list yields [`Witness::synthetic`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_consensus::ReliableWitnessLocator;
    /// use tribunal_domain::Witness;
    ///
    /// let candidates = vec![
    ///     Witness::new("beta", 0.9).unwrap(),
    ///     Witness::new("alpha", 0.9).unwrap(),
    /// ];
    /// assert_eq!(ReliableWitnessLocator::select(&candidates).name, "alpha");
    /// assert!(ReliableWitnessLocator::select(&[]).is_synthetic());
    /// ```
    pub fn select(candidates: &[Witness]) -> Witness {
        candidates
            .iter()
            .min_by(|a, b| {
                b.reliability
                    .total_cmp(&a.reliability)
                    .then_with(|| a.name.cmp(&b.name))
            })
            .cloned()
            .unwrap_or_else(Witness::synthetic)
    }
}

/// Fraction of the witness's Tier-1 entries that differ from the majority
///
/// A witness without entries (including the synthetic one) never dissents.
pub fn dissent_fraction(witness: &Witness, entries: &BTreeMap<String, Vec<TierOneEntry>>) -> f64 {
    let Some(own) = entries.get(&witness.name).filter(|own| !own.is_empty()) else {
        return 0.0;
    };
    let majority = majority_answers(entries);
    let dissenting = own
        .iter()
        .filter(|entry| majority.get(&entry.claim) != Some(&entry.answer))
        .count();
    dissenting as f64 / own.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_domain::Label;

    fn entry(model: &str, claim: &str, answer: &str) -> TierOneEntry {
        TierOneEntry::new(model, claim, Label::True, 80.0, answer).unwrap()
    }

    #[test]
    fn test_highest_reliability_wins() {
        let candidates = vec![
            Witness::new("alpha", 0.5).unwrap(),
            Witness::new("zeta", 0.95).unwrap(),
            Witness::new("beta", 0.9).unwrap(),
        ];
        assert_eq!(ReliableWitnessLocator::select(&candidates).name, "zeta");
    }

    #[test]
    fn test_tie_broken_by_name_regardless_of_order() {
        let forward = vec![
            Witness::new("alpha", 1.0).unwrap(),
            Witness::new("beta", 1.0).unwrap(),
        ];
        let reversed: Vec<Witness> = forward.iter().rev().cloned().collect();
        assert_eq!(ReliableWitnessLocator::select(&forward).name, "alpha");
        assert_eq!(ReliableWitnessLocator::select(&reversed).name, "alpha");
    }

    #[test]
    fn test_empty_candidates_yield_synthetic() {
        let witness = ReliableWitnessLocator::select(&[]);
        assert_eq!(witness, Witness::synthetic());
        assert_eq!(witness.reliability, 1.0);
    }

    #[test]
    fn test_dissent_fraction() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "alpha".to_string(),
            vec![entry("alpha", "c1", "yes"), entry("alpha", "c2", "yes")],
        );
        entries.insert(
            "beta".to_string(),
            vec![entry("beta", "c1", "yes"), entry("beta", "c2", "yes")],
        );
        entries.insert(
            "gamma".to_string(),
            vec![entry("gamma", "c1", "yes"), entry("gamma", "c2", "no")],
        );

        let gamma = Witness::new("gamma", 0.8).unwrap();
        assert_eq!(dissent_fraction(&gamma, &entries), 0.5);

        let alpha = Witness::new("alpha", 0.8).unwrap();
        assert_eq!(dissent_fraction(&alpha, &entries), 0.0);

        assert_eq!(dissent_fraction(&Witness::synthetic(), &entries), 0.0);
    }
}
