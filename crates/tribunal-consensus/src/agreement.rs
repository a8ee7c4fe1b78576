//! Agreement across the Tier-1 ensemble

use std::collections::BTreeMap;
use tribunal_domain::TierOneEntry;

/// How many responders side with the per-claim majority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agreement {
    /// Responders whose every answer matches the majority
    pub agreement_count: usize,
    /// Responders with at least one entry
    pub total_responses: usize,
    /// Agreeing responders, sorted
    pub contributing_models: Vec<String>,
}

impl Agreement {
    /// Measure agreement over a model → entries mapping
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use tribunal_consensus::Agreement;
    /// use tribunal_domain::{Label, TierOneEntry};
    ///
    /// let mut entries = BTreeMap::new();
    /// for (model, answer) in [("alpha", "yes"), ("beta", "yes"), ("gamma", "no")] {
    ///     let entry = TierOneEntry::new(model, "claim", Label::True, 90.0, answer).unwrap();
    ///     entries.insert(model.to_string(), vec![entry]);
    /// }
    ///
    /// let agreement = Agreement::measure(&entries);
    /// assert_eq!(agreement.agreement_count, 2);
    /// assert_eq!(agreement.contributing_models, vec!["alpha", "beta"]);
    /// ```
    pub fn measure(entries: &BTreeMap<String, Vec<TierOneEntry>>) -> Self {
        let majority = majority_answers(entries);
        let total_responses = entries.values().filter(|e| !e.is_empty()).count();

        let contributing_models: Vec<String> = entries
            .iter()
            .filter(|(_, own)| !own.is_empty())
            .filter(|(_, own)| {
                own.iter()
                    .all(|entry| majority.get(&entry.claim) == Some(&entry.answer))
            })
            .map(|(model, _)| model.clone())
            .collect();

        Self {
            agreement_count: contributing_models.len(),
            total_responses,
            contributing_models,
        }
    }

    /// agreement_count / total_responses (0 when nobody answered)
    pub fn ratio(&self) -> f64 {
        if self.total_responses == 0 {
            0.0
        } else {
            self.agreement_count as f64 / self.total_responses as f64
        }
    }
}

/// Most common answer per claim; ties go to the smallest answer
pub fn majority_answers(entries: &BTreeMap<String, Vec<TierOneEntry>>) -> BTreeMap<String, String> {
    let mut tallies: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for entry in entries.values().flatten() {
        *tallies
            .entry(entry.claim.as_str())
            .or_default()
            .entry(entry.answer.as_str())
            .or_default() += 1;
    }

    tallies
        .into_iter()
        .filter_map(|(claim, counts)| {
            // Highest count; among equal counts the smaller answer ranks higher
            counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(answer, _)| (claim.to_string(), answer.to_string()))
        })
        .collect()
}
