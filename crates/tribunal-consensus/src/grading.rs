//! Table-driven grading

use crate::ConsensusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tribunal_domain::Grade;

/// One row of the grade table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRow {
    /// Minimum agreement ratio for this row
    pub min_agreement: f64,
    /// Whether Tier-3 verification is also required
    #[serde(default)]
    pub requires_tier3: bool,
    /// Grade awarded
    pub grade: Grade,
}

impl GradeRow {
    const fn new(min_agreement: f64, requires_tier3: bool, grade: Grade) -> Self {
        Self {
            min_agreement,
            requires_tier3,
            grade,
        }
    }
}

/// Ordered grade rows; the first matching row wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeTable {
    rows: Vec<GradeRow>,
}

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            rows: vec![
                GradeRow::new(1.0, true, Grade::APlus),
                GradeRow::new(1.0, false, Grade::A),
                GradeRow::new(0.78, true, Grade::BPlus),
                GradeRow::new(0.66, false, Grade::B),
                GradeRow::new(0.5, false, Grade::C),
                GradeRow::new(0.33, false, Grade::D),
                GradeRow::new(0.0, false, Grade::F),
            ],
        }
    }
}

impl GradeTable {
    /// Build a table from rows, validating it
    pub fn new(rows: Vec<GradeRow>) -> Result<Self, ConsensusError> {
        let table = Self { rows };
        table.validate()?;
        Ok(table)
    }

    /// Rows in evaluation order
    pub fn rows(&self) -> &[GradeRow] {
        &self.rows
    }

    /// Grade for an agreement ratio
    ///
    /// Falls back to `F` if no row matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_consensus::GradeTable;
    /// use tribunal_domain::Grade;
    ///
    /// let table = GradeTable::default();
    /// assert_eq!(table.grade(1.0, true), Grade::APlus);
    /// assert_eq!(table.grade(1.0, false), Grade::A);
    /// assert_eq!(table.grade(0.8, true), Grade::BPlus);
    /// assert_eq!(table.grade(0.8, false), Grade::B);
    /// ```
    pub fn grade(&self, agreement_ratio: f64, tier3_verified: bool) -> Grade {
        self.rows
            .iter()
            .find(|row| {
                agreement_ratio >= row.min_agreement && (tier3_verified || !row.requires_tier3)
            })
            .map(|row| row.grade)
            .unwrap_or(Grade::F)
    }

    /// Check that thresholds and grades never increase down the table
    ///
    /// This keeps grades monotone in agreement ratio.
    pub fn validate(&self) -> Result<(), ConsensusError> {
        if self.rows.is_empty() {
            return Err(ConsensusError::InvalidGradeTable("no rows".to_string()));
        }
        for row in &self.rows {
            if !(0.0..=1.0).contains(&row.min_agreement) {
                return Err(ConsensusError::InvalidGradeTable(format!(
                    "min_agreement {} outside [0, 1]",
                    row.min_agreement
                )));
            }
        }
        for pair in self.rows.windows(2) {
            if pair[1].min_agreement > pair[0].min_agreement || pair[1].grade > pair[0].grade {
                return Err(ConsensusError::InvalidGradeTable(format!(
                    "row {} ({}) ranks above the row before it",
                    pair[1].grade, pair[1].min_agreement
                )));
            }
        }
        Ok(())
    }
}

/// Qualitative reading of a consensus score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    /// Below the low cut-off
    Critical,
    /// At least the low cut-off
    Low,
    /// At least the medium cut-off
    Medium,
    /// At least the high cut-off
    High,
}

impl Bucket {
    /// Highest grade allowed in this bucket, if capped
    pub fn cap(&self) -> Option<Grade> {
        match self {
            Bucket::Critical => Some(Grade::D),
            Bucket::Low => Some(Grade::C),
            Bucket::Medium | Bucket::High => None,
        }
    }

    /// Apply the cap to a grade
    pub fn limit(&self, grade: Grade) -> Grade {
        self.cap().map_or(grade, |cap| grade.min(cap))
    }

    /// Get the bucket name
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::High => "HIGH",
            Bucket::Medium => "MEDIUM",
            Bucket::Low => "LOW",
            Bucket::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cut-offs for the buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketCutoffs {
    /// Minimum score for HIGH
    pub high: f64,
    /// Minimum score for MEDIUM
    pub medium: f64,
    /// Minimum score for LOW
    pub low: f64,
}

impl Default for BucketCutoffs {
    fn default() -> Self {
        Self {
            high: 80.0,
            medium: 60.0,
            low: 40.0,
        }
    }
}

impl BucketCutoffs {
    /// Bucket for a score
    pub fn bucket(&self, score: f64) -> Bucket {
        if score >= self.high {
            Bucket::High
        } else if score >= self.medium {
            Bucket::Medium
        } else if score >= self.low {
            Bucket::Low
        } else {
            Bucket::Critical
        }
    }

    /// Validate the cut-offs are ordered
    pub fn validate(&self) -> Result<(), ConsensusError> {
        if !(self.high >= self.medium && self.medium >= self.low && self.low >= 0.0) {
            return Err(ConsensusError::Config(
                "bucket cut-offs must satisfy high >= medium >= low >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_rows() {
        let table = GradeTable::default();
        assert!(table.validate().is_ok());

        let cases = [
            (1.0, true, Grade::APlus),
            (1.0, false, Grade::A),
            (0.78, true, Grade::BPlus),
            (0.77, true, Grade::B),
            (0.66, false, Grade::B),
            (0.5, false, Grade::C),
            (0.33, false, Grade::D),
            (0.1, true, Grade::F),
            (0.0, false, Grade::F),
        ];
        for (ratio, tier3, expected) in cases {
            assert_eq!(table.grade(ratio, tier3), expected, "ratio {ratio}, tier3 {tier3}");
        }
    }

    #[test]
    fn test_unordered_table_rejected() {
        let rows = vec![
            GradeRow::new(0.5, false, Grade::C),
            GradeRow::new(0.9, false, Grade::A),
        ];
        assert!(GradeTable::new(rows).is_err());
        assert!(GradeTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_table_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            table: GradeTable,
        }

        let wrapper: Wrapper = toml::from_str(
            r#"
            table = [
                { min_agreement = 1.0, grade = "A+" },
                { min_agreement = 0.0, grade = "F" },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(wrapper.table.grade(1.0, false), Grade::APlus);
        assert_eq!(wrapper.table.grade(0.99, false), Grade::F);
    }

    #[test]
    fn test_buckets_and_caps() {
        let cutoffs = BucketCutoffs::default();
        assert_eq!(cutoffs.bucket(80.0), Bucket::High);
        assert_eq!(cutoffs.bucket(79.9), Bucket::Medium);
        assert_eq!(cutoffs.bucket(40.0), Bucket::Low);
        assert_eq!(cutoffs.bucket(39.9), Bucket::Critical);

        assert_eq!(Bucket::Low.limit(Grade::A), Grade::C);
        assert_eq!(Bucket::Low.limit(Grade::D), Grade::D);
        assert_eq!(Bucket::Critical.limit(Grade::B), Grade::D);
        assert_eq!(Bucket::High.limit(Grade::APlus), Grade::APlus);
    }

    #[test]
    fn test_bucket_cutoffs_validation() {
        assert!(BucketCutoffs::default().validate().is_ok());
        let bad = BucketCutoffs {
            high: 50.0,
            medium: 60.0,
            low: 40.0,
        };
        assert!(bad.validate().is_err());
    }
}
