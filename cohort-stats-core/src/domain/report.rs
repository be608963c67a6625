use serde::{Deserialize, Serialize};

use super::config::CorrectionStrategy;
use super::value::{IndexKey, Value};

/// Decimal places kept for statistics and p-values
pub const RESULT_DECIMALS: i32 = 3;

/// Round to [`RESULT_DECIMALS`] places.
///
/// Rounds the exact binary value through its decimal form, so `1.0005`
/// (stored just below the midpoint) goes down and exact midpoints such as
/// `0.0625` go to the even digit.
pub fn round_result(value: f64) -> f64 {
    format!("{:.*}", RESULT_DECIMALS as usize, value)
        .parse()
        .unwrap_or(value)
}

// ===== Procedures =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Procedure {
    ShapiroWilk,
    KolmogorovSmirnov,
    Levene,
    StudentT,
    WelchT,
    MannWhitneyU,
}

impl Procedure {
    pub fn name(&self) -> &'static str {
        match self {
            Procedure::ShapiroWilk => "Shapiro-Wilk",
            Procedure::KolmogorovSmirnov => "Kolmogorov-Smirnov",
            Procedure::Levene => "Levene",
            Procedure::StudentT => "Student t",
            Procedure::WelchT => "Welch t",
            Procedure::MannWhitneyU => "Mann-Whitney U",
        }
    }
}

// ===== Test Result =====

/// Outcome of a single driver call, rounded to three decimals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub procedure: Procedure,
}

impl TestResult {
    pub fn rounded(statistic: f64, p_value: f64, procedure: Procedure) -> Self {
        Self {
            statistic: round_result(statistic),
            p_value: round_result(p_value),
            procedure,
        }
    }
}

// ===== Report =====

/// Row label: the tested time value, or the ordered pair whose null
/// hypothesis "location(first) <= location(second)" was tested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Label {
    Simple(Value),
    Pairwise { first: IndexKey, second: IndexKey },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Normality,
    VarianceHomogeneity,
    TTest,
    MannWhitney,
}

impl ReportKind {
    pub fn statistic_column(&self) -> &'static str {
        match self {
            ReportKind::Normality => "D value",
            ReportKind::VarianceHomogeneity => "W value",
            ReportKind::TTest => "T value",
            ReportKind::MannWhitney => "U value",
        }
    }

    pub fn p_value_column(&self) -> &'static str {
        if self.is_pairwise() {
            "p value (one-sided)"
        } else {
            "p value"
        }
    }

    pub fn is_pairwise(&self) -> bool {
        matches!(self, ReportKind::TTest | ReportKind::MannWhitney)
    }
}

pub const HYPOTHESIS_COLUMN: &str = "H0";
pub const REJECT_COLUMN: &str = "Reject H0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    pub label: Label,
    pub statistic: f64,
    pub p_value: f64,
    pub procedure: Procedure,
    pub reject: bool,
}

/// Ordered rows of one hypothesis batch, all corrected with the same
/// denominator `n_hypotheses`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    /// Numeric column the batch tested
    pub feature: String,
    /// Header of the label column: the time column, or `H0` for pairwise reports
    pub label_column: String,
    pub alpha: f64,
    pub correction: CorrectionStrategy,
    pub n_hypotheses: usize,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers in display order
    pub fn headers(&self) -> [&str; 4] {
        [
            self.label_column.as_str(),
            self.kind.statistic_column(),
            self.kind.p_value_column(),
            REJECT_COLUMN,
        ]
    }

    pub fn rejected(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|row| row.reject)
    }
}
