//! Tagged-rule evaluator
//!
//! A [`RuleSet`] is an ordered list of `(conditions, label)` pairs. Every
//! pixel starts as background; each rule whose conditions all hold writes
//! its label, so when several rules match the **last** one wins. Rule order
//! is therefore part of the classifier's contract.

use crate::maybe_rayon::fill_rows;
use landclass_core::{Classification, Error, IndexKind, IndexSet, Raster, Result};
use serde::{Deserialize, Serialize};

/// A test on one index value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value > threshold`
    Gt(f64),
    /// `value < threshold`
    Lt(f64),
    /// `min <(=) value <(=) max`
    Between {
        min: f64,
        max: f64,
        min_inclusive: bool,
        max_inclusive: bool,
    },
}

impl Comparison {
    /// Closed interval `[min, max]`
    pub fn inclusive(min: f64, max: f64) -> Self {
        Comparison::Between {
            min,
            max,
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    /// Open interval `(min, max)`
    pub fn exclusive(min: f64, max: f64) -> Self {
        Comparison::Between {
            min,
            max,
            min_inclusive: false,
            max_inclusive: false,
        }
    }

    /// Half-open interval `(min, max]`
    pub fn above_up_to(min: f64, max: f64) -> Self {
        Comparison::Between {
            min,
            max,
            min_inclusive: false,
            max_inclusive: true,
        }
    }

    /// NaN never passes.
    pub fn test(&self, value: f64) -> bool {
        match *self {
            Comparison::Gt(t) => value > t,
            Comparison::Lt(t) => value < t,
            Comparison::Between {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                let lower = if min_inclusive { value >= min } else { value > min };
                let upper = if max_inclusive { value <= max } else { value < max };
                lower && upper
            }
        }
    }

    /// Same comparison with thresholds rounded to single precision.
    fn to_single(self) -> Self {
        let r = |t: f64| f64::from(t as f32);
        match self {
            Comparison::Gt(t) => Comparison::Gt(r(t)),
            Comparison::Lt(t) => Comparison::Lt(r(t)),
            Comparison::Between {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => Comparison::Between {
                min: r(min),
                max: r(max),
                min_inclusive,
                max_inclusive,
            },
        }
    }
}

/// One index test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub index: IndexKind,
    pub test: Comparison,
}

impl Condition {
    pub fn new(index: IndexKind, test: Comparison) -> Self {
        Self { index, test }
    }
}

/// Conjunction of conditions that assigns `label` when all hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub label: u8,
    pub conditions: Vec<Condition>,
}

impl Rule {
    pub fn new(label: u8) -> Self {
        Self {
            label,
            conditions: Vec::new(),
        }
    }

    /// Builder: add one condition.
    pub fn when(mut self, index: IndexKind, test: Comparison) -> Self {
        self.conditions.push(Condition::new(index, test));
        self
    }
}

/// Index precision the thresholds are compared at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Thresholds are used as given
    #[default]
    Double,
    /// Thresholds are rounded to `f32` first, for indices computed in
    /// single precision
    Single,
}

/// Ordered rules evaluated with "last match wins".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
    #[serde(default)]
    precision: Precision,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            precision: Precision::Double,
        }
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Rules in application order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn effective(&self, test: Comparison) -> Comparison {
        match self.precision {
            Precision::Double => test,
            Precision::Single => test.to_single(),
        }
    }

    /// Every index some rule reads, without duplicates
    pub fn required_indices(&self) -> Vec<IndexKind> {
        let mut kinds: Vec<IndexKind> = self
            .rules
            .iter()
            .flat_map(|r| r.conditions.iter().map(|c| c.index))
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Label one pixel given a lookup for its index values.
    ///
    /// Returns 0 (background) when no rule matches.
    pub fn label_for<F: Fn(IndexKind) -> f64>(&self, value_of: F) -> u8 {
        let mut label = 0;
        for rule in &self.rules {
            if rule
                .conditions
                .iter()
                .all(|c| self.effective(c.test).test(value_of(c.index)))
            {
                label = rule.label;
            }
        }
        label
    }

    /// Label every pixel of `indices`.
    ///
    /// Fails when a required index is missing or the set carries no shape.
    pub fn evaluate(&self, indices: &IndexSet) -> Result<Classification> {
        let (rows, cols) = indices
            .shape()
            .ok_or(Error::EmptyInput("index set has no shape"))?;

        let kinds = self.required_indices();
        let mut views = Vec::with_capacity(kinds.len());
        for kind in &kinds {
            views.push(indices.require(*kind)?.data());
        }

        // Flatten rules to (label, [(slot, comparison)]) with slots into `views`.
        let compiled: Vec<(u8, Vec<(usize, Comparison)>)> = self
            .rules
            .iter()
            .map(|rule| {
                let tests = rule
                    .conditions
                    .iter()
                    .map(|c| {
                        let slot = kinds.iter().position(|k| *k == c.index).unwrap_or(0);
                        (slot, self.effective(c.test))
                    })
                    .collect();
                (rule.label, tests)
            })
            .collect();

        let data = fill_rows(rows, cols, 0u8, |row, out| {
            for (col, cell) in out.iter_mut().enumerate() {
                for (label, tests) in &compiled {
                    if tests
                        .iter()
                        .all(|(slot, test)| test.test(views[*slot][[row, col]]))
                    {
                        *cell = *label;
                    }
                }
            }
        });

        Raster::from_vec(data, rows, cols)
    }
}
