//! Operator algebra - reducing a list of statuses to one status.
//!
//! Every operator is a pure function of its parameters and the statuses it
//! is given, and none of them depend on input order. BEST_OF and WORST_OF may
//! be regrouped freely under repeated application of the same kind. MIN_GOOD_OF
//! only counts GOOD inputs and does not regroup, so the evaluator never
//! flattens or simplifies a tree across nodes.

use core::fmt;
use core::str::FromStr;

use soh_types::Status;

use crate::error::RollupError;

/// The kind of a rollup operator, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorKind {
    BestOf,
    WorstOf,
    MinGoodOf,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 3] = [
        OperatorKind::BestOf,
        OperatorKind::WorstOf,
        OperatorKind::MinGoodOf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::BestOf => "BEST_OF",
            OperatorKind::WorstOf => "WORST_OF",
            OperatorKind::MinGoodOf => "MIN_GOOD_OF",
        }
    }

    /// Number of parameters the kind takes.
    pub fn arity(&self) -> usize {
        match self {
            OperatorKind::BestOf | OperatorKind::WorstOf => 0,
            OperatorKind::MinGoodOf => 2,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorKind {
    type Err = RollupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RollupError::UnknownOperatorKind(s.to_string()))
    }
}

/// A rollup operator with its parameters bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "operator_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// The best input status wins.
    BestOf,

    /// The worst input status wins.
    WorstOf,

    /// GOOD when at least `good_threshold` inputs are GOOD, MARGINAL when at
    /// least `marginal_threshold` are, BAD otherwise.
    MinGoodOf {
        good_threshold: u32,
        marginal_threshold: u32,
    },
}

impl Operator {
    /// Bind a kind to its parameter list.
    ///
    /// BEST_OF and WORST_OF take no parameters; MIN_GOOD_OF takes exactly two
    /// non-negative integers, the good threshold first.
    pub fn bind(kind: OperatorKind, parameters: &[i64]) -> Result<Self, RollupError> {
        if parameters.len() != kind.arity() {
            return Err(RollupError::ParameterCount {
                kind,
                expected: kind.arity(),
                found: parameters.len(),
            });
        }

        match kind {
            OperatorKind::BestOf => Ok(Operator::BestOf),
            OperatorKind::WorstOf => Ok(Operator::WorstOf),
            OperatorKind::MinGoodOf => {
                let threshold = |value: i64| {
                    u32::try_from(value)
                        .map_err(|_| RollupError::NegativeParameter { kind, value })
                };
                Ok(Operator::MinGoodOf {
                    good_threshold: threshold(parameters[0])?,
                    marginal_threshold: threshold(parameters[1])?,
                })
            }
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::BestOf => OperatorKind::BestOf,
            Operator::WorstOf => OperatorKind::WorstOf,
            Operator::MinGoodOf { .. } => OperatorKind::MinGoodOf,
        }
    }

    /// The parameter list this operator was bound with.
    pub fn parameters(&self) -> Vec<u32> {
        match self {
            Operator::BestOf | Operator::WorstOf => Vec::new(),
            Operator::MinGoodOf {
                good_threshold,
                marginal_threshold,
            } => vec![*good_threshold, *marginal_threshold],
        }
    }

    /// Reduce a list of statuses to one.
    ///
    /// An empty list has no meaningful rollup and is reported as
    /// [`RollupError::EmptyOperands`].
    pub fn apply(&self, statuses: &[Status]) -> Result<Status, RollupError> {
        if statuses.is_empty() {
            return Err(RollupError::EmptyOperands { kind: self.kind() });
        }

        let status = match self {
            Operator::BestOf => statuses.iter().copied().fold(Status::Bad, Status::best),
            Operator::WorstOf => statuses.iter().copied().fold(Status::Good, Status::worst),
            Operator::MinGoodOf {
                good_threshold,
                marginal_threshold,
            } => {
                let good = statuses.iter().filter(|s| s.is_good()).count();
                if good >= *good_threshold as usize {
                    Status::Good
                } else if good >= *marginal_threshold as usize {
                    Status::Marginal
                } else {
                    Status::Bad
                }
            }
        };

        Ok(status)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::MinGoodOf {
                good_threshold,
                marginal_threshold,
            } => write!(f, "MIN_GOOD_OF({}, {})", good_threshold, marginal_threshold),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Status::{Bad, Good, Marginal};

    /// Every list of length 1..=4 over the three statuses.
    fn all_lists() -> Vec<Vec<Status>> {
        let mut lists: Vec<Vec<Status>> = vec![Vec::new()];
        let mut out = Vec::new();
        for _ in 0..4 {
            lists = lists
                .into_iter()
                .flat_map(|l| {
                    Status::ALL.into_iter().map(move |s| {
                        let mut next = l.clone();
                        next.push(s);
                        next
                    })
                })
                .collect();
            out.extend(lists.iter().cloned());
        }
        out
    }

    fn min_good_of(good: u32, marginal: u32) -> Operator {
        Operator::MinGoodOf {
            good_threshold: good,
            marginal_threshold: marginal,
        }
    }

    #[test]
    fn best_of_is_max_and_worst_of_is_min() {
        for list in all_lists() {
            let max = *list.iter().max().unwrap();
            let min = *list.iter().min().unwrap();
            assert_eq!(Operator::BestOf.apply(&list).unwrap(), max, "{:?}", list);
            assert_eq!(Operator::WorstOf.apply(&list).unwrap(), min, "{:?}", list);
        }
    }

    #[test]
    fn min_good_of_thresholds() {
        let op = min_good_of(2, 1);
        assert_eq!(op.apply(&[Good, Marginal, Bad, Good]).unwrap(), Good);
        assert_eq!(op.apply(&[Bad, Marginal, Bad, Good]).unwrap(), Marginal);
        assert_eq!(op.apply(&[Bad, Marginal, Bad, Marginal]).unwrap(), Bad);
    }

    #[test]
    fn min_good_of_with_zero_marginal_threshold_never_goes_bad() {
        let op = min_good_of(2, 0);
        assert_eq!(op.apply(&[Bad, Bad]).unwrap(), Marginal);
        assert_eq!(op.apply(&[Good, Good]).unwrap(), Good);
    }

    #[test]
    fn min_good_of_only_counts_good() {
        let op = min_good_of(3, 2);
        for list in all_lists() {
            let good = list.iter().filter(|s| **s == Good).count();
            // Replacing every non-GOOD entry with BAD must not change the result.
            let flattened: Vec<Status> = list
                .iter()
                .map(|s| if *s == Good { Good } else { Bad })
                .collect();
            let expected = if good >= 3 {
                Good
            } else if good >= 2 {
                Marginal
            } else {
                Bad
            };
            assert_eq!(op.apply(&list).unwrap(), expected);
            assert_eq!(op.apply(&flattened).unwrap(), expected);
        }
    }

    #[test]
    fn operators_ignore_input_order() {
        for op in [Operator::BestOf, Operator::WorstOf, min_good_of(2, 1)] {
            for list in all_lists() {
                let mut reversed = list.clone();
                reversed.reverse();
                let mut sorted = list.clone();
                sorted.sort();
                let result = op.apply(&list).unwrap();
                assert_eq!(op.apply(&reversed).unwrap(), result);
                assert_eq!(op.apply(&sorted).unwrap(), result);
            }
        }
    }

    #[test]
    fn extremum_operators_regroup_freely() {
        for op in [Operator::BestOf, Operator::WorstOf] {
            for list in all_lists().into_iter().filter(|l| l.len() >= 2) {
                let (left, right) = list.split_at(1);
                let nested = [
                    op.apply(left).unwrap(),
                    op.apply(right).unwrap(),
                ];
                assert_eq!(op.apply(&nested).unwrap(), op.apply(&list).unwrap());
            }
        }
    }

    #[test]
    fn min_good_of_does_not_regroup() {
        let op = min_good_of(2, 1);
        let flat = op.apply(&[Good, Good, Bad, Bad]).unwrap();
        let nested = op
            .apply(&[
                op.apply(&[Good, Bad]).unwrap(),
                op.apply(&[Good, Bad]).unwrap(),
            ])
            .unwrap();

        assert_eq!(flat, Good);
        assert_eq!(nested, Bad);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(
            Operator::BestOf.apply(&[]),
            Err(RollupError::EmptyOperands {
                kind: OperatorKind::BestOf
            })
        );
        assert!(min_good_of(0, 0).apply(&[]).is_err());
    }

    #[test]
    fn bind_checks_parameters() {
        assert_eq!(Operator::bind(OperatorKind::BestOf, &[]), Ok(Operator::BestOf));
        assert_eq!(
            Operator::bind(OperatorKind::MinGoodOf, &[2, 1]),
            Ok(min_good_of(2, 1))
        );
        assert_eq!(
            Operator::bind(OperatorKind::MinGoodOf, &[2]),
            Err(RollupError::ParameterCount {
                kind: OperatorKind::MinGoodOf,
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            Operator::bind(OperatorKind::WorstOf, &[1]),
            Err(RollupError::ParameterCount {
                kind: OperatorKind::WorstOf,
                expected: 0,
                found: 1,
            })
        );
        assert_eq!(
            Operator::bind(OperatorKind::MinGoodOf, &[2, -1]),
            Err(RollupError::NegativeParameter {
                kind: OperatorKind::MinGoodOf,
                value: -1,
            })
        );
    }

    #[test]
    fn kind_names_parse() {
        for kind in OperatorKind::ALL {
            assert_eq!(kind.as_str().parse::<OperatorKind>(), Ok(kind));
        }
        assert_eq!(
            "AVERAGE_OF".parse::<OperatorKind>(),
            Err(RollupError::UnknownOperatorKind("AVERAGE_OF".to_string()))
        );
    }

    #[test]
    fn parameters_round_trip_through_bind() {
        let op = min_good_of(3, 1);
        let params: Vec<i64> = op.parameters().into_iter().map(i64::from).collect();
        assert_eq!(Operator::bind(op.kind(), &params), Ok(op));
        assert!(Operator::WorstOf.parameters().is_empty());
        assert_eq!(op.to_string(), "MIN_GOOD_OF(3, 1)");
    }
}
