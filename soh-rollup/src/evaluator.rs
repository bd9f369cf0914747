//! Generic recursive evaluation of rollup operator trees.
//!
//! The evaluator is shared by all three tiers. A tier supplies a projection
//! choosing which leaf list of each node it reads, and a resolver turning one
//! of those leaves into a status. The evaluator has no missing-data policy of
//! its own; whatever the resolver answers for an unknown key is used as is.

use core::marker::PhantomData;

use soh_types::Status;

use crate::error::RollupError;
use crate::tree::RollupOperator;

/// Evaluates one operator tree for one tier.
///
/// # Example
///
/// ```rust
/// use soh_rollup::{RollupEvaluator, RollupOperator};
/// use soh_types::Status;
///
/// let tree = RollupOperator::worst_of()
///     .stations(["ASAR"])
///     .child(RollupOperator::best_of().stations(["PDAR", "TXAR"]));
///
/// let status = RollupEvaluator::new(&tree, RollupOperator::station_operands, |name: &String| {
///     match name.as_str() {
///         "ASAR" => Status::Good,
///         "PDAR" => Status::Bad,
///         _ => Status::Marginal,
///     }
/// })
/// .evaluate()
/// .unwrap();
///
/// assert_eq!(status, Status::Marginal);
/// ```
pub struct RollupEvaluator<'a, K, P, R> {
    root: &'a RollupOperator,
    projection: P,
    resolver: R,
    _key: PhantomData<fn(&K)>,
}

impl<'a, K: 'a, P, R> RollupEvaluator<'a, K, P, R>
where
    P: Fn(&'a RollupOperator) -> &'a [K],
    R: Fn(&K) -> Status,
{
    pub fn new(root: &'a RollupOperator, projection: P, resolver: R) -> Self {
        Self {
            root,
            projection,
            resolver,
            _key: PhantomData,
        }
    }

    /// Evaluate the whole tree.
    ///
    /// Children are evaluated first, then the node's own leaves are resolved,
    /// and the node's operator is applied to the combined list. The only
    /// failure is a node left with nothing to reduce.
    pub fn evaluate(&self) -> Result<Status, RollupError> {
        self.evaluate_node(self.root)
    }

    fn evaluate_node(&self, node: &'a RollupOperator) -> Result<Status, RollupError> {
        let leaves = (self.projection)(node);
        let children = node.children();

        let mut statuses = Vec::with_capacity(children.len() + leaves.len());
        for child in children {
            statuses.push(self.evaluate_node(child)?);
        }
        statuses.extend(leaves.iter().map(|leaf| (self.resolver)(leaf)));

        node.operator.apply(&statuses)
    }
}

/// Evaluate a tree in one call.
pub fn evaluate<'a, K: 'a, P, R>(
    root: &'a RollupOperator,
    projection: P,
    resolver: R,
) -> Result<Status, RollupError>
where
    P: Fn(&'a RollupOperator) -> &'a [K],
    R: Fn(&K) -> Status,
{
    RollupEvaluator::new(root, projection, resolver).evaluate()
}

/// Check that every node of a tree has something to reduce for one tier.
///
/// This is the structural half of [`RollupEvaluator::evaluate`]: it reports
/// the first node with neither leaves nor children without resolving
/// anything.
pub fn validate_tree<'a, K: 'a, P>(root: &'a RollupOperator, projection: P) -> Result<(), RollupError>
where
    P: Fn(&'a RollupOperator) -> &'a [K] + Copy,
{
    if projection(root).is_empty() && root.children().is_empty() {
        return Err(RollupError::EmptyOperands { kind: root.kind() });
    }
    root.children()
        .iter()
        .try_for_each(|child| validate_tree(child, projection))
}
