//! Rollup operator trees.
//!
//! A [`RollupOperator`] is one node of a rollup configuration: an operator
//! plus the operands it reduces. Operands are either leaves, which name a
//! station, a channel or a monitor type, or nested child nodes. The same node
//! type is used at every tier; each tier reads only its own leaf list through
//! a projection.

use soh_types::MonitorType;

use crate::operator::{Operator, OperatorKind};

/// One node of a rollup operator tree.
///
/// # Example
///
/// ```rust
/// use soh_rollup::RollupOperator;
///
/// let tree = RollupOperator::min_good_of(2, 1)
///     .channels(["ASAR.AS01.SHZ", "ASAR.AS02.SHZ"])
///     .child(RollupOperator::best_of().channels(["ASAR.AS31.BHE", "ASAR.AS31.BHN"]));
///
/// assert_eq!(tree.depth(), 2);
/// assert_eq!(tree.leaves(RollupOperator::channel_operands).len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RollupOperator {
    #[serde(flatten)]
    pub operator: Operator,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub station_operands: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_operands: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitor_type_operands: Vec<MonitorType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rollup_operator_operands: Vec<RollupOperator>,
}

impl RollupOperator {
    /// A node with no operands yet.
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            station_operands: Vec::new(),
            channel_operands: Vec::new(),
            monitor_type_operands: Vec::new(),
            rollup_operator_operands: Vec::new(),
        }
    }

    pub fn best_of() -> Self {
        Self::new(Operator::BestOf)
    }

    pub fn worst_of() -> Self {
        Self::new(Operator::WorstOf)
    }

    pub fn min_good_of(good_threshold: u32, marginal_threshold: u32) -> Self {
        Self::new(Operator::MinGoodOf {
            good_threshold,
            marginal_threshold,
        })
    }

    /// Append station leaves.
    pub fn stations<I, S>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.station_operands
            .extend(stations.into_iter().map(Into::into));
        self
    }

    /// Append channel leaves.
    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channel_operands
            .extend(channels.into_iter().map(Into::into));
        self
    }

    /// Append monitor type leaves.
    pub fn monitor_types<I>(mut self, monitor_types: I) -> Self
    where
        I: IntoIterator<Item = MonitorType>,
    {
        self.monitor_type_operands.extend(monitor_types);
        self
    }

    /// Append a nested child node.
    pub fn child(mut self, child: RollupOperator) -> Self {
        self.rollup_operator_operands.push(child);
        self
    }

    pub fn kind(&self) -> OperatorKind {
        self.operator.kind()
    }

    /// Station leaf projection, used by the group tier.
    pub fn station_operands(&self) -> &[String] {
        &self.station_operands
    }

    /// Channel leaf projection, used by the station tier.
    pub fn channel_operands(&self) -> &[String] {
        &self.channel_operands
    }

    /// Monitor type leaf projection, used by the channel tier.
    pub fn monitor_type_operands(&self) -> &[MonitorType] {
        &self.monitor_type_operands
    }

    pub fn children(&self) -> &[RollupOperator] {
        &self.rollup_operator_operands
    }

    /// Collect every leaf of this tree for one tier, depth first.
    ///
    /// A node's own leaves come before those of its children. Duplicates are
    /// kept in the order they appear.
    pub fn leaves<'a, K: 'a, P>(&'a self, projection: P) -> Vec<&'a K>
    where
        P: Fn(&'a RollupOperator) -> &'a [K] + Copy,
    {
        let mut leaves = Vec::new();
        self.collect_leaves(projection, &mut leaves);
        leaves
    }

    fn collect_leaves<'a, K: 'a, P>(&'a self, projection: P, out: &mut Vec<&'a K>)
    where
        P: Fn(&'a RollupOperator) -> &'a [K] + Copy,
    {
        out.extend(projection(self));
        for child in &self.rollup_operator_operands {
            child.collect_leaves(projection, out);
        }
    }

    /// Number of node levels, a single node being depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .rollup_operator_operands
            .iter()
            .map(RollupOperator::depth)
            .max()
            .unwrap_or(0)
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .rollup_operator_operands
            .iter()
            .map(RollupOperator::node_count)
            .sum::<usize>()
    }

    /// Depth-first pre-order walk over every node.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&RollupOperator),
    {
        f(self);
        for child in &self.rollup_operator_operands {
            child.walk(f);
        }
    }
}
