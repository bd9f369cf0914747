//! Resolution of operator configs into rollup operator trees.

use std::collections::{HashMap, HashSet};

use soh_rollup::{Operator, OperatorKind, RollupOperator};
use soh_types::MonitorType;

use crate::error::{ConfigError, Result};
use crate::file::{NamedOperator, OperatorConfig};
use crate::tier::Tier;

/// Resolves operator configs for one tier at a time.
///
/// Named operators are shared across tiers: the same entry can roll up
/// stations in one place and channels in another, since its terminal leaves
/// are filled in for whichever tier references it.
#[derive(Debug)]
pub struct OperatorResolver<'f> {
    named: HashMap<&'f str, &'f OperatorConfig>,
}

impl<'f> OperatorResolver<'f> {
    pub fn new(operators: &'f [NamedOperator]) -> Result<Self> {
        let mut named = HashMap::new();
        for op in operators {
            if named.insert(op.name.as_str(), &op.rollup).is_some() {
                return Err(ConfigError::DuplicateName {
                    kind: "operator",
                    name: op.name.clone(),
                });
            }
        }

        let resolver = Self { named };
        let mut verified = HashSet::new();
        for op in operators {
            if verified.contains(op.name.as_str()) {
                continue;
            }
            resolver
                .check_references(&op.rollup, &mut vec![op.name.as_str()], &mut verified)
                .map_err(|e| e.at(format!("operators[{}]", op.name)))?;
            verified.insert(op.name.as_str());
        }
        Ok(resolver)
    }

    /// Resolve one operator config for a tier.
    ///
    /// Terminal operators without leaves for the tier get `default_leaves`
    /// (or every monitor type at the channel tier).
    pub fn resolve(
        &self,
        config: &OperatorConfig,
        tier: Tier,
        default_leaves: &[String],
    ) -> Result<RollupOperator> {
        if let Some(name) = &config.reference {
            if config.has_operator_fields() {
                return Err(ConfigError::ReferenceWithFields(name.clone()));
            }
            let target = self.lookup(name)?;
            return self.resolve(target, tier, default_leaves);
        }

        let operator = bind_operator(config)?;

        if let Some(children) = config.rollup_operator_operands.as_ref().filter(|c| !c.is_empty()) {
            if let Some(field) = config.present_leaf_fields().into_iter().next() {
                return Err(ConfigError::MixedOperands { field });
            }
            let mut node = RollupOperator::new(operator);
            for (i, child) in children.iter().enumerate() {
                let resolved = self
                    .resolve(child, tier, default_leaves)
                    .map_err(|e| e.at(format!("rollup_operator_operands[{}]", i)))?;
                node = node.child(resolved);
            }
            return Ok(node);
        }

        if let Some(field) = config
            .present_leaf_fields()
            .into_iter()
            .find(|f| *f != tier.leaf_field())
        {
            return Err(ConfigError::OperandNotAllowed { tier, field });
        }

        let node = RollupOperator::new(operator);
        let node = match tier {
            Tier::Group => node.stations(leaves_or(&config.station_operands, default_leaves)),
            Tier::Station => node.channels(leaves_or(&config.channel_operands, default_leaves)),
            Tier::Channel => node.monitor_types(monitor_types(&config.monitor_type_operands)?),
        };
        Ok(node)
    }

    fn lookup(&self, name: &str) -> Result<&'f OperatorConfig> {
        self.named
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownReference(name.to_string()))
    }

    /// Walk every reference reachable from `config`, failing on a cycle.
    ///
    /// Names in `verified` have already been walked to the end without a
    /// cycle and are not walked again.
    fn check_references(
        &self,
        config: &'f OperatorConfig,
        path: &mut Vec<&'f str>,
        verified: &mut HashSet<&'f str>,
    ) -> Result<()> {
        if let Some(name) = &config.reference {
            let target = self.lookup(name)?;
            if path.contains(&name.as_str()) {
                let mut cycle = path.join(" -> ");
                cycle.push_str(" -> ");
                cycle.push_str(name);
                return Err(ConfigError::CyclicReference(cycle));
            }
            if !verified.contains(name.as_str()) {
                path.push(name.as_str());
                self.check_references(target, path, verified)?;
                path.pop();
                verified.insert(name.as_str());
            }
        }

        for child in config.rollup_operator_operands.iter().flatten() {
            self.check_references(child, path, verified)?;
        }
        Ok(())
    }
}

/// The built-in operator used when neither the entry nor the defaults
/// configure one.
pub fn builtin_default() -> OperatorConfig {
    OperatorConfig::of_type(OperatorKind::WorstOf.as_str())
}

fn bind_operator(config: &OperatorConfig) -> Result<Operator> {
    let kind: OperatorKind = config
        .operator_type
        .as_deref()
        .ok_or(ConfigError::MissingOperatorType)?
        .parse()?;

    let thresholds = [
        ("good_threshold", config.good_threshold),
        ("marginal_threshold", config.marginal_threshold),
    ];

    let parameters = match kind {
        OperatorKind::MinGoodOf => thresholds
            .into_iter()
            .map(|(field, value)| value.ok_or(ConfigError::MissingThreshold { kind, field }))
            .collect::<Result<Vec<i64>>>()?,
        _ => {
            if let Some((field, _)) = thresholds.into_iter().find(|(_, value)| value.is_some()) {
                return Err(ConfigError::UnexpectedThreshold { kind, field });
            }
            Vec::new()
        }
    };

    Ok(Operator::bind(kind, &parameters)?)
}

fn leaves_or(configured: &Option<Vec<String>>, default_leaves: &[String]) -> Vec<String> {
    match configured {
        Some(leaves) if !leaves.is_empty() => leaves.clone(),
        _ => default_leaves.to_vec(),
    }
}

fn monitor_types(configured: &Option<Vec<String>>) -> Result<Vec<MonitorType>> {
    match configured {
        Some(names) if !names.is_empty() => names
            .iter()
            .map(|name| {
                name.parse::<MonitorType>()
                    .map_err(|_| ConfigError::UnknownMonitorType(name.clone()))
            })
            .collect(),
        _ => Ok(MonitorType::ALL.to_vec()),
    }
}
