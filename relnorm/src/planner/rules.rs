//! One rule per normal form.
//!
//! A rule inspects a single relation and either accepts it at its level or
//! names the violations it found together with the split that resolves the
//! first of them. Executing splits is left to the planner.

use std::collections::BTreeMap;

use super::join::{cover_test, JoinTest};
use super::relation::Relation;
use super::repeating::{self, RepeatingColumns};
use crate::config::PlannerConfig;
use crate::model::{AttributeSet, NormalForm, Violation, ViolationKind};

/// How a relation fares against one level.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Satisfied,
    /// The level can be neither confirmed nor refuted.
    Inconclusive(String),
    Violated {
        violations: Vec<Violation>,
        split: Split,
    },
}

/// A decomposition resolving one group of violations.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Split {
    /// Move repeating columns into a child keyed by the parent key plus value.
    Unnest(RepeatingColumns),
    /// Move `dependents` into a child keyed by `determinant`.
    Extract {
        determinant: AttributeSet,
        dependents: AttributeSet,
    },
    /// Separate an independent set: `determinant ∪ dependents` and the rest
    /// without `dependents`.
    Separate {
        determinant: AttributeSet,
        dependents: AttributeSet,
    },
    /// Replace the relation by its projections onto `components`.
    Project { components: Vec<AttributeSet> },
}

/// Trait for normal form rules.
pub(crate) trait NormalFormRule: Send + Sync {
    /// Human-readable name of the rule
    fn name(&self) -> &str;

    /// What the rule checks
    fn description(&self) -> &str;

    /// Level a relation reaches by passing this rule.
    fn target(&self) -> NormalForm;

    /// Checks a relation assumed to satisfy every lower level.
    fn check(&self, relation: &Relation, config: &PlannerConfig) -> Outcome;
}

/// The rules for 1NF through 5NF, lowest level first.
pub(crate) fn standard_rules() -> Vec<Box<dyn NormalFormRule>> {
    vec![
        Box::new(FirstNormalForm),
        Box::new(DependencyRule::second()),
        Box::new(DependencyRule::third()),
        Box::new(DependencyRule::boyce_codd()),
        Box::new(FourthNormalForm),
        Box::new(FifthNormalForm),
    ]
}

/// Atomic values: no repeating column groups and no delimited lists.
pub(crate) struct FirstNormalForm;

impl NormalFormRule for FirstNormalForm {
    fn name(&self) -> &str {
        "first_normal_form"
    }

    fn description(&self) -> &str {
        "Every cell holds one atomic value and no attribute repeats across columns"
    }

    fn target(&self) -> NormalForm {
        NormalForm::First
    }

    fn check(&self, relation: &Relation, config: &PlannerConfig) -> Outcome {
        let Some(group) = repeating::find(&relation.profile, config).into_iter().next() else {
            return Outcome::Satisfied;
        };
        let columns: AttributeSet = group.columns.iter().copied().collect();
        let names = relation.names(&columns);
        let key = relation.names(&relation.primary_key);
        let (kind, explanation, resolution) = match group.delimiter {
            None => (
                ViolationKind::RepeatingGroup,
                format!(
                    "columns {} repeat the attribute '{}'",
                    names.join(", "),
                    group.base
                ),
                format!(
                    "move {} into a child table with one '{}' per row, keyed by ({}) and '{}'",
                    names.join(", "),
                    group.base,
                    key.join(", "),
                    group.base
                ),
            ),
            Some(delimiter) => (
                ViolationKind::MultiValuedColumn,
                format!(
                    "column '{}' holds lists separated by '{}'",
                    group.base, delimiter
                ),
                format!(
                    "split '{}' into a child table with one list item per row, keyed by ({}) and '{}'",
                    group.base,
                    key.join(", "),
                    group.base
                ),
            ),
        };
        let violation = Violation {
            kind,
            table: relation.name().to_string(),
            attributes: names.clone(),
            determinant: key,
            dependents: names,
            explanation,
            resolution,
        };
        Outcome::Violated {
            violations: vec![violation],
            split: Split::Unnest(group),
        }
    }
}

/// 2NF, 3NF and BCNF: the FD-based levels.
pub(crate) struct DependencyRule {
    level: NormalForm,
}

impl DependencyRule {
    pub fn second() -> Self {
        Self {
            level: NormalForm::Second,
        }
    }

    pub fn third() -> Self {
        Self {
            level: NormalForm::Third,
        }
    }

    pub fn boyce_codd() -> Self {
        Self {
            level: NormalForm::BoyceCodd,
        }
    }

    fn violates(&self, relation: &Relation, lhs: &AttributeSet, rhs: usize, prime: &AttributeSet) -> bool {
        match self.level {
            NormalForm::Second => lhs.is_proper_subset(&relation.primary_key) && !prime.contains(rhs),
            NormalForm::Third => !prime.contains(rhs) && !relation.is_superkey(lhs),
            _ => !relation.is_superkey(lhs),
        }
    }

    fn kind(&self) -> ViolationKind {
        match self.level {
            NormalForm::Second => ViolationKind::PartialDependency,
            NormalForm::Third => ViolationKind::TransitiveDependency,
            _ => ViolationKind::NonSuperkeyDeterminant,
        }
    }

    fn explain(&self, relation: &Relation, lhs: &[String], rhs: &str) -> String {
        let lhs = lhs.join(", ");
        match self.level {
            NormalForm::Second => format!(
                "{rhs} depends on {lhs}, a proper subset of the primary key ({})",
                relation.names(&relation.primary_key).join(", ")
            ),
            NormalForm::Third => {
                format!("non-key attribute {rhs} depends on {lhs}, which is not a superkey")
            }
            _ => format!("{rhs} is determined by {lhs}, which is not a superkey"),
        }
    }

    fn resolve(relation: &Relation, lhs: &[String], dependents: &[String]) -> String {
        format!(
            "move {} into a table keyed by ({}) and keep ({}) in {} as a foreign key",
            dependents.join(", "),
            lhs.join(", "),
            lhs.join(", "),
            relation.name()
        )
    }
}

impl NormalFormRule for DependencyRule {
    fn name(&self) -> &str {
        match self.level {
            NormalForm::Second => "second_normal_form",
            NormalForm::Third => "third_normal_form",
            _ => "boyce_codd_normal_form",
        }
    }

    fn description(&self) -> &str {
        match self.level {
            NormalForm::Second => "No non-prime attribute depends on part of the primary key",
            NormalForm::Third => "No non-prime attribute depends on a non-superkey",
            _ => "Every determinant is a superkey",
        }
    }

    fn target(&self) -> NormalForm {
        self.level
    }

    fn check(&self, relation: &Relation, config: &PlannerConfig) -> Outcome {
        let prime = relation.prime_attributes();
        let mut grouped: BTreeMap<AttributeSet, AttributeSet> = BTreeMap::new();
        for fd in relation.deps.left_reduced(config.min_decomposition_confidence) {
            if relation.is_null_free(&fd.lhs) && self.violates(relation, &fd.lhs, fd.rhs, &prime) {
                grouped.entry(fd.lhs.clone()).or_default().insert(fd.rhs);
            }
        }
        let Some((determinant, dependents)) = grouped.into_iter().next() else {
            return Outcome::Satisfied;
        };

        let lhs = relation.names(&determinant);
        let resolution = Self::resolve(relation, &lhs, &relation.names(&dependents));
        let violations = dependents
            .iter()
            .map(|rhs| {
                let rhs_name = relation.profile.attributes()[rhs].name.clone();
                Violation {
                    kind: self.kind(),
                    table: relation.name().to_string(),
                    attributes: relation.names(&determinant.with(rhs)),
                    determinant: lhs.clone(),
                    dependents: vec![rhs_name.clone()],
                    explanation: self.explain(relation, &lhs, &rhs_name),
                    resolution: resolution.clone(),
                }
            })
            .collect();
        Outcome::Violated {
            violations,
            split: Split::Extract {
                determinant,
                dependents,
            },
        }
    }
}

/// Independent multi-valued facts live in separate tables.
pub(crate) struct FourthNormalForm;

impl NormalFormRule for FourthNormalForm {
    fn name(&self) -> &str {
        "fourth_normal_form"
    }

    fn description(&self) -> &str {
        "Every non-trivial multi-valued dependency has a superkey determinant"
    }

    fn target(&self) -> NormalForm {
        NormalForm::Fourth
    }

    fn check(&self, relation: &Relation, config: &PlannerConfig) -> Outcome {
        let Some(mvd) = relation.deps.multivalued.iter().find(|mvd| {
            mvd.confidence >= config.min_decomposition_confidence
                && relation.is_null_free(&mvd.lhs)
                && !relation.is_superkey(&mvd.lhs)
        }) else {
            return Outcome::Satisfied;
        };
        let lhs = relation.names(&mvd.lhs);
        let rhs = relation.names(&mvd.rhs);
        let rest = relation
            .profile
            .all_attributes()
            .difference(&mvd.lhs.union(&mvd.rhs));
        let violation = Violation {
            kind: ViolationKind::MultiValuedDependency,
            table: relation.name().to_string(),
            attributes: relation.names(&mvd.lhs.union(&mvd.rhs)),
            determinant: lhs.clone(),
            dependents: rhs.clone(),
            explanation: format!(
                "for each {}, the values of {} vary independently of {}",
                lhs.join(", "),
                rhs.join(", "),
                relation.names(&rest).join(", ")
            ),
            resolution: format!(
                "separate ({}) into its own table and drop {} from {}",
                relation.names(&mvd.lhs.union(&mvd.rhs)).join(", "),
                rhs.join(", "),
                relation.name()
            ),
        };
        Outcome::Violated {
            violations: vec![violation],
            split: Split::Separate {
                determinant: mvd.lhs.clone(),
                dependents: mvd.rhs.clone(),
            },
        }
    }
}

/// No join dependency beyond those implied by keys.
///
/// Relations with fewer than three attributes, or whose keys are all single
/// attributes, are accepted outright. Other relations within the configured
/// size take the cover join test: spurious rows prove 5NF, an exact
/// reconstruction of an all-key relation is a violation, anything else is
/// inconclusive.
pub(crate) struct FifthNormalForm;

impl NormalFormRule for FifthNormalForm {
    fn name(&self) -> &str {
        "fifth_normal_form"
    }

    fn description(&self) -> &str {
        "Every join dependency is implied by the candidate keys"
    }

    fn target(&self) -> NormalForm {
        NormalForm::Fifth
    }

    fn check(&self, relation: &Relation, config: &PlannerConfig) -> Outcome {
        let arity = relation.arity();
        if arity < 3 || relation.keys().iter().all(|k| k.len() == 1) {
            return Outcome::Satisfied;
        }
        if arity > config.max_join_attributes {
            return Outcome::Inconclusive(format!(
                "{arity} attributes exceed the join test limit of {}",
                config.max_join_attributes
            ));
        }
        let rows = relation.table.row_count();
        if rows < config.min_join_rows {
            return Outcome::Inconclusive(format!(
                "{rows} rows are too few to test join dependencies (need {})",
                config.min_join_rows
            ));
        }
        match cover_test(&relation.table, config.max_join_rows) {
            JoinTest::Lossy => Outcome::Satisfied,
            JoinTest::TooLarge => Outcome::Inconclusive(format!(
                "intermediate join exceeded {} rows",
                config.max_join_rows
            )),
            JoinTest::Lossless(_) if !relation.is_all_key() => Outcome::Inconclusive(
                "the table equals the join of its projections, which its keys may imply"
                    .to_string(),
            ),
            JoinTest::Lossless(components) => {
                let projections: Vec<String> = components
                    .iter()
                    .map(|c| format!("({})", relation.names(c).join(", ")))
                    .collect();
                let violation = Violation {
                    kind: ViolationKind::JoinDependency,
                    table: relation.name().to_string(),
                    attributes: relation.names(&relation.profile.all_attributes()),
                    determinant: Vec::new(),
                    dependents: Vec::new(),
                    explanation: format!(
                        "{} is the join of its projections {}",
                        relation.name(),
                        projections.join(", ")
                    ),
                    resolution: format!(
                        "replace {} by the projections {}",
                        relation.name(),
                        projections.join(", ")
                    ),
                };
                Outcome::Violated {
                    violations: vec![violation],
                    split: Split::Project { components },
                }
            }
        }
    }
}
