//! Requirement trees and their read-only evaluation.
//!
//! Evaluation never mutates the world. Resource costs found along the passing
//! path, and the branch each evaluated test selected, are returned as a
//! [`Binding`]; the executor applies them only after every context passed.

use std::collections::BTreeMap;

use super::context::EvalContext;
use super::{Effect, Magnitude, Reference, ReferenceError, RequirementError, TraceNode};
use crate::state::{EntityId, MatchPattern, VitalKind};

/// Descriptor attached to one branch of a test.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Outcome {
    pub description: String,
    /// Applied to the tested entity when the branch is bound.
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub fn describe(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestSpec {
    pub actor: Magnitude,
    /// Alternatives to `actor`. The candidate with the highest unrolled score
    /// is the one rolled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub choice: Vec<Magnitude>,
    pub difficulty: Magnitude,
    /// Opposing magnitudes, usually `target:` skills. The best one is rolled
    /// and replaces `difficulty` when higher.
    #[cfg_attr(feature = "serde", serde(default))]
    pub opposed: Vec<Magnitude>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pass: Outcome,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fail: Outcome,
}

/// Signed change to a vital. Negative amounts are costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub vital: VitalKind,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Requirement {
    /// Every child must pass. A bare list is the same thing.
    All(Vec<Requirement>),
    /// First passing child wins; the rest are not evaluated.
    Or(Vec<Requirement>),
    /// Negates exactly one child.
    Not(Vec<Requirement>),
    Ally(MatchPattern),
    Enemy(MatchPattern),
    Test(Box<TestSpec>),
    Resource(ResourceCost),
    /// `current >= minimum`
    Threshold { reference: Reference, minimum: i64 },
    /// Passes when the reference is truthy.
    Flag(Reference),
    Extension {
        kind: String,
        data: BTreeMap<String, String>,
    },
}

impl Requirement {
    pub fn test(actor: Magnitude, difficulty: Magnitude) -> Self {
        Self::Test(Box::new(TestSpec {
            actor,
            choice: Vec::new(),
            difficulty,
            opposed: Vec::new(),
            pass: Outcome::default(),
            fail: Outcome::default(),
        }))
    }

    pub fn cost(vital: VitalKind, amount: i64) -> Self {
        Self::Resource(ResourceCost { vital, amount })
    }

    pub fn threshold(reference: Reference, minimum: i64) -> Self {
        Self::Threshold { reference, minimum }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundCost {
    pub entity: EntityId,
    pub cost: ResourceCost,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundOutcome {
    pub entity: EntityId,
    pub outcome: Outcome,
}

/// Costs from the passing path, plus the selected branch of every test
/// that was evaluated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    pub costs: Vec<BoundCost>,
    pub outcomes: Vec<BoundOutcome>,
}

impl Binding {
    fn extend(&mut self, other: Binding) {
        self.costs.extend(other.costs);
        self.outcomes.extend(other.outcomes);
    }

    /// What a failed node still contributes: its tests' outcomes, no costs.
    fn outcomes_only(self) -> Binding {
        Binding {
            costs: Vec::new(),
            outcomes: self.outcomes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub passed: bool,
    pub trace: TraceNode,
    /// Empty unless `passed`.
    pub binding: Binding,
    /// Authoring defects met on the way; each one failed its node.
    pub defects: Vec<RequirementError>,
    /// Failed test descriptions and unmet thresholds, for narration.
    pub notes: Vec<String>,
}

struct Node {
    passed: bool,
    trace: TraceNode,
    binding: Binding,
}

impl Node {
    fn leaf(label: &str, passed: bool, note: Option<String>, binding: Binding) -> Self {
        Self {
            passed,
            trace: TraceNode::leaf(label, passed, note),
            binding: if passed {
                binding
            } else {
                binding.outcomes_only()
            },
        }
    }
}

#[derive(Default)]
struct Findings {
    defects: Vec<RequirementError>,
    notes: Vec<String>,
}

/// Evaluates a requirement list as an implicit AND for `ctx.subject`.
///
/// Reference failures abort the whole evaluation. A malformed node fails
/// itself and the whole tree, even under a `not`.
pub fn evaluate(
    requirements: &[Requirement],
    label: &str,
    ctx: &EvalContext<'_>,
) -> Result<Evaluation, ReferenceError> {
    let mut findings = Findings::default();
    let mut node = eval_all(requirements, label, ctx, &mut findings)?;
    if !findings.defects.is_empty() {
        node.passed = false;
        node.trace.passed = false;
    }
    if !node.passed {
        node.binding = Binding::default();
    }
    Ok(Evaluation {
        passed: node.passed,
        trace: node.trace,
        binding: node.binding,
        defects: findings.defects,
        notes: findings.notes,
    })
}

fn eval_all(
    children: &[Requirement],
    label: &str,
    ctx: &EvalContext<'_>,
    findings: &mut Findings,
) -> Result<Node, ReferenceError> {
    let mut traces = Vec::with_capacity(children.len());
    let mut binding = Binding::default();
    let mut passed = true;
    for child in children {
        let node = eval(child, ctx, findings)?;
        traces.push(node.trace);
        binding.extend(node.binding);
        if !node.passed {
            passed = false;
            break;
        }
    }
    Ok(Node {
        passed,
        trace: TraceNode::branch(label, passed, traces),
        binding: if passed {
            binding
        } else {
            binding.outcomes_only()
        },
    })
}

fn defect(label: &str, error: RequirementError, findings: &mut Findings) -> Node {
    let node = Node::leaf(label, false, Some(error.to_string()), Binding::default());
    findings.defects.push(error);
    node
}

fn eval(
    requirement: &Requirement,
    ctx: &EvalContext<'_>,
    findings: &mut Findings,
) -> Result<Node, ReferenceError> {
    match requirement {
        Requirement::All(children) => eval_all(children, "all", ctx, findings),

        Requirement::Or(children) if children.is_empty() => {
            Ok(defect("or", RequirementError::EmptyOr, findings))
        }
        Requirement::Or(children) => {
            let mut traces = Vec::new();
            let mut binding = Binding::default();
            for child in children {
                let node = eval(child, ctx, findings)?;
                traces.push(node.trace);
                binding.extend(node.binding);
                if node.passed {
                    return Ok(Node {
                        passed: true,
                        trace: TraceNode::branch("or", true, traces),
                        binding,
                    });
                }
            }
            Ok(Node {
                passed: false,
                trace: TraceNode::branch("or", false, traces),
                binding,
            })
        }

        Requirement::Not(children) if children.len() != 1 => Ok(defect(
            "not",
            RequirementError::NotArity(children.len()),
            findings,
        )),
        Requirement::Not(children) => {
            let inner = eval(&children[0], ctx, findings)?;
            let passed = !inner.passed;
            // Costs never cross a negation; test outcomes do.
            Ok(Node {
                passed,
                trace: TraceNode::branch("not", passed, vec![inner.trace]),
                binding: inner.binding.outcomes_only(),
            })
        }

        Requirement::Ally(pattern) | Requirement::Enemy(pattern) => {
            let (label, list) = match (requirement, ctx.subject_entity()) {
                (_, None) => {
                    return Ok(defect(
                        "relation",
                        RequirementError::MissingSubject("relation".to_owned()),
                        findings,
                    ));
                }
                (Requirement::Ally(_), Some(subject)) => ("ally", &subject.ally),
                (_, Some(subject)) => ("enemy", &subject.enemy),
            };
            let passed = list.iter().any(|entry| entry.covers(pattern));
            Ok(Node::leaf(
                label,
                passed,
                Some(pattern.to_string()),
                Binding::default(),
            ))
        }

        Requirement::Test(spec) => {
            let actor = Magnitude::best_of(&spec.actor, &spec.choice, ctx)?.evaluate(ctx)?;
            let mut difficulty = spec.difficulty.evaluate(ctx)?;
            if let Some((first, rest)) = spec.opposed.split_first() {
                let defence = Magnitude::best_of(first, rest, ctx)?.evaluate(ctx)?;
                difficulty = difficulty.max(defence);
            }
            let passed = actor >= difficulty;
            let selected = if passed { &spec.pass } else { &spec.fail };
            if !passed && !selected.description.is_empty() {
                findings.notes.push(selected.description.clone());
            }
            let binding = Binding {
                costs: Vec::new(),
                outcomes: vec![BoundOutcome {
                    entity: ctx.subject,
                    outcome: selected.clone(),
                }],
            };
            let relation = if passed { ">=" } else { "<" };
            Ok(Node::leaf(
                "test",
                passed,
                Some(format!("{actor} {relation} {difficulty}")),
                binding,
            ))
        }

        Requirement::Resource(cost) => {
            let Some(subject) = ctx.subject_entity() else {
                return Ok(defect(
                    "resource",
                    RequirementError::MissingSubject("resource".to_owned()),
                    findings,
                ));
            };
            let current = subject.vitals.get(cost.vital).current();
            let passed = current.saturating_add(cost.amount) >= 0;
            let binding = Binding {
                costs: vec![BoundCost {
                    entity: ctx.subject,
                    cost: *cost,
                }],
                outcomes: Vec::new(),
            };
            Ok(Node::leaf(
                "resource",
                passed,
                Some(format!("cur_{} {current} {:+}", cost.vital, cost.amount)),
                binding,
            ))
        }

        Requirement::Threshold { reference, minimum } => {
            let current = ctx.resolve_int(reference)?;
            let passed = current >= *minimum;
            if !passed {
                findings
                    .notes
                    .push(format!("Need {minimum} of {reference}, but only have {current}."));
            }
            Ok(Node::leaf(
                "threshold",
                passed,
                Some(format!("{reference} = {current}, needs {minimum}")),
                Binding::default(),
            ))
        }

        Requirement::Flag(reference) => {
            let passed = ctx.resolve(reference)?.is_truthy();
            Ok(Node::leaf(
                "flag",
                passed,
                Some(reference.to_string()),
                Binding::default(),
            ))
        }

        Requirement::Extension { kind, .. } => Ok(defect(
            "extension",
            RequirementError::UnknownKind(kind.clone()),
            findings,
        )),
    }
}
