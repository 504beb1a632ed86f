//! Runs one interaction: evaluate every context read-only, then commit.
//!
//! Costs, target effects, user effects and self effects share a single
//! [`Journal`], so an invocation either commits as a whole or leaves the
//! world exactly as it found it (apart from the consumed nonce).

use std::cell::Cell;

use tracing::{debug, info, warn};

use super::{ExecutionResult, ExecutionStatus, InvocationSource};
use crate::rules::effect::{self, Journal};
use crate::rules::requirement::{self, Binding};
use crate::rules::{
    AppliedChange, ContextBlock, EffectError, ExecutionError, Interaction, ReferenceError,
    RequirementError, Scene, TraceNode,
};
use crate::state::{EntityId, World};

/// A context block bound to the entity it is checked against.
struct Stage<'i> {
    label: String,
    subject: EntityId,
    target: Option<EntityId>,
    block: &'i ContextBlock,
}

struct Verdict {
    passed: bool,
    children: Vec<TraceNode>,
    /// One binding per passed stage, in stage order.
    bindings: Vec<Binding>,
    defects: Vec<RequirementError>,
    notes: Vec<String>,
}

pub(super) fn run(
    world: &mut World,
    source: InvocationSource,
    owner: EntityId,
    user: EntityId,
    targets: Vec<EntityId>,
    action: &Interaction,
) -> ExecutionResult {
    let nonce = world.next_nonce();
    let rolls = Cell::new(0);
    let scene = Scene::new(owner, user, nonce, &action.parameters, &rolls);

    let mut result = ExecutionResult {
        source,
        owner,
        user,
        targets,
        nonce,
        status: ExecutionStatus::Applied,
        trace: TraceNode::branch(action.kind.clone(), false, Vec::new()),
        applied: Vec::new(),
        narrative: Vec::new(),
    };
    if !action.description.is_empty() {
        result.narrative.push(action.description.clone());
    }

    if let Some(&missing) = result.targets.iter().find(|id| !world.contains(**id)) {
        let err = EffectError::InvalidTarget {
            effect: action.kind.clone(),
            entity: missing,
        };
        return abort(result, err.into());
    }

    if result.targets.is_empty() && !action.target.is_empty() {
        let defect = RequirementError::MissingSubject("target".to_owned());
        result.trace.children = vec![TraceNode::leaf("target", false, Some(defect.to_string()))];
        debug!(
            target: "lldm::engine",
            owner = %owner,
            nonce,
            source = ?source,
            "target context without targets"
        );
        result.status = ExecutionStatus::RequirementsFailed {
            defects: vec![defect],
        };
        return result;
    }

    let stages = plan(action, owner, user, &result.targets);
    let verdict = match evaluate(world, scene, &stages) {
        Ok(verdict) => verdict,
        Err(err) => return abort(result, err.into()),
    };
    result.trace.passed = verdict.passed;
    result.trace.children = verdict.children;

    if !verdict.passed {
        result.narrative.extend(verdict.notes);
        debug!(
            target: "lldm::engine",
            owner = %owner,
            nonce,
            source = ?source,
            defects = verdict.defects.len(),
            "requirements failed"
        );
        result.status = ExecutionStatus::RequirementsFailed {
            defects: verdict.defects,
        };
        return result;
    }

    let mut journal = Journal::new();
    let mut applied = Vec::new();
    if let Err(err) = commit(
        world,
        &mut journal,
        scene,
        &stages,
        &verdict.bindings,
        &mut applied,
    ) {
        journal.rollback(world);
        return abort(result, err);
    }

    result.narrative.extend(
        verdict
            .bindings
            .iter()
            .flat_map(|binding| &binding.outcomes)
            .map(|bound| bound.outcome.description.clone())
            .filter(|line| !line.is_empty()),
    );
    info!(
        target: "lldm::engine",
        owner = %owner,
        user = %user,
        nonce,
        source = ?source,
        changes = applied.len(),
        "interaction applied"
    );
    result.applied = applied;
    result
}

/// Target contexts first (one per target), then user, then self.
///
/// User and self contexts see the first target as `target:`. Callers reject
/// an empty target list when the target context is not empty.
fn plan<'i>(
    action: &'i Interaction,
    owner: EntityId,
    user: EntityId,
    targets: &[EntityId],
) -> Vec<Stage<'i>> {
    let first = targets.first().copied();
    let mut stages: Vec<Stage<'i>> = targets
        .iter()
        .map(|&target| Stage {
            label: format!("target {target}"),
            subject: target,
            target: Some(target),
            block: &action.target,
        })
        .collect();
    stages.push(Stage {
        label: "user".into(),
        subject: user,
        target: first,
        block: &action.user,
    });
    stages.push(Stage {
        label: "self".into(),
        subject: owner,
        target: first,
        block: &action.owner,
    });
    stages
}

/// Stages are an implicit AND: the first failing stage stops evaluation.
fn evaluate(
    world: &World,
    scene: Scene<'_>,
    stages: &[Stage<'_>],
) -> Result<Verdict, ReferenceError> {
    let mut verdict = Verdict {
        passed: true,
        children: Vec::with_capacity(stages.len()),
        bindings: Vec::with_capacity(stages.len()),
        defects: Vec::new(),
        notes: Vec::new(),
    };
    for stage in stages {
        let ctx = scene.context(world, stage.subject, stage.target);
        let evaluation = requirement::evaluate(&stage.block.requirements, &stage.label, &ctx)?;
        verdict.children.push(evaluation.trace);
        verdict.defects.extend(evaluation.defects);
        verdict.notes.extend(evaluation.notes);
        if !evaluation.passed {
            verdict.passed = false;
            break;
        }
        verdict.bindings.push(evaluation.binding);
    }
    Ok(verdict)
}

fn commit(
    world: &mut World,
    journal: &mut Journal,
    scene: Scene<'_>,
    stages: &[Stage<'_>],
    bindings: &[Binding],
    applied: &mut Vec<AppliedChange>,
) -> Result<(), ExecutionError> {
    for bound in bindings.iter().flat_map(|binding| &binding.costs) {
        applied.push(effect::pay_cost(world, journal, bound.entity, &bound.cost)?);
    }
    for (stage, binding) in stages.iter().zip(bindings) {
        effect::apply_in(
            world,
            journal,
            &stage.block.effects,
            scene,
            stage.subject,
            stage.target,
            applied,
        )?;
        for bound in &binding.outcomes {
            effect::apply_in(
                world,
                journal,
                &bound.outcome.effects,
                scene,
                bound.entity,
                stage.target,
                applied,
            )?;
        }
    }
    Ok(())
}

fn abort(mut result: ExecutionResult, err: ExecutionError) -> ExecutionResult {
    warn!(
        target: "lldm::engine",
        owner = %result.owner,
        nonce = result.nonce,
        source = ?result.source,
        error = %err,
        "invocation aborted"
    );
    result.trace.passed = false;
    result.status = ExecutionStatus::Aborted(err);
    result
}
