use log::info;

use crate::core::{SimError, SimResult};
use crate::domain::{Body, BodyId, Constraint, ConstraintId, Shape, Vec2};
use crate::input::GestureClassifier;
use crate::systems::{create_rope, Chain, CutEngine, CutQueue, GoalEvaluator, Space};

use super::perf_stats::PerfStats;
use super::render_extract;
use super::settings::SessionConfig;
use super::{SessionCore, SessionStatus};

pub(super) fn create_session_core(config: SessionConfig) -> SimResult<SessionCore> {
    config.validate()?;

    let mut space = Space::new(config.solver_params());
    let chains = config
        .chains
        .iter()
        .enumerate()
        .map(|(index, chain)| create_rope(&mut space, index, chain))
        .collect::<SimResult<Vec<Chain>>>()?;

    let (payload, payload_links) = attach_payload(&mut space, &chains, &config)?;

    let mut session = SessionCore {
        goal: GoalEvaluator::new(config.target),
        cut_engine: CutEngine::new(config.cut_threshold),
        cut_queue: CutQueue::new(config.queue_capacity),
        gesture: GestureClassifier::new(config.gesture),
        config,
        space,
        chains,
        payload,
        payload_links,
        status: SessionStatus::Running,
        last_error: None,
        snapshot: Default::default(),
        segment_buffer: Vec::new(),
        cut_history: Vec::new(),
        tick: 0,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    };
    render_extract::publish(&mut session);

    info!(
        "session ready: {} chains, {} bodies, {} constraints",
        session.chains.len(),
        session.space.body_count(),
        session.space.constraint_count()
    );
    Ok(session)
}

/// Last segment of `chain` and the local point its payload link attaches to.
fn chain_tip(chains: &[Chain], chain: usize) -> SimResult<(BodyId, Vec2)> {
    let chain = chains.get(chain).ok_or(SimError::UnknownChain(chain))?;
    let last = chain
        .last_segment()
        .ok_or_else(|| SimError::InvalidConfig(format!("chain {} has no segments", chain.index())))?;
    Ok((last, chain.config().tip_anchor()))
}

/// Create the payload and link it pin-first, then slides in listed order.
fn attach_payload(
    space: &mut Space,
    chains: &[Chain],
    config: &SessionConfig,
) -> SimResult<(BodyId, Vec<ConstraintId>)> {
    let p = &config.payload;

    let position = match (p.position, p.pin_chain) {
        (Some(position), _) => position,
        (None, Some(index)) => {
            let (tip, local) = chain_tip(chains, index)?;
            let tip_world = space
                .body(tip)
                .map(|b| b.local_to_world(local))
                .ok_or(SimError::UnknownBody(tip))?;
            tip_world + Vec2::new(0.0, chains[index].config().segment_length)
        }
        (None, None) => return Err(SimError::InvalidConfig("payload needs a position or a pin chain".into())),
    };

    let body = Body::new_dynamic_with_shape(position, p.mass, Shape::circle(p.radius))?;
    let payload = space.add_body(body);

    let mut links = Vec::with_capacity(1 + p.slide_chains.len());
    if let Some(index) = p.pin_chain {
        let (tip, local) = chain_tip(chains, index)?;
        links.push(space.create_pin_joint(tip, payload, local, Vec2::zero())?);
    }
    for &index in &p.slide_chains {
        let (tip, local) = chain_tip(chains, index)?;
        links.push(space.add_constraint(Constraint::slide(
            tip,
            payload,
            local,
            Vec2::zero(),
            p.slide_min,
            p.slide_max,
        ))?);
    }

    Ok((payload, links))
}
