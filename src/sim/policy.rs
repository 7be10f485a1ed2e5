//! Jump decision policies
//!
//! A policy looks at one observation and says whether to jump. The learned
//! variant holds a handle to any [`Scorer`]; building or training that scorer
//! happens outside the simulation.

use std::fmt;
use std::sync::Arc;

use super::bird::Observation;
use crate::error::PolicyError;
use crate::settings::SimConfig;

/// Inference contract for the learned policy.
///
/// Takes a normalized `[y, gap_bottom]` pair and returns a jump score,
/// nominally in [0, 1].
pub trait Scorer: Send + Sync {
    fn score(&self, input: [f32; 2]) -> Result<f32, PolicyError>;
}

impl<F> Scorer for F
where
    F: Fn([f32; 2]) -> f32 + Send + Sync,
{
    fn score(&self, input: [f32; 2]) -> Result<f32, PolicyError> {
        Ok(self(input))
    }
}

/// Which rule decides a bird's jumps
#[derive(Clone, Default)]
pub enum Policy {
    /// Never jumps on its own; jumps come from input events
    #[default]
    Manual,
    /// Jump when the bird's bottom edge nears the bottom of the gap
    Heuristic,
    /// Jump when the scorer rates the normalized observation above threshold
    Learned(Arc<dyn Scorer>),
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Policy {
    pub fn learned(scorer: impl Scorer + 'static) -> Self {
        Policy::Learned(Arc::new(scorer))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Manual => "Manual",
            Policy::Heuristic => "Heuristic",
            Policy::Learned(_) => "Learned",
        }
    }

    /// Whether the tick loop should ask this policy at all
    pub fn is_polled(&self) -> bool {
        !matches!(self, Policy::Manual)
    }

    pub fn decide(&self, obs: &Observation, config: &SimConfig) -> Result<bool, PolicyError> {
        match self {
            Policy::Manual => Ok(false),
            Policy::Heuristic => Ok(should_jump(obs.y, obs.gap_bottom, config)),
            Policy::Learned(scorer) => {
                let input = obs.normalized(config);
                if !input.iter().all(|v| v.is_finite()) {
                    return Err(PolicyError::NonFiniteInput(input));
                }
                let score = scorer.score(input)?;
                if !score.is_finite() {
                    return Err(PolicyError::NonFiniteScore(score));
                }
                Ok(score > config.jump_threshold)
            }
        }
    }
}

/// Closed-form rule: jump once the bird's bottom plus a margin reaches the gap bottom
#[inline]
pub fn should_jump(y: f32, gap_bottom: f32, config: &SimConfig) -> bool {
    y + config.bird_size + config.heuristic_margin >= gap_bottom
}
