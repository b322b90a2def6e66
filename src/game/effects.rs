//! Delayed cosmetic effects
//!
//! Effects are scheduled on a simulation clock that keeps running between
//! rounds and are tagged with the round generation they were scheduled in.
//! Invalidating bumps the generation, so nothing queued for an earlier round
//! can touch a car that has since been reset.

use smallvec::SmallVec;

use crate::game::state::RacerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Remove the damage tint from a car
    ClearFlash(RacerId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEffect {
    pub due_ms: f64,
    pub generation: u64,
    pub kind: EffectKind,
}

/// Due effects are usually zero or one per frame
pub type DueEffects = SmallVec<[EffectKind; 4]>;

#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    clock_ms: f64,
    generation: u64,
    pending: Vec<ScheduledEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queue `kind` to fire `delay_ms` from now in the current generation
    pub fn schedule(&mut self, delay_ms: f64, kind: EffectKind) {
        self.pending.push(ScheduledEffect {
            due_ms: self.clock_ms + delay_ms.max(0.0),
            generation: self.generation,
            kind,
        });
    }

    /// Start a new generation and drop everything queued before it
    pub fn invalidate(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.pending.retain(|effect| effect.generation == generation);
    }

    /// Advance the clock and return effects that came due, in due order.
    /// Stale-generation effects are discarded rather than returned.
    pub fn advance(&mut self, delta_ms: f64) -> DueEffects {
        self.clock_ms += delta_ms.max(0.0);
        let now = self.clock_ms;
        let generation = self.generation;

        let mut due: SmallVec<[ScheduledEffect; 4]> = SmallVec::new();
        self.pending.retain(|effect| {
            if effect.due_ms <= now {
                if effect.generation == generation {
                    due.push(*effect);
                }
                false
            } else {
                effect.generation == generation
            }
        });

        due.sort_by(|a, b| a.due_ms.partial_cmp(&b.due_ms).unwrap_or(std::cmp::Ordering::Equal));
        due.into_iter().map(|effect| effect.kind).collect()
    }
}
