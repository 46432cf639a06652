//! Cooperative timed-action scheduler.
//!
//! Every actor owns exactly one `ActionSlot`. A slot runs at most one
//! `ActiveSequence` — a list of wait/emit steps advanced cooperatively by
//! the tick systems. Starting a sequence while one is running is an error
//! (`SlotBusy`): the caller must cancel explicitly, which is what gives the
//! "one active attack at a time" guarantee.
//!
//! Two clocks:
//! - `Clock::Simulated` — fixed-step simulation time (`FixedUpdate`)
//! - `Clock::WallClock` — real time (`Update`), used only by the death
//!   linger so corpses still fade out while simulation time is paused
//!   (end-of-match freeze)

use bevy::prelude::*;

/// Signals a sequence can emit when a wait elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceSignal {
    /// The wind-up wait elapsed: resolve the strike now.
    ResolveStrike,
    /// Post-strike cooldown elapsed: return to Approaching.
    EndRecovery,
    /// Stun recovery elapsed: return to Approaching.
    EndStun,
    /// Death linger elapsed: remove the corpse.
    Despawn,
}

/// Which time source advances a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clock {
    Simulated,
    WallClock,
}

#[derive(Clone, Debug)]
pub enum Step {
    /// Suspend until `duration` seconds of the sequence's clock elapse.
    Wait(f32),
    Emit(SequenceSignal),
}

/// A running timed action.
#[derive(Clone, Debug)]
pub struct ActiveSequence {
    clock: Clock,
    steps: Vec<Step>,
    cursor: usize,
    wait_remaining: f32,
}

impl ActiveSequence {
    pub fn new(clock: Clock, steps: Vec<Step>) -> Self {
        // Negative/zero waits are normalized, not rejected: they elapse
        // on the first advance.
        let steps: Vec<Step> = steps
            .into_iter()
            .map(|step| match step {
                Step::Wait(d) => Step::Wait(d.max(0.0)),
                emit => emit,
            })
            .collect();

        let wait_remaining = match steps.first() {
            Some(Step::Wait(d)) => *d,
            _ => 0.0,
        };

        Self {
            clock,
            steps,
            cursor: 0,
            wait_remaining,
        }
    }

    /// Strike: wind-up wait, resolve, cooldown wait, recover.
    pub fn strike(attack_delay: f32, attack_cooldown: f32) -> Self {
        Self::new(
            Clock::Simulated,
            vec![
                Step::Wait(attack_delay),
                Step::Emit(SequenceSignal::ResolveStrike),
                Step::Wait(attack_cooldown),
                Step::Emit(SequenceSignal::EndRecovery),
            ],
        )
    }

    /// Hurt-lock: fixed recovery wait, then back to Approaching.
    pub fn stun(duration: f32) -> Self {
        Self::new(
            Clock::Simulated,
            vec![Step::Wait(duration), Step::Emit(SequenceSignal::EndStun)],
        )
    }

    /// Corpse linger, driven by wall-clock time.
    pub fn death_linger(seconds: f32) -> Self {
        Self::new(
            Clock::WallClock,
            vec![Step::Wait(seconds), Step::Emit(SequenceSignal::Despawn)],
        )
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Advances the sequence by `dt` seconds, pushing every signal whose
    /// wait elapsed within the budget. Returns true when the sequence ran
    /// to completion.
    fn advance(&mut self, dt: f32, fired: &mut Vec<SequenceSignal>) -> bool {
        let mut budget = dt;

        loop {
            match self.steps.get(self.cursor) {
                None => return true,
                Some(Step::Wait(_)) => {
                    if self.wait_remaining > budget {
                        self.wait_remaining -= budget;
                        return false;
                    }
                    budget -= self.wait_remaining;
                    self.step_forward();
                }
                Some(Step::Emit(signal)) => {
                    fired.push(*signal);
                    self.step_forward();
                }
            }
        }
    }

    fn step_forward(&mut self) {
        self.cursor += 1;
        self.wait_remaining = match self.steps.get(self.cursor) {
            Some(Step::Wait(d)) => *d,
            _ => 0.0,
        };
    }
}

/// Tried to start a sequence while another one is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBusy;

/// Per-actor exclusive slot for timed actions.
#[derive(Component, Debug, Default)]
pub struct ActionSlot(Option<ActiveSequence>);

impl ActionSlot {
    /// Starts a sequence. Never silently replaces a running one.
    pub fn begin(&mut self, sequence: ActiveSequence) -> Result<(), SlotBusy> {
        if self.0.is_some() {
            return Err(SlotBusy);
        }
        self.0 = Some(sequence);
        Ok(())
    }

    /// Stops the running sequence before its next resumption. Effects
    /// already emitted stay applied; no further steps run.
    pub fn cancel(&mut self) {
        self.0 = None;
    }

    pub fn is_idle(&self) -> bool {
        self.0.is_none()
    }

    pub fn active(&self) -> Option<&ActiveSequence> {
        self.0.as_ref()
    }

    fn advance(&mut self, clock: Clock, dt: f32, fired: &mut Vec<SequenceSignal>) {
        let Some(sequence) = self.0.as_mut() else {
            return;
        };
        if sequence.clock() != clock {
            return;
        }
        if sequence.advance(dt, fired) {
            self.0 = None;
        }
    }
}

/// Event: a sequence signal fired for an actor this tick.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFired {
    pub entity: Entity,
    pub signal: SequenceSignal,
}

/// System: advance simulated-clock sequences by the fixed step.
///
/// Signals are emitted in ascending entity-index order — the stable
/// per-tick actor order every downstream system inherits.
pub fn advance_sequences(
    mut slots: Query<(Entity, &mut ActionSlot)>,
    time: Res<Time<Fixed>>,
    mut events: EventWriter<SequenceFired>,
) {
    advance_slots(&mut slots, Clock::Simulated, time.delta_secs(), &mut events);
}

/// System: advance wall-clock sequences (death linger). Runs in `Update`
/// so it keeps going while virtual time is paused.
pub fn advance_wall_clock_sequences(
    mut slots: Query<(Entity, &mut ActionSlot)>,
    time: Res<Time<Real>>,
    mut events: EventWriter<SequenceFired>,
) {
    advance_slots(&mut slots, Clock::WallClock, time.delta_secs(), &mut events);
}

fn advance_slots(
    slots: &mut Query<(Entity, &mut ActionSlot)>,
    clock: Clock,
    dt: f32,
    events: &mut EventWriter<SequenceFired>,
) {
    let mut sorted: Vec<_> = slots.iter_mut().collect();
    sorted.sort_by_key(|(entity, _)| entity.index());

    let mut fired = Vec::new();
    for (entity, slot) in sorted.iter_mut() {
        fired.clear();
        slot.advance(clock, dt, &mut fired);
        for signal in &fired {
            events.write(SequenceFired {
                entity: *entity,
                signal: *signal,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(seq: &mut ActiveSequence, dt: f32) -> (Vec<SequenceSignal>, bool) {
        let mut fired = Vec::new();
        let done = seq.advance(dt, &mut fired);
        (fired, done)
    }

    #[test]
    fn slot_rejects_second_sequence() {
        let mut slot = ActionSlot::default();
        assert!(slot.begin(ActiveSequence::strike(0.3, 2.0)).is_ok());
        assert_eq!(slot.begin(ActiveSequence::stun(0.3)), Err(SlotBusy));

        slot.cancel();
        assert!(slot.begin(ActiveSequence::stun(0.3)).is_ok());
    }

    #[test]
    fn cancelled_sequence_fires_nothing() {
        let mut slot = ActionSlot::default();
        slot.begin(ActiveSequence::strike(0.1, 0.1)).unwrap();
        slot.cancel();

        let mut fired = Vec::new();
        slot.advance(Clock::Simulated, 10.0, &mut fired);
        assert!(fired.is_empty());
        assert!(slot.is_idle());
    }

    #[test]
    fn strike_sequence_fires_in_order() {
        let mut seq = ActiveSequence::strike(0.3, 0.5);

        let (fired, done) = drain(&mut seq, 0.2);
        assert!(fired.is_empty());
        assert!(!done);

        // Wind-up elapses, strike fires, cooldown still pending
        let (fired, done) = drain(&mut seq, 0.2);
        assert_eq!(fired, vec![SequenceSignal::ResolveStrike]);
        assert!(!done);

        let (fired, done) = drain(&mut seq, 0.5);
        assert_eq!(fired, vec![SequenceSignal::EndRecovery]);
        assert!(done);
    }

    #[test]
    fn zero_duration_waits_elapse_immediately() {
        let mut seq = ActiveSequence::strike(0.0, 0.0);
        let (fired, done) = drain(&mut seq, 0.016);
        assert_eq!(
            fired,
            vec![SequenceSignal::ResolveStrike, SequenceSignal::EndRecovery]
        );
        assert!(done);
    }

    #[test]
    fn negative_wait_is_normalized_to_zero() {
        let mut seq = ActiveSequence::new(
            Clock::Simulated,
            vec![Step::Wait(-5.0), Step::Emit(SequenceSignal::EndStun)],
        );
        let (fired, done) = drain(&mut seq, 0.001);
        assert_eq!(fired, vec![SequenceSignal::EndStun]);
        assert!(done);
    }

    #[test]
    fn oversized_dt_fires_all_pending_signals() {
        let mut seq = ActiveSequence::strike(0.3, 0.5);
        let (fired, done) = drain(&mut seq, 10.0);
        assert_eq!(
            fired,
            vec![SequenceSignal::ResolveStrike, SequenceSignal::EndRecovery]
        );
        assert!(done);
    }

    #[test]
    fn wall_clock_sequences_ignore_simulated_advance() {
        let mut slot = ActionSlot::default();
        slot.begin(ActiveSequence::death_linger(0.1)).unwrap();

        let mut fired = Vec::new();
        slot.advance(Clock::Simulated, 10.0, &mut fired);
        assert!(fired.is_empty());
        assert!(!slot.is_idle());

        slot.advance(Clock::WallClock, 0.2, &mut fired);
        assert_eq!(fired, vec![SequenceSignal::Despawn]);
        assert!(slot.is_idle());
    }
}
