//! Боевое ядро: здоровье, секвенции, стейт-машина, разрешение ударов

pub mod health;
pub mod proximity;
pub mod sequence;
pub mod state;
pub mod strike;

pub use health::{ActorDied, DamageRequest, DamageTaken, HealthChanged};
pub use proximity::StrikeRangeTracker;
pub use sequence::{ActionSlot, ActiveSequence, Clock, SequenceFired, SequenceSignal, SlotBusy};
pub use state::{CombatState, CombatStateChanged};
pub use strike::StrikeCommitted;
