//! Базовые компоненты акторов

pub mod actor;
pub mod combat;

pub use actor::{Actor, DamageOutcome, Facing, Faction, Health, MoveSpeed};
pub use combat::{HitVolume, LingerOnDeath, Striker, StrongEnemy};
