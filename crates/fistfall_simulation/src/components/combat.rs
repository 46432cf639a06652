//! Combat компоненты: параметры удара, хитбокс, варианты врагов

use bevy::prelude::*;

/// Способность наносить удары
#[derive(Component, Debug, Clone, Copy)]
pub struct Striker {
    /// Урон одного удара
    pub damage: u32,
    /// Задержка от начала замаха до момента удара (секунды)
    pub attack_delay: f32,
    /// Откат после удара до возврата в Approaching (секунды)
    pub attack_cooldown: f32,
    /// AI-вариант: дистанция, перепроверяемая в момент удара.
    /// None — командный вариант (игрок), дистанция не проверяется.
    pub strike_gate: Option<f32>,
}

/// Геометрия хитбокса удара
///
/// Горизонтальный offset знак берет из Facing атакующего в момент удара.
/// Актор без этого компонента бить не может — удары деградируют в no-op
/// с warning в логе, симуляция продолжается.
#[derive(Component, Debug, Clone, Copy)]
pub struct HitVolume {
    pub half_extents: Vec2,
    pub forward_offset: f32,
}

/// Маркер "сильного" врага: двойной урон, тинт на стороне презентации
#[derive(Component, Debug, Clone, Copy)]
pub struct StrongEnemy;

/// Труп остаётся в мире указанное время (wall-clock) перед деспавном.
///
/// Акторы без компонента деспавнятся сразу после смерти.
#[derive(Component, Debug, Clone, Copy)]
pub struct LingerOnDeath {
    pub seconds: f32,
}
