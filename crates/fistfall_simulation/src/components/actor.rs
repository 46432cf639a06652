//! Акторы: фракции, здоровье, ориентация

use bevy::prelude::*;

/// Сторона конфликта
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    /// Враждебны ли фракции друг другу
    pub fn opposes(&self, other: Faction) -> bool {
        *self != other
    }
}

/// Актор симуляции (игрок или враг)
#[derive(Component, Debug, Clone, Copy)]
pub struct Actor {
    pub faction: Faction,
}

/// Результат одного применения урона
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Сколько реально снято (после clamp к текущему здоровью)
    pub applied: u32,
    /// Здоровье перешло >0 → 0 именно этим применением
    pub died: bool,
    /// Цель уже была мертва — применение проигнорировано целиком
    pub ignored: bool,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max. Единственный путь мутации — `apply_damage`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Применяет урон. No-op если актор уже мертв.
    ///
    /// `applied` клампится так что current никогда не уходит ниже нуля;
    /// `died` взводится ровно один раз за жизнь актора — на применении,
    /// которое довело current до нуля.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome {
                applied: 0,
                died: false,
                ignored: true,
            };
        }

        let applied = amount.min(self.current);
        self.current -= applied;

        DamageOutcome {
            applied,
            died: self.current == 0,
            ignored: false,
        }
    }
}

/// Ориентация по горизонтальной оси: +1.0 вправо, -1.0 влево
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub f32);

impl Facing {
    /// Обновляет ориентацию по знаку горизонтального смещения (0 — не меняет)
    pub fn turn_towards(&mut self, dx: f32) {
        if dx > 0.0 {
            self.0 = 1.0;
        } else if dx < 0.0 {
            self.0 = -1.0;
        }
    }
}

/// Скорость передвижения (units/sec)
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub f32);
