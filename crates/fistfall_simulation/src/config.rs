//! Тюнинг симуляции
//!
//! Все числа боя в одном ресурсе: урон, тайминги, геометрия хитбоксов,
//! спавн. Defaults соответствуют балансу оригинального прототипа;
//! хост может переопределить их JSON-документом (аналог inspector-значений).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Ошибка загрузки тюнинга из файла
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Боевой тюнинг (ресурс)
///
/// `#[serde(default)]` — частичный JSON переопределяет только указанные поля.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTuning {
    // Игрок
    pub player_max_health: u32,
    pub player_damage: u32,
    /// Задержка до удара после команды (секунды); 0 — удар в тот же тик
    pub player_attack_delay: f32,
    pub player_attack_cooldown: f32,
    pub player_move_speed: f32,

    // Враг
    pub enemy_max_health: u32,
    pub enemy_damage: u32,
    /// Урон "сильного" варианта (50% шанс при спавне)
    pub enemy_strong_damage: u32,
    pub enemy_attack_delay: f32,
    pub enemy_attack_cooldown: f32,
    pub enemy_move_speed: f32,

    // Дистанции и объёмы
    /// Порог удара по горизонтальной оси: ближе — можно бить, дальше — догонять
    pub strike_distance: f32,
    /// Допуск к strike_distance при повторной проверке в момент удара
    pub strike_grace: f32,
    pub hit_box_offset: f32,
    pub hit_box_width: f32,
    pub hit_box_height: f32,
    pub body_width: f32,
    pub body_height: f32,
    pub range_width: f32,
    pub range_height: f32,

    // Состояния
    pub stun_duration: f32,
    /// Сколько труп врага остаётся в мире (wall-clock секунды)
    pub death_linger: f32,

    // Спавн
    pub spawn_interval: f32,
    pub spawn_jitter: f32,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            player_max_health: 100,
            player_damage: 50,
            player_attack_delay: 0.0,
            player_attack_cooldown: 0.2,
            player_move_speed: 5.0,

            enemy_max_health: 100,
            enemy_damage: 30,
            enemy_strong_damage: 60,
            enemy_attack_delay: 0.3,
            enemy_attack_cooldown: 2.0,
            enemy_move_speed: 2.0,

            strike_distance: 1.5,
            strike_grace: 0.1,
            hit_box_offset: 0.65,
            hit_box_width: 1.0,
            hit_box_height: 1.0,
            body_width: 0.6,
            body_height: 1.6,
            range_width: 3.6,
            range_height: 2.0,

            stun_duration: 0.3,
            death_linger: 2.0,

            spawn_interval: 3.0,
            spawn_jitter: 1.5,
        }
    }
}

impl SimTuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning = SimTuning::from_json(r#"{ "enemy_damage": 45, "stun_duration": 0.5 }"#)
            .expect("valid json");

        assert_eq!(tuning.enemy_damage, 45);
        assert_eq!(tuning.stun_duration, 0.5);
        // Остальное — defaults
        assert_eq!(tuning.player_damage, 50);
        assert_eq!(tuning.enemy_strong_damage, 60);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SimTuning::from_json("{ not json").is_err());
    }
}
