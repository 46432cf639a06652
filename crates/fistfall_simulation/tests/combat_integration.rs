//! Combat integration tests
//!
//! Полный стек: headless App + SimulationPlugin, реальные тики.
//! Один app.update() == один тик 60Hz (ManualDuration), поэтому тесты
//! считают тики, а не миллисекунды.

use bevy::prelude::*;
use fistfall_simulation::ai::PursuitTarget;
use fistfall_simulation::combat::proximity::StrikeRangeTracker;
use fistfall_simulation::spawn::spawn_player;
use fistfall_simulation::*;

/// Журнал смертей: EventReader в записывающей системе вместо ручных
/// курсоров в теле теста
#[derive(Resource, Default)]
struct DeathLog(Vec<ActorDied>);

fn record_deaths(mut deaths: EventReader<ActorDied>, mut log: ResMut<DeathLog>) {
    for death in deaths.read() {
        log.0.push(*death);
    }
}

#[derive(Resource, Default)]
struct HitLog(Vec<DamageTaken>);

fn record_hits(mut hits: EventReader<DamageTaken>, mut log: ResMut<HitLog>) {
    for hit in hits.read() {
        log.0.push(*hit);
    }
}

fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.init_resource::<DeathLog>()
        .init_resource::<HitLog>()
        .add_systems(Update, (record_deaths, record_hits));
    app
}

/// Helper: игрок через боевой spawn (flush, чтобы entity был готов сразу)
fn spawn_test_player(app: &mut App, x: f32) -> Entity {
    let tuning = app.world().resource::<SimTuning>().clone();
    let world = app.world_mut();
    let player = {
        let mut commands = world.commands();
        spawn_player(&mut commands, &tuning, Vec2::new(x, 0.0))
    };
    world.flush();
    player
}

/// Helper: враг с фиксированным (обычным) уроном — без RNG-ролла,
/// чтобы тест не зависел от порядка вызовов генератора
fn spawn_test_enemy(app: &mut App, x: f32, target: Entity) -> Entity {
    let tuning = app.world().resource::<SimTuning>().clone();
    app.world_mut()
        .spawn((
            Transform::from_xyz(x, 0.0, 0.0),
            Actor {
                faction: Faction::Enemy,
            },
            Health::new(tuning.enemy_max_health),
            Facing(-1.0),
            CombatState::default(),
            ActionSlot::default(),
            MoveSpeed(tuning.enemy_move_speed),
            Striker {
                damage: tuning.enemy_damage,
                attack_delay: tuning.enemy_attack_delay,
                attack_cooldown: tuning.enemy_attack_cooldown,
                strike_gate: Some(tuning.strike_distance),
            },
            HitVolume {
                half_extents: Vec2::new(tuning.hit_box_width / 2.0, tuning.hit_box_height / 2.0),
                forward_offset: tuning.hit_box_offset,
            },
            BodyExtent {
                half_extents: Vec2::new(tuning.body_width / 2.0, tuning.body_height / 2.0),
            },
            RangeVolume::new(Vec2::new(
                tuning.range_width / 2.0,
                tuning.range_height / 2.0,
            )),
            StrikeRangeTracker::default(),
            PursuitTarget(target),
            LingerOnDeath {
                seconds: tuning.death_linger,
            },
        ))
        .id()
}

fn health_of(app: &App, entity: Entity) -> u32 {
    app.world()
        .get::<Health>(entity)
        .map(|health| health.current())
        .unwrap_or(0)
}

fn state_of(app: &App, entity: Entity) -> CombatState {
    app.world()
        .get::<CombatState>(entity)
        .copied()
        .unwrap_or(CombatState::Dead)
}

/// Крутит тики, пока entity не окажется в state (или паника по бюджету)
fn run_until_state(app: &mut App, entity: Entity, state: CombatState, budget: u32) -> u32 {
    for tick in 0..budget {
        if state_of(app, entity) == state {
            return tick;
        }
        app.update();
    }
    panic!(
        "{:?} never reached {:?} within {} ticks (now {:?})",
        entity,
        state,
        budget,
        state_of(app, entity)
    );
}

/// Test: враг сам сближается с игроком и наносит удар
#[test]
fn enemy_closes_distance_and_lands_strike() {
    let mut app = create_combat_app(42);
    let player = spawn_test_player(&mut app, 0.0);
    let enemy = spawn_test_enemy(&mut app, 6.0, player);

    // 6m при скорости 2 m/s + wind-up 0.3s: 300 тиков хватает с запасом
    run_ticks(&mut app, 300);

    let player_hp = health_of(&app, player);
    assert!(
        player_hp < 100,
        "enemy never landed a strike (player hp {})",
        player_hp
    );
    // Обычный враг бьёт по 30: только кратные значения
    assert_eq!((100 - player_hp) % 30, 0);

    // Враг остановился на дистанции удара, не въехал в игрока
    let enemy_x = app.world().get::<Transform>(enemy).map(|t| t.translation.x);
    if let Some(enemy_x) = enemy_x {
        assert!(
            enemy_x > 0.5,
            "enemy walked through the player (x = {})",
            enemy_x
        );
    }
}

/// Test: урон в wind-up отменяет удар — игрок остаётся целым
#[test]
fn stun_during_windup_cancels_the_strike() {
    let mut app = create_combat_app(42);
    let player = spawn_test_player(&mut app, 0.0);
    let enemy = spawn_test_enemy(&mut app, 1.0, player);

    run_until_state(&mut app, enemy, CombatState::WindingUp, 60);

    app.world_mut().send_event(DamageRequest {
        target: enemy,
        amount: 10,
        source: None,
    });
    app.update();

    assert_eq!(state_of(&app, enemy), CombatState::Stunned);
    assert_eq!(health_of(&app, enemy), 90);

    // Wind-up длился бы 18 тиков; в безопасном окне удар так и не пришёл
    run_ticks(&mut app, 20);
    assert_eq!(health_of(&app, player), 100);

    // После стана враг возвращается в бой и всё-таки бьёт
    run_ticks(&mut app, 60);
    assert!(health_of(&app, player) < 100);
}

/// Test: цель умирает во время замаха атакующего — удар бьёт в пустоту,
/// мёртвому урон не приходит, атакующий уходит в Recovering
#[test]
fn victim_death_during_windup_yields_empty_strike() {
    let mut app = create_combat_app(42);

    // Игроку нужен реальный wind-up для этого сценария
    let mut tuning = app.world().resource::<SimTuning>().clone();
    tuning.player_attack_delay = 0.3;
    app.insert_resource(tuning);

    let player = spawn_test_player(&mut app, 0.0);
    let enemy = spawn_test_enemy(&mut app, 1.0, player);

    if let Some(mut command) = app.world_mut().get_mut::<PlayerCommand>(player) {
        command.attack = true;
    }
    app.update();
    assert_eq!(state_of(&app, player), CombatState::WindingUp);
    if let Some(mut command) = app.world_mut().get_mut::<PlayerCommand>(player) {
        command.attack = false;
    }

    // Добиваем цель внешним уроном посреди замаха
    app.world_mut().send_event(DamageRequest {
        target: enemy,
        amount: 1000,
        source: None,
    });
    app.update();
    assert_eq!(state_of(&app, enemy), CombatState::Dead);
    assert_eq!(health_of(&app, enemy), 0);

    run_ticks(&mut app, 40);

    // Смерть — ровно одна, удар никому не прилетел
    let deaths = &app.world().resource::<DeathLog>().0;
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].entity, enemy);

    let hits = &app.world().resource::<HitLog>().0;
    assert_eq!(
        hits.len(),
        1,
        "only the lethal external hit should be logged, got {:?}",
        hits.len()
    );

    // Атакующий прошёл через Recovering и вернулся в Approaching
    assert_eq!(state_of(&app, player), CombatState::Approaching);
}

/// Test: один замах — максимум одна жертва (ближайшая по |dx|)
#[test]
fn strike_hits_only_the_nearest_of_overlapping_targets() {
    let mut app = create_combat_app(42);
    let player = spawn_test_player(&mut app, 0.0);
    let near = spawn_test_enemy(&mut app, 0.8, player);
    let far = spawn_test_enemy(&mut app, 1.0, player);

    if let Some(mut command) = app.world_mut().get_mut::<PlayerCommand>(player) {
        command.attack = true;
    }
    // attack_delay игрока = 0: удар разрешается в этом же тике
    app.update();

    assert_eq!(health_of(&app, near), 50);
    assert_eq!(health_of(&app, far), 100);
    assert_eq!(state_of(&app, near), CombatState::Stunned);

    let hits = &app.world().resource::<HitLog>().0;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, near);
    assert_eq!(hits[0].amount, 50);
}

/// Test: повторный урон во время стана НЕ перезапускает таймер стана
#[test]
fn stun_timer_does_not_restart_on_repeat_damage() {
    let mut app = create_combat_app(42);
    let player = spawn_test_player(&mut app, 0.0);
    let enemy = spawn_test_enemy(&mut app, 1.0, player);
    app.update();

    app.world_mut().send_event(DamageRequest {
        target: enemy,
        amount: 10,
        source: None,
    });
    app.update();
    assert_eq!(state_of(&app, enemy), CombatState::Stunned);

    // Второй удар на середине стана
    run_ticks(&mut app, 10);
    app.world_mut().send_event(DamageRequest {
        target: enemy,
        amount: 10,
        source: None,
    });
    app.update();
    assert_eq!(state_of(&app, enemy), CombatState::Stunned);
    assert_eq!(health_of(&app, enemy), 80);

    // Исходный стан (18 тиков) к этому моменту истёк; перезапуск держал
    // бы врага в стане ещё ~7 тиков
    run_ticks(&mut app, 11);
    assert_ne!(
        state_of(&app, enemy),
        CombatState::Stunned,
        "stun was restarted by the second hit"
    );
}

/// Test: победа замораживает симуляцию, труп despawn'ится по wall-clock
#[test]
fn won_match_freezes_sim_but_corpse_still_despawns() {
    let mut app = create_combat_app(42);
    let player = spawn_test_player(&mut app, 0.0);
    let enemy = spawn_test_enemy(&mut app, 0.9, player);
    app.insert_resource(MatchContext { player });

    // Спавнера нет — исчерпан по определению; зачистка = победа
    if let Some(mut command) = app.world_mut().get_mut::<PlayerCommand>(player) {
        command.attack = true;
    }

    // Два удара по 50 с кулдауном 0.2s: сотни тиков хватает
    run_ticks(&mut app, 100);

    assert_eq!(*app.world().resource::<MatchState>(), MatchState::Won);
    assert!(app.world().resource::<Time<Virtual>>().is_paused());
    assert_eq!(health_of(&app, player), 100, "enemy never got a strike off");

    // Труп ещё в мире, но без тела и range volume
    assert_eq!(state_of(&app, enemy), CombatState::Dead);
    assert!(app.world().get::<BodyExtent>(enemy).is_none());
    assert!(app.world().get::<RangeVolume>(enemy).is_none());

    // death_linger = 2.0 wall-clock секунды; ManualDuration двигает и
    // Time<Real>, так что 130 кадров достаточно
    run_ticks(&mut app, 130);
    assert!(
        app.world().get_entity(enemy).is_err(),
        "corpse survived its death linger"
    );
}

/// Test: смерть игрока — поражение, виртуальное время замирает
#[test]
fn player_death_loses_the_match() {
    let mut app = create_combat_app(42);
    let player = spawn_test_player(&mut app, 0.0);
    let enemy = spawn_test_enemy(&mut app, 1.0, player);
    app.insert_resource(MatchContext { player });

    // Игрок не сопротивляется: 4 удара по 30 до нуля
    let mut finished = false;
    for _ in 0..1200 {
        app.update();
        if *app.world().resource::<MatchState>() == MatchState::Lost {
            finished = true;
            break;
        }
    }
    assert!(finished, "match never ended");
    assert!(app.world().resource::<Time<Virtual>>().is_paused());

    // У игрока нет linger — он убран из мира сразу
    assert!(app.world().get_entity(player).is_err());

    let deaths = &app.world().resource::<DeathLog>().0;
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].entity, player);
    assert_eq!(deaths[0].killer, Some(enemy));
}
