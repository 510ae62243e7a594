//! Integration tests for mob ticking and persistence through a level.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test mob_integration
//! ```

use std::io::Cursor;
use std::num::NonZeroU32;

use bevy_ecs::prelude::*;
use glam::Vec2;

use gimbal::components::hitbox::Hitbox;
use gimbal::components::mob::{Mob, MobKind};
use gimbal::components::mover::Mover;
use gimbal::components::sprite::AnimatedSprite;
use gimbal::components::transform::Transform;
use gimbal::game::Level;
use gimbal::gameloop::GameWorld;
use gimbal::resources::worldbounds::WorldBounds;
use gimbal::resources::worldtime::WorldTime;
use gimbal::savegame::{QuickSave, SAVE_VERSION};
use gimbal::systems::animation::animate_mobs;
use gimbal::systems::bounds::correct_mobs_out_of_bounds;
use gimbal::systems::movement::movement;

fn ticks_per_frame(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

fn make_world(delta: f32) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime {
        elapsed: 0.0,
        delta,
        ticks: 0,
    });
    world.insert_resource(WorldBounds::new(800, 500));
    world
}

fn entity_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((movement, animate_mobs, correct_mobs_out_of_bounds).chain());
    schedule
}

fn spawn_mob(world: &mut World, position: Vec2, velocity: Vec2, size: u32) -> Entity {
    world
        .spawn((
            MobKind("blob".into()),
            Transform::from_xy(position.x, position.y),
            Mover::new(velocity),
            Mob::new(Hitbox::new(size as i32, size as i32), ticks_per_frame(5)),
            AnimatedSprite::new("blob", 4, size, size),
        ))
        .id()
}

// =============================================================================
// Systems
// =============================================================================

#[test]
fn five_ticks_advance_animation_once_after_first() {
    let mut world = make_world(0.0);
    let mob = spawn_mob(&mut world, Vec2::new(10.0, 10.0), Vec2::ZERO, 16);
    let mut schedule = entity_schedule();

    schedule.run(&mut world); // timer 0: advances immediately
    assert_eq!(world.get::<AnimatedSprite>(mob).unwrap().frame(), 1);

    for _ in 0..4 {
        schedule.run(&mut world);
    }
    assert_eq!(world.get::<AnimatedSprite>(mob).unwrap().frame(), 1);

    schedule.run(&mut world);
    assert_eq!(world.get::<AnimatedSprite>(mob).unwrap().frame(), 2);
}

#[test]
fn mob_moving_right_stops_one_pixel_inside_edge() {
    let mut world = make_world(1.0);
    let mob = spawn_mob(&mut world, Vec2::new(700.0, 100.0), Vec2::new(60.0, 0.0), 50);
    let mut schedule = entity_schedule();

    schedule.run(&mut world);
    assert_eq!(world.get::<Transform>(mob).unwrap().position.x, 749.0);
    schedule.run(&mut world);
    assert_eq!(world.get::<Transform>(mob).unwrap().position.x, 749.0);
    // Velocity is left alone.
    assert_eq!(world.get::<Mover>(mob).unwrap().velocity, Vec2::new(60.0, 0.0));
}

#[test]
fn mob_moving_up_is_clamped_to_zero() {
    let mut world = make_world(1.0);
    let mob = spawn_mob(&mut world, Vec2::new(10.0, 3.0), Vec2::new(0.0, -8.0), 16);
    entity_schedule().run(&mut world);
    assert_eq!(world.get::<Transform>(mob).unwrap().position, Vec2::new(10.0, 0.0));
}

#[test]
fn non_mobs_are_not_clamped() {
    let mut world = make_world(1.0);
    let rock = world
        .spawn((
            Transform::from_xy(900.0, -20.0),
            Mover::default(),
            AnimatedSprite::still("rock", 8, 8),
        ))
        .id();
    entity_schedule().run(&mut world);
    assert_eq!(world.get::<Transform>(rock).unwrap().position, Vec2::new(900.0, -20.0));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn mob_record_round_trips_through_stream() {
    let transform = Transform::from_xy(123.25, -4.5);
    let mover = Mover::new(Vec2::new(-3.0, 0.125));
    let mut mob = Mob::new(Hitbox::new(8, 8), ticks_per_frame(5));
    mob.animation_timer = 42;
    let mut sprite = AnimatedSprite::new("blob", 4, 8, 8);
    sprite.set_frame(3);

    let mut buf = Vec::new();
    mob.save(&transform, &mover, &sprite, &mut buf).unwrap();
    assert_eq!(buf.len(), 4 * 8 + 4 + 4);

    let mut loaded_transform = Transform::default();
    let mut loaded_mover = Mover::default();
    let mut loaded_mob = Mob::new(Hitbox::new(8, 8), ticks_per_frame(5));
    let mut loaded_sprite = AnimatedSprite::new("blob", 4, 8, 8);
    loaded_mob
        .load(
            &mut loaded_transform,
            &mut loaded_mover,
            &mut loaded_sprite,
            &mut Cursor::new(buf),
            SAVE_VERSION,
        )
        .unwrap();

    assert_eq!(loaded_transform.position, transform.position);
    assert_eq!(loaded_mover, mover);
    assert_eq!(loaded_mob.animation_timer, 42);
    assert_eq!(loaded_sprite.frame(), 3);
}

#[test]
fn quicksave_slot_round_trips_level() {
    let dir = tempfile::tempdir().unwrap();
    let slot = QuickSave::new(dir.path().join("saves"), "slot1");

    let mut level = Level::new(320, 200, 60, ticks_per_frame(3));
    level.populate(8, 99);
    for _ in 0..11 {
        level.tick();
        level.call_tick();
    }
    let before = level.entities();

    let path = slot.save(&mut level).unwrap();
    assert!(path.ends_with("saves/slot1.sav"));

    // Keep running so the live state diverges, then restore.
    for _ in 0..30 {
        level.tick();
        level.call_tick();
    }
    assert_ne!(level.entities(), before);

    slot.load(&mut level).unwrap();
    assert_eq!(level.mob_count(), 8);
    assert_eq!(level.entities(), before);
}

#[test]
fn loading_a_missing_slot_fails_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let slot = QuickSave::new(dir.path(), "nothing");
    let mut level = Level::new(320, 200, 60, ticks_per_frame(3));
    level.spawn_mob("blob", Vec2::new(5.0, 5.0), Vec2::ZERO);

    assert!(!slot.exists());
    assert!(slot.load(&mut level).is_err());
    assert_eq!(level.mob_count(), 1);
}
