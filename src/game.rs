//! The sandbox level: a bevy [`World`] of mobs driven by the game loop.
//!
//! [`Level`] implements [`GameWorld`]. Each tick advances [`WorldTime`] and
//! then runs the entity schedule (movement, animation, out-of-bounds
//! correction, in that order) on a single thread.
//!
//! Mobs are spawned from [`Bestiary`] templates. Any parts a template lists
//! are spawned as children of the mob and drawn right after it at their
//! composed global position.
//!
//! # Save payload
//!
//! ```text
//! mob count         i32 BE
//! per mob, in spawn order:
//!   kind            u16 BE length + UTF-8
//!   mob record      see Mob::save
//! ```
//!
//! Loading reads the whole payload before touching the world, so a failed
//! load leaves the current mobs in place.

use std::io::{Read, Write};
use std::num::NonZeroU32;

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use glam::Vec2;
use log::{info, warn};

use crate::components::localtransform::LocalTransform;
use crate::components::mob::{Mob, MobKind, SpawnOrder};
use crate::components::mover::Mover;
use crate::components::sprite::AnimatedSprite;
use crate::components::transform::Transform;
use crate::gameloop::GameWorld;
use crate::render::RenderItem;
use crate::resources::bestiary::Bestiary;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldbounds::WorldBounds;
use crate::resources::worldtime::WorldTime;
use crate::savegame::{PersistError, ReadExt, WriteExt};
use crate::systems::animation::animate_mobs;
use crate::systems::bounds::correct_mobs_out_of_bounds;
use crate::systems::hierarchy::{global_transform, spawn_part};
use crate::systems::movement::movement;
use crate::systems::time::update_world_time;

/// Fastest a populated mob moves on either axis, in pixels per second.
const MAX_SPAWN_SPEED: f32 = 120.0;

/// A mob read from a savegame, not yet in the world.
struct MobRecord {
    kind: String,
    transform: Transform,
    mover: Mover,
    mob: Mob,
    sprite: AnimatedSprite,
}

pub struct Level {
    world: World,
    entity_schedule: Schedule,
    tick_seconds: f32,
    ticks_per_frame: NonZeroU32,
    next_spawn: u64,
}

impl Level {
    pub fn new(width: u32, height: u32, ticks_per_second: u32, ticks_per_frame: NonZeroU32) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldBounds::new(width, height));
        world.insert_resource(WorldTime::default());
        world.insert_resource(Bestiary::sandbox());

        let mut entity_schedule = Schedule::default();
        entity_schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        entity_schedule.add_systems((movement, animate_mobs, correct_mobs_out_of_bounds).chain());

        Self {
            world,
            entity_schedule,
            tick_seconds: 1.0 / ticks_per_second.max(1) as f32,
            ticks_per_frame,
            next_spawn: 0,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.window_width,
            config.window_height,
            config.ticks_per_second,
            config.ticks_per_frame,
        )
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn time(&self) -> WorldTime {
        *self.world.resource::<WorldTime>()
    }

    /// Spawn a mob of `kind` with its template parts.
    ///
    /// Returns `None` if the bestiary has no such kind.
    pub fn spawn_mob(&mut self, kind: &str, position: Vec2, velocity: Vec2) -> Option<Entity> {
        let Some(template) = self.world.resource::<Bestiary>().get(kind) else {
            warn!("Cannot spawn unknown mob kind {:?}", kind);
            return None;
        };
        let record = MobRecord {
            kind: kind.to_string(),
            transform: Transform::from_xy(position.x, position.y),
            mover: Mover::new(velocity),
            mob: template.mob(self.ticks_per_frame),
            sprite: template.sprite(),
        };
        Some(self.insert_mob(record))
    }

    /// Spawn `count` mobs of random kinds at random positions and velocities.
    ///
    /// The same `seed` always produces the same mobs.
    pub fn populate(&mut self, count: usize, seed: u64) -> Vec<Entity> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let bounds = *self.world.resource::<WorldBounds>();
        let kinds: Vec<(String, u32, u32)> = {
            let bestiary = self.world.resource::<Bestiary>();
            bestiary
                .kinds()
                .into_iter()
                .filter_map(|kind| {
                    bestiary
                        .get(kind)
                        .map(|t| (kind.to_string(), t.width, t.height))
                })
                .collect()
        };
        if kinds.is_empty() {
            warn!("Bestiary is empty, nothing to populate");
            return Vec::new();
        }

        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let (kind, width, height) = &kinds[rng.usize(..kinds.len())];
            let position = Vec2::new(
                rng.f32() * bounds.width.saturating_sub(*width) as f32,
                rng.f32() * bounds.height.saturating_sub(*height) as f32,
            );
            let velocity = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0) * MAX_SPAWN_SPEED;
            if let Some(entity) = self.spawn_mob(kind, position, velocity) {
                spawned.push(entity);
            }
        }
        info!("Populated level with {} mobs (seed {})", spawned.len(), seed);
        spawned
    }

    /// All mobs, in spawn order.
    pub fn mobs(&mut self) -> Vec<Entity> {
        let mut query = self
            .world
            .query_filtered::<(Entity, &SpawnOrder), With<Mob>>();
        let mut mobs: Vec<(Entity, SpawnOrder)> =
            query.iter(&self.world).map(|(e, o)| (e, *o)).collect();
        mobs.sort_by_key(|(entity, order)| (*order, *entity));
        mobs.into_iter().map(|(entity, _)| entity).collect()
    }

    pub fn mob_count(&mut self) -> usize {
        self.mobs().len()
    }

    /// Despawn every mob along with its parts.
    pub fn clear_mobs(&mut self) {
        for mob in self.mobs() {
            self.world.despawn(mob);
        }
    }

    fn insert_mob(&mut self, record: MobRecord) -> Entity {
        let parts = self
            .world
            .resource::<Bestiary>()
            .get(&record.kind)
            .map(|t| t.parts.clone())
            .unwrap_or_default();

        let owner = self
            .world
            .spawn((
                MobKind(record.kind),
                record.transform,
                record.mover,
                record.mob,
                record.sprite,
                SpawnOrder(self.next_spawn),
            ))
            .id();
        self.next_spawn += 1;

        for part in parts {
            spawn_part(
                &mut self.world,
                Some(owner),
                part.local,
                AnimatedSprite::still(part.tex_key, part.width, part.height),
            );
        }
        owner
    }

    fn read_mob(&self, input: &mut dyn Read, version: &str) -> Result<MobRecord, PersistError> {
        let kind = input.read_str_be()?;
        let template = self
            .world
            .resource::<Bestiary>()
            .get(&kind)
            .ok_or_else(|| PersistError::UnknownKind(kind.clone()))?;

        let mut transform = Transform::default();
        let mut mover = Mover::default();
        let mut mob = template.mob(self.ticks_per_frame);
        let mut sprite = template.sprite();
        mob.load(&mut transform, &mut mover, &mut sprite, &mut *input, version)?;

        Ok(MobRecord {
            kind,
            transform,
            mover,
            mob,
            sprite,
        })
    }
}

fn render_item(sprite: &AnimatedSprite, position: Vec2) -> RenderItem {
    RenderItem {
        tex_key: sprite.tex_key.clone(),
        frame: sprite.frame(),
        x: position.x,
        y: position.y,
        width: sprite.width(),
        height: sprite.height(),
    }
}

impl GameWorld for Level {
    fn tick(&mut self) {
        update_world_time(&mut self.world, self.tick_seconds);
    }

    fn call_tick(&mut self) {
        self.entity_schedule.run(&mut self.world);
    }

    fn width(&self) -> u32 {
        self.world.resource::<WorldBounds>().width
    }

    fn height(&self) -> u32 {
        self.world.resource::<WorldBounds>().height
    }

    /// Owners in spawn order, each followed by its parts, then standalone parts.
    fn entities(&mut self) -> Vec<RenderItem> {
        let mut owners = self.world.query_filtered::<
            (Entity, Option<&SpawnOrder>, &Transform, &AnimatedSprite),
            Without<LocalTransform>,
        >();
        let mut roots: Vec<(Option<SpawnOrder>, Entity, RenderItem)> = owners
            .iter(&self.world)
            .map(|(entity, order, transform, sprite)| {
                (order.copied(), entity, render_item(sprite, transform.position))
            })
            .collect();
        roots.sort_by_key(|(order, entity, _)| (*order, *entity));

        let mut items = Vec::with_capacity(roots.len());
        for (_, entity, item) in roots {
            items.push(item);
            let Some(children) = self.world.get::<Children>(entity) else {
                continue;
            };
            for part in children.to_vec() {
                let (Some(sprite), Some(global)) = (
                    self.world.get::<AnimatedSprite>(part),
                    global_transform(&self.world, part),
                ) else {
                    continue;
                };
                items.push(render_item(sprite, global.position));
            }
        }

        let mut standalone = self
            .world
            .query_filtered::<(Entity, &LocalTransform, &AnimatedSprite), Without<ChildOf>>();
        let mut loose: Vec<(Entity, RenderItem)> = standalone
            .iter(&self.world)
            .map(|(entity, local, sprite)| (entity, render_item(sprite, local.global_position(None))))
            .collect();
        loose.sort_by_key(|(entity, _)| *entity);
        items.extend(loose.into_iter().map(|(_, item)| item));

        items
    }

    fn save(&mut self, out: &mut dyn Write) -> Result<(), PersistError> {
        let mut query = self
            .world
            .query::<(&SpawnOrder, &MobKind, &Mob, &Transform, &Mover, &AnimatedSprite)>();
        let mut mobs: Vec<_> = query.iter(&self.world).collect();
        mobs.sort_by_key(|(order, ..)| **order);

        let count = i32::try_from(mobs.len())
            .map_err(|_| PersistError::Corrupt(format!("{} mobs", mobs.len())))?;
        out.write_i32_be(count)?;
        for (_, kind, mob, transform, mover, sprite) in mobs {
            out.write_str_be(&kind.0)?;
            mob.save(transform, mover, sprite, &mut *out)?;
        }
        Ok(())
    }

    fn load(&mut self, input: &mut dyn Read, version: &str) -> Result<(), PersistError> {
        let count = input.read_i32_be()?;
        if count < 0 {
            return Err(PersistError::Corrupt(format!("negative mob count {}", count)));
        }

        let mut records = Vec::new();
        for _ in 0..count {
            records.push(self.read_mob(&mut *input, version)?);
        }

        self.clear_mobs();
        let loaded = records.len();
        for record in records {
            self.insert_mob(record);
        }
        info!("Loaded {} mobs", loaded);
        Ok(())
    }
}
