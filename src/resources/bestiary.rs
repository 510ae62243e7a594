//! Mob templates keyed by kind.
//!
//! Savegames only store a mob's kind and its mutable state; everything else
//! (sprite sheet, hitbox, attached parts) is rebuilt from the template here.

use std::num::NonZeroU32;

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::components::hitbox::Hitbox;
use crate::components::localtransform::LocalTransform;
use crate::components::mob::Mob;
use crate::components::sprite::AnimatedSprite;

/// A part attached to every mob spawned from a template.
#[derive(Debug, Clone)]
pub struct PartTemplate {
    pub tex_key: String,
    pub width: u32,
    pub height: u32,
    pub local: LocalTransform,
}

#[derive(Debug, Clone)]
pub struct MobTemplate {
    pub tex_key: String,
    pub frame_count: i32,
    pub width: u32,
    pub height: u32,
    pub hitbox: Hitbox,
    pub parts: Vec<PartTemplate>,
}

impl MobTemplate {
    pub fn sprite(&self) -> AnimatedSprite {
        AnimatedSprite::new(self.tex_key.clone(), self.frame_count, self.width, self.height)
    }

    pub fn mob(&self, ticks_per_frame: NonZeroU32) -> Mob {
        Mob::new(self.hitbox, ticks_per_frame)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Bestiary {
    templates: FxHashMap<String, MobTemplate>,
}

impl Bestiary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: impl Into<String>, template: MobTemplate) {
        self.templates.insert(kind.into(), template);
    }

    pub fn get(&self, kind: &str) -> Option<&MobTemplate> {
        self.templates.get(kind)
    }

    /// Kinds in a stable (sorted) order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// The sandbox roster: a four-frame baddie with an eye on top and a
    /// slower two-frame blob.
    pub fn sandbox() -> Self {
        let mut bestiary = Self::new();
        bestiary.insert(
            "baddie",
            MobTemplate {
                tex_key: "baddie".into(),
                frame_count: 4,
                width: 16,
                height: 16,
                hitbox: Hitbox::new(12, 12).with_offset(2, 2),
                parts: vec![PartTemplate {
                    tex_key: "eye".into(),
                    width: 4,
                    height: 4,
                    local: LocalTransform::from_xy(6.0, -5.0),
                }],
            },
        );
        bestiary.insert(
            "blob",
            MobTemplate {
                tex_key: "blob".into(),
                frame_count: 2,
                width: 24,
                height: 12,
                hitbox: Hitbox::new(24, 10).with_offset(0, 2),
                parts: Vec::new(),
            },
        );
        bestiary
    }
}
