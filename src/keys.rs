//! Dictionary keys for game objects.
//!
//! Object names use the server API's enum spelling (`INSTANT_HEAL`,
//! `oak_wall_sign`); keys come out lowercase. A few names differ from the
//! dictionary wording and are remapped through the tables below.

use std::fmt;

/// Potion names whose dictionary suffix differs from the type name.
static POTION_RENAMES: &[(&str, &str)] = &[
    ("regen", "regeneration"),
    ("instant_heal", "healing"),
    ("instant_damage", "harming"),
    ("jump", "leaping"),
    ("uncraftable", "empty"),
    ("speed", "swiftness"),
];

/// Legacy effect names and their dictionary suffix.
static EFFECT_RENAMES: &[(&str, &str)] = &[
    ("slow", "slowness"),
    ("fast_digging", "haste"),
    ("slow_digging", "mining_fatigue"),
    ("increase_damage", "strength"),
    ("heal", "instant_health"),
    ("harm", "instant_damage"),
    ("jump", "jump_boost"),
    ("confusion", "nausea"),
    ("damage_resistance", "resistance"),
];

/// Key used when an effect is absent.
pub const NO_EFFECT: &str = "effect.none";

/// Key used for entity types without a name.
pub const UNKNOWN_ENTITY: &str = "entity.notFound";

/// Bottle a potion comes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PotionSort {
    /// Drinkable
    Potion,
    /// Thrown
    SplashPotion,
    /// Thrown, leaves a cloud
    LingeringPotion,
}

impl fmt::Display for PotionSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Potion => "potion",
            Self::SplashPotion => "splash_potion",
            Self::LingeringPotion => "lingering_potion",
        })
    }
}

/// Dictionary suffix for `name`, or `name` itself when the table has no entry.
fn rename<'a>(table: &[(&str, &'a str)], name: &'a str) -> &'a str {
    table.iter().find(|(from, _)| *from == name).map_or(name, |(_, to)| *to)
}

/// `None` for the `custom` biome, which has no dictionary entry.
#[must_use]
pub fn biome(name: &str) -> Option<String> {
    let name = name.to_lowercase();
    (name != "custom").then(|| format!("biome.minecraft.{name}"))
}

/// Wall variants share the key of their standing block.
#[must_use]
pub fn material(name: &str, is_block: bool) -> String {
    let name = name.to_lowercase().replace("wall_", "");
    let kind = if is_block { "block" } else { "item" };
    format!("{kind}.minecraft.{name}")
}

/// Key of a potion type in the given bottle.
#[must_use]
pub fn potion(name: &str, sort: PotionSort) -> String {
    let name = name.to_lowercase();
    format!("item.minecraft.{sort}.effect.{}", rename(POTION_RENAMES, &name))
}

/// Key of an effect type, [`NO_EFFECT`] for none.
#[must_use]
pub fn effect(name: Option<&str>) -> String {
    let Some(name) = name else {
        return NO_EFFECT.to_string();
    };
    let name = name.to_lowercase();
    format!("effect.minecraft.{}", rename(EFFECT_RENAMES, &name))
}

/// Key of an enchantment.
#[must_use]
pub fn enchantment(name: &str) -> String {
    format!("enchantment.minecraft.{}", name.to_lowercase())
}

/// Key of an entity type, [`UNKNOWN_ENTITY`] for none.
#[must_use]
pub fn entity(name: Option<&str>) -> String {
    name.map_or_else(
        || UNKNOWN_ENTITY.to_string(),
        |name| format!("entity.minecraft.{}", name.to_lowercase()),
    )
}

/// Key of a villager profession.
#[must_use]
pub fn villager_profession(name: &str) -> String {
    format!("entity.minecraft.villager.{}", name.to_lowercase())
}

/// Legacy careers are spelled without underscores in the dictionary.
#[must_use]
pub fn villager_career(name: &str) -> String {
    format!("entity.minecraft.villager.{}", name.replace('_', "").to_lowercase())
}

/// Key of a tropical fish pattern.
#[must_use]
pub fn tropical_fish(pattern: &str) -> String {
    format!("entity.minecraft.tropical_fish.type.{}", pattern.to_lowercase())
}
