//! Prefab hierarchy demo.
//!
//! Builds a small tree of ship templates, instantiates one of them, and moves
//! every ship by its impulse speed:
//!
//! ```text
//! Spaceship ── Freighter ── MammothFreighter ── my_mammoth_freighter
//!          └── Frigate
//! ```
//!
//! Speed is shared from the `Spaceship` prefab. `Position` is auto-overridden
//! on `Spaceship`, so every ship linked below it gets a private copy.

mod components;

use anyhow::Result;
use forge_component::{Component, QueryDescriptor};
use forge_world::{World, WorldConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use components::{Attack, Defense, FreightCapacity, HasFtl, ImpulseSpeed, Position};

fn build_fleet(world: &mut World) -> Result<()> {
    let spaceship = world.create_prefab("Spaceship");
    world.set(spaceship, ImpulseSpeed { value: 50.0 })?;
    world.set(spaceship, Defense { value: 50.0 })?;
    world.auto_override::<Position>(spaceship)?;

    let freighter = world.create_prefab("Freighter");
    world.add_is_a(freighter, spaceship)?;
    world.add_tag::<HasFtl>(freighter)?;
    world.set(freighter, FreightCapacity { value: 100.0 })?;
    world.set(freighter, Defense { value: 100.0 })?;

    let mammoth_freighter = world.create_prefab("MammothFreighter");
    world.add_is_a(mammoth_freighter, freighter)?;
    world.set(mammoth_freighter, FreightCapacity { value: 500.0 })?;
    world.set(mammoth_freighter, Defense { value: 300.0 })?;

    let frigate = world.create_prefab("Frigate");
    world.add_is_a(frigate, spaceship)?;
    world.add_tag::<HasFtl>(frigate)?;
    world.set(frigate, Attack { value: 100.0 })?;
    world.set(frigate, Defense { value: 75.0 })?;
    world.set(frigate, ImpulseSpeed { value: 125.0 })?;

    let inst = world.create_named("my_mammoth_freighter");
    world.add_is_a(inst, mammoth_freighter)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("spaceships=info".parse()?))
        .init();

    let mut world = World::with_config(WorldConfig::new("fleet"));
    build_fleet(&mut world)?;

    let inst = world
        .lookup("my_mammoth_freighter")
        .ok_or_else(|| anyhow::anyhow!("instance was not created"))?;

    info!(
        entities = world.entity_count(),
        archetypes = world.archetype_count(),
        "fleet built"
    );
    info!(ty = %world.describe(inst)?, "instance type");

    let ships = QueryDescriptor::new()
        .term(Defense::component_type_id())
        .with_prefabs();
    for row in world.query(&ships)? {
        let entity = row.entity();
        let attack = world.get::<Attack>(entity)?.map(|a| a.value);
        let capacity = world.get::<FreightCapacity>(entity)?.map(|c| c.value);
        info!(
            ship = world.name_of(entity).unwrap_or("<unnamed>"),
            prefab = world.is_prefab(entity)?,
            defense = row.get::<Defense>().map_or(0.0, |d| d.value),
            ?attack,
            ?capacity,
            "ship stats"
        );
    }

    // Not owned by the instance, but reachable through its prefabs.
    if let Some(speed) = world.get::<ImpulseSpeed>(inst)? {
        info!(value = speed.value, "impulse speed");
    }

    let movers = QueryDescriptor::new()
        .term(ImpulseSpeed::component_type_id())
        .term(Position::component_type_id());
    world.each_mut(&movers, |mut row| {
        let speed = row.get::<ImpulseSpeed>().map_or(0.0, |s| s.value);
        let name = row.name().unwrap_or("<unnamed>").to_owned();
        match row.get_mut::<Position>() {
            Ok(position) => {
                position.0.x += speed;
                info!(ship = %name, x = position.0.x, y = position.0.y, "moved");
            }
            Err(err) => info!(ship = %name, %err, "position is shared, not moved"),
        }
    })?;

    Ok(())
}
