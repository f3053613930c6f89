//! End-to-end tests of the built-in systems driven through a [`World`].

use std::cell::Cell;
use std::rc::Rc;

use ember_core::geometry::{IntRect, Size};
use ember_core::math::{UVec2, Vec2};
use ember_entity::action::ACTIONS_PROPERTY;
use ember_entity::systems::{FrameClock, Sprite};
use ember_entity::*;

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct Recorder {
    drawn: Vec<(EntityId, Option<String>)>,
}

impl DrawTarget for Recorder {
    fn draw_sprite(&mut self, sprite: &SpriteDraw<'_>) {
        self.drawn
            .push((sprite.entity, sprite.texture.map(|id| id.to_string())));
    }
}

fn actions(world: &World, entity: EntityId) -> &ActionGroup {
    world
        .entity(entity)
        .and_then(|e| e.properties.get_ref::<ActionGroup>(ACTIONS_PROPERTY))
        .expect("entity has an action group")
}

fn actions_mut(world: &mut World, entity: EntityId) -> &mut ActionGroup {
    world
        .entity_mut(entity)
        .and_then(|e| e.properties.get_mut::<ActionGroup>(ACTIONS_PROPERTY))
        .expect("entity has an action group")
}

/// Adds one to `uTicks` each time it runs.
struct Tick;

impl Action for Tick {
    fn id(&self) -> &str {
        "Tick"
    }

    fn do_action(&self, entity: &mut Entity) {
        let ticks = entity.properties.get::<u32>("uTicks");
        entity.properties.set("uTicks", ticks + 1);
    }
}

/// Disables itself and `Tick`, then counts its own runs.
struct OneShot {
    runs: Rc<Cell<u32>>,
}

impl Action for OneShot {
    fn id(&self) -> &str {
        "OneShot"
    }

    fn do_action(&self, entity: &mut Entity) {
        self.runs.set(self.runs.get() + 1);
        if let Some(group) = entity.properties.get_mut::<ActionGroup>(ACTIONS_PROPERTY) {
            group.disable("OneShot");
            group.disable("Tick");
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn render_paints_in_z_order() {
    let mut world = World::new();
    world.add_system(RenderSystem::new()).unwrap();

    let background = world.spawn_named("background");
    let ship = world.spawn_child(background, "ship").unwrap();
    let flame = world.spawn_child(ship, "flame").unwrap();

    for id in [flame, background, ship] {
        world.add_entity("RenderSystem", id);
    }
    world
        .entity_mut(ship)
        .unwrap()
        .properties
        .set("Sprite", Sprite::new("ship.png"));

    let mut recorder = Recorder::default();
    world.draw(&mut recorder);

    assert_eq!(
        recorder.drawn,
        [
            (background, None),
            (ship, Some("ship.png".to_string())),
            (flame, None),
        ]
    );
    assert_eq!(world.system::<RenderSystem>().unwrap().drawn_last_frame(), 3);
}

#[test]
fn hidden_entities_are_skipped() {
    let mut world = World::new();
    world.add_system(RenderSystem::new()).unwrap();
    let a = world.spawn();
    let b = world.spawn();
    world.add_entity("RenderSystem", a);
    world.add_entity("RenderSystem", b);
    world.entity_mut(a).unwrap().properties.set("bVisible", false);

    let mut recorder = Recorder::default();
    world.draw(&mut recorder);

    assert_eq!(recorder.drawn, [(b, None)]);
}

// ============================================================================
// Movement and animation
// ============================================================================

#[test]
fn fixed_and_variable_movers_step_on_their_own_updates() {
    let mut world = World::new();
    world.add_system(MovementSystem::new(Size::new(800, 600))).unwrap();
    let fixed = world.spawn();
    let smooth = world.spawn();
    world.add_entity("MovementSystem", fixed);
    world.add_entity("MovementSystem", smooth);

    let props = &mut world.entity_mut(fixed).unwrap().properties;
    props.set("vVelocity", Vec2::new(2.0, 0.0));
    let props = &mut world.entity_mut(smooth).unwrap().properties;
    props.set("vVelocity", Vec2::new(10.0, 0.0));
    props.set("bFixedMovement", false);

    world.update_fixed();
    world.update_variable(0.5);

    let position = |id| world.entity(id).unwrap().properties.get::<Vec2>("vPosition");
    assert_eq!(position(fixed), Vec2::new(2.0, 0.0));
    assert_eq!(position(smooth), Vec2::new(5.0, 0.0));
}

#[test]
fn immovable_entities_stay_put() {
    let mut world = World::new();
    world.add_system(MovementSystem::new(Size::new(800, 600))).unwrap();
    let rock = world.spawn();
    world.add_entity("MovementSystem", rock);
    let props = &mut world.entity_mut(rock).unwrap().properties;
    props.set("vVelocity", Vec2::new(3.0, 3.0));
    props.set("bMovable", false);

    world.update_fixed();

    assert_eq!(
        world.entity(rock).unwrap().properties.get::<Vec2>("vPosition"),
        Vec2::ZERO
    );
}

#[test]
fn animation_advances_after_the_frame_delay() {
    let mut world = World::new();
    world.add_system(AnimationSystem::new()).unwrap();
    let coin = world.spawn();
    world.add_entity("AnimationSystem", coin);
    let props = &mut world.entity_mut(coin).unwrap().properties;
    props.set("fFrameDelay", 0.25f32);
    props.set("wFrameModifier", UVec2::new(1, 0));
    props.set("rFrameRect", IntRect::new(0, 0, 64, 16));
    props.set("rSpriteRect", IntRect::new(0, 0, 16, 16));

    let sprite_left = |world: &World| {
        world
            .entity(coin)
            .unwrap()
            .properties
            .get::<IntRect>("rSpriteRect")
            .left
    };

    world.update_variable(0.2);
    world.update_fixed();
    assert_eq!(sprite_left(&world), 0);

    world.update_variable(0.1);
    world.update_fixed();
    assert_eq!(sprite_left(&world), 16);
    assert_eq!(
        world.entity(coin).unwrap().properties.get::<FrameClock>("FrameClock"),
        FrameClock::default()
    );
}

// ============================================================================
// Actions
// ============================================================================

#[test]
fn active_actions_run_once_per_fixed_update() {
    let mut world = World::new();
    let mut system = ActionSystem::new();
    system.add_action(Tick);
    world.add_system(system).unwrap();

    let ship = world.spawn();
    world.add_entity("ActionSystem", ship);
    world.entity_mut(ship).unwrap().properties.add("uTicks", 0u32);

    actions_mut(&mut world, ship).add("Tick");
    world.update_fixed();
    assert_eq!(world.entity(ship).unwrap().properties.get::<u32>("uTicks"), 0);

    actions_mut(&mut world, ship).activate("Tick");
    actions_mut(&mut world, ship).activate("Tick");
    world.update_fixed();
    world.update_fixed();
    assert_eq!(world.entity(ship).unwrap().properties.get::<u32>("uTicks"), 2);
    assert_eq!(actions(&world, ship).active_ids().collect::<Vec<_>>(), ["Tick"]);
}

#[test]
fn action_disabling_itself_mid_dispatch_runs_once() {
    let runs = Rc::new(Cell::new(0));
    let mut world = World::new();
    let mut system = ActionSystem::new();
    system.add_action(OneShot {
        runs: Rc::clone(&runs),
    });
    system.add_action(Tick);
    world.add_system(system).unwrap();

    let ship = world.spawn();
    world.add_entity("ActionSystem", ship);
    world.entity_mut(ship).unwrap().properties.add("uTicks", 0u32);
    let group = actions_mut(&mut world, ship);
    group.add("OneShot");
    group.add("Tick");
    group.activate("OneShot");
    group.activate("Tick");

    world.update_fixed();
    world.update_fixed();

    assert_eq!(runs.get(), 1);
    // Tick was disabled before its turn in the same dispatch.
    assert_eq!(world.entity(ship).unwrap().properties.get::<u32>("uTicks"), 0);
    let group = actions(&world, ship);
    assert_eq!(group.active_ids().count(), 0);
    assert_eq!(group.disabled_ids().collect::<Vec<_>>(), ["OneShot", "Tick"]);
}

#[test]
fn cloned_properties_share_the_catalog() {
    let mut world = World::new();
    let mut system = ActionSystem::new();
    system.add_action(Tick);
    world.add_system(system).unwrap();

    let original = world.spawn();
    world.add_entity("ActionSystem", original);
    actions_mut(&mut world, original).add("Tick");

    let copy = world.spawn();
    let source = world.entity(original).unwrap().properties.clone();
    world
        .entity_mut(copy)
        .unwrap()
        .properties
        .clone_properties(&source);

    assert!(actions(&world, copy).is_available("Tick"));
    actions_mut(&mut world, copy).activate("Tick");
    assert!(!actions(&world, original).is_active("Tick"));
}
