/// Game-logic functions over the `World`.
///
/// Every public function takes the world by mutable reference and, where it
/// needs randomness, an injected RNG handle.  Side effects are limited to the
/// world and that RNG, so a seeded RNG gives a fully reproducible run.

use std::ops::ControlFlow;

use rand::Rng;

use crate::collision::{match_pairs, overlapping, Rect};
use crate::entities::{
    Direction, Entity, Hazard, InputEvent, Phase, Pickup, Player, Projectile, World, MAX_LIVES,
};
use crate::settings::Settings;

/// Score awarded per hazard destroyed by a projectile.
pub const SCORE_PER_HAZARD: u32 = 10;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh session: full lives, the initial hazard wave, nothing else.
pub fn new_world(settings: Settings, rng: &mut impl Rng) -> World {
    let hazards = initial_hazards(rng, &settings);
    World {
        player: Player::new(&settings),
        projectiles: Vec::new(),
        hazards,
        pickups: Vec::new(),
        score: 0,
        phase: Phase::Running,
        pickup_spawn_timer: 0,
        pending_move: Direction::None,
        frame: 0,
        settings,
    }
}

fn initial_hazards(rng: &mut impl Rng, settings: &Settings) -> Vec<Hazard> {
    (0..settings.initial_hazards)
        .map(|_| Hazard::spawn(rng, settings))
        .collect()
}

/// Start a new session in place.  The player is reset rather than rebuilt;
/// every entity collection is replaced wholesale.
pub fn restart(world: &mut World, rng: &mut impl Rng) {
    world.player.reset();
    world.projectiles = Vec::new();
    world.pickups = Vec::new();
    world.hazards = initial_hazards(rng, &world.settings);
    world.score = 0;
    world.pickup_spawn_timer = 0;
    world.pending_move = Direction::None;
    world.frame = 0;
    world.phase = Phase::Running;
    log::info!("Restarted with {} hazards", world.hazards.len());
}

// ── Input ────────────────────────────────────────────────────────────────────

/// Apply one input event.  Returns `Break` when the player asked to quit.
///
/// Events that make no sense in the current phase are ignored.
pub fn handle_input(
    world: &mut World,
    event: InputEvent,
    rng: &mut impl Rng,
) -> ControlFlow<()> {
    match event {
        InputEvent::Quit => return ControlFlow::Break(()),
        InputEvent::MoveLeft if world.phase == Phase::Running => {
            world.pending_move = Direction::Left;
        }
        InputEvent::MoveRight if world.phase == Phase::Running => {
            world.pending_move = Direction::Right;
        }
        InputEvent::Fire if world.phase == Phase::Running => {
            let shot = Projectile::fire_from(&world.player, world.settings.projectile_speed);
            world.projectiles.push(shot);
        }
        InputEvent::TogglePause => match world.phase {
            Phase::Running => {
                world.phase = Phase::Paused;
                log::info!("Paused at frame {}", world.frame);
            }
            Phase::Paused => {
                world.phase = Phase::Running;
                log::info!("Resumed at frame {}", world.frame);
            }
            Phase::GameOver => {}
        },
        InputEvent::Restart if world.phase == Phase::GameOver => restart(world, rng),
        ignored => log::trace!("Ignoring {:?} while {:?}", ignored, world.phase),
    }
    ControlFlow::Continue(())
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Advance the simulation by one tick.  Does nothing unless running.
pub fn tick(world: &mut World, rng: &mut impl Rng) {
    if world.phase != Phase::Running {
        return;
    }
    world.frame += 1;

    // ── 1. Player ────────────────────────────────────────────────────────────
    let direction = std::mem::take(&mut world.pending_move);
    world.player.move_horizontal(direction);
    world.player.tick();

    // ── 2. Movement; projectiles and pickups leave, hazards wrap ─────────────
    let width = world.settings.world_width;
    let height = world.settings.world_height;

    for projectile in &mut world.projectiles {
        projectile.tick();
    }
    world.projectiles.retain(|p| !p.is_offscreen());

    for hazard in &mut world.hazards {
        hazard.tick();
        if hazard.is_offscreen(height) {
            hazard.recycle(rng, width);
        }
    }

    for pickup in &mut world.pickups {
        pickup.tick();
    }
    world.pickups.retain(|p| !p.is_offscreen(height));

    // ── 3. Projectiles ↔ hazards ─────────────────────────────────────────────
    resolve_projectile_hits(world, rng);

    // ── 4. Player ↔ hazards ──────────────────────────────────────────────────
    resolve_player_hits(world, rng);
    if world.phase == Phase::GameOver {
        return;
    }

    // ── 5. Player ↔ pickups ──────────────────────────────────────────────────
    collect_pickups(world);

    // ── 6. Pickup spawn timer ────────────────────────────────────────────────
    world.pickup_spawn_timer += 1;
    if world.pickup_spawn_timer >= world.settings.pickup_interval_ticks() {
        let pickup = Pickup::spawn(rng, &world.settings);
        log::debug!("Pickup spawned at x={:.0}", pickup.body.x);
        world.pickups.push(pickup);
        world.pickup_spawn_timer = 0;
    }

    debug_assert!(world.player.lives <= MAX_LIVES);
    log::trace!(
        "frame {}: {} projectiles, {} hazards, {} pickups",
        world.frame,
        world.projectiles.len(),
        world.hazards.len(),
        world.pickups.len()
    );
}

fn rects<'a>(bodies: impl Iterator<Item = &'a Entity>) -> Vec<Rect> {
    bodies.map(Entity::rect).collect()
}

/// Drop every item whose flag is set, keeping the order of the rest.
fn remove_flagged<T>(items: &mut Vec<T>, flags: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !flags[index];
        index += 1;
        keep
    });
}

/// Remove the hazards at `indices` and spawn the same number of fresh ones.
fn replace_hazards(world: &mut World, indices: &[usize], rng: &mut impl Rng) {
    let mut destroyed = vec![false; world.hazards.len()];
    for &i in indices {
        destroyed[i] = true;
    }
    remove_flagged(&mut world.hazards, &destroyed);
    for _ in indices {
        world.hazards.push(Hazard::spawn(rng, &world.settings));
    }
}

fn resolve_projectile_hits(world: &mut World, rng: &mut impl Rng) {
    let shots = rects(world.projectiles.iter().map(|p| &p.body));
    let targets = rects(world.hazards.iter().map(|h| &h.body));
    let pairs = match_pairs(&shots, &targets);
    if pairs.is_empty() {
        return;
    }

    let mut spent = vec![false; world.projectiles.len()];
    let mut destroyed = Vec::with_capacity(pairs.len());
    for &(shot, target) in &pairs {
        spent[shot] = true;
        destroyed.push(target);
    }
    remove_flagged(&mut world.projectiles, &spent);
    replace_hazards(world, &destroyed, rng);

    world.score += SCORE_PER_HAZARD * pairs.len() as u32;
    log::debug!("{} hazard(s) destroyed, score {}", pairs.len(), world.score);
}

/// Hazards touching a vulnerable player cost one life and are replaced.
fn resolve_player_hits(world: &mut World, rng: &mut impl Rng) {
    if world.player.is_invulnerable() {
        return;
    }
    let targets = rects(world.hazards.iter().map(|h| &h.body));
    let hits = overlapping(&world.player.body.rect(), &targets);
    if hits.is_empty() {
        return;
    }

    world.player.take_hit();
    replace_hazards(world, &hits, rng);
    log::debug!("Player hit, {} lives left", world.player.lives);

    if world.player.lives == 0 {
        world.phase = Phase::GameOver;
        log::info!(
            "Game over at frame {} with score {}",
            world.frame,
            world.score
        );
    }
}

/// Pickups are consumed on contact whether or not the player is invulnerable.
fn collect_pickups(world: &mut World) {
    let targets = rects(world.pickups.iter().map(|p| &p.body));
    let hits = overlapping(&world.player.body.rect(), &targets);
    if hits.is_empty() {
        return;
    }

    let mut taken = vec![false; world.pickups.len()];
    for &i in &hits {
        taken[i] = true;
        world.player.grant_life();
    }
    remove_flagged(&mut world.pickups, &taken);
    log::debug!("Collected {} pickup(s), lives {}", hits.len(), world.player.lives);
}
