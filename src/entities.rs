/// Game entity types and the per-kind behavior that only touches one entity.
///
/// Nothing here holds a reference back to the `World`; interactions between
/// entities are resolved in `compute`.

use rand::Rng;

use crate::collision::Rect;
use crate::settings::Settings;

// ── Sizes (world units) ──────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 60.0;
pub const PLAYER_HEIGHT: f32 = 50.0;
/// Gap between the player's bottom edge and the bottom of the world.
pub const PLAYER_BOTTOM_MARGIN: f32 = 10.0;

pub const PROJECTILE_WIDTH: f32 = 5.0;
pub const PROJECTILE_HEIGHT: f32 = 10.0;

pub const HAZARD_WIDTH: f32 = 50.0;
pub const HAZARD_HEIGHT: f32 = 50.0;

pub const PICKUP_WIDTH: f32 = 40.0;
pub const PICKUP_HEIGHT: f32 = 40.0;

pub const MAX_LIVES: u8 = 5;

/// Ticks per flicker half-period while invulnerable.
pub const FLICKER_INTERVAL: u32 = 5;

/// Vertical band (above the visible area) hazards are placed in.
pub const HAZARD_SPAWN_Y: (f32, f32) = (-100.0, -40.0);
pub const PICKUP_SPAWN_Y: (f32, f32) = (-150.0, -50.0);

// ── Enums ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    Right,
    #[default]
    None,
}

/// Discrete input delivered by the presentation layer.
///
/// `MoveLeft`/`MoveRight` are sent once per tick while the key is held; the
/// others are edge-triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    Fire,
    TogglePause,
    Restart,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Projectile,
    Hazard,
    Pickup,
}

// ── Shared base ───────────────────────────────────────────────────────────────

/// Position, size and velocity shared by every simulated object.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Entity {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }
}

fn random_x(rng: &mut impl Rng, world_width: f32, width: f32) -> f32 {
    let max_x = (world_width - width).max(0.0);
    rng.gen_range(0.0..=max_x)
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Entity,
    pub lives: u8,
    /// Invulnerable exactly while this is non-zero.
    pub invulnerable_ticks: u32,
    speed: f32,
    invulnerability_duration: u32,
    world_width: f32,
    world_height: f32,
}

impl Player {
    pub fn new(settings: &Settings) -> Self {
        let mut player = Player {
            body: Entity {
                x: 0.0,
                y: 0.0,
                w: PLAYER_WIDTH,
                h: PLAYER_HEIGHT,
                vx: 0.0,
                vy: 0.0,
            },
            lives: MAX_LIVES,
            invulnerable_ticks: 0,
            speed: settings.player_speed,
            invulnerability_duration: settings.invulnerability_ticks(),
            world_width: settings.world_width,
            world_height: settings.world_height,
        };
        player.reset();
        player
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ticks > 0
    }

    /// Largest x the player's left edge may take.
    pub fn max_x(&self) -> f32 {
        (self.world_width - self.body.w).max(0.0)
    }

    /// Shift horizontally by one step and clamp into the world.
    ///
    /// Called every tick, with `Direction::None` when no key is held, so the
    /// clamp always runs.
    pub fn move_horizontal(&mut self, direction: Direction) {
        self.body.vx = match direction {
            Direction::Left => -self.speed,
            Direction::Right => self.speed,
            Direction::None => 0.0,
        };
        self.body.x = (self.body.x + self.body.vx).clamp(0.0, self.max_x());
        debug_assert!(self.body.x >= 0.0 && self.body.x <= self.max_x());
    }

    /// Decay the invulnerability window by one tick.
    pub fn tick(&mut self) {
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
    }

    /// Flicker signal for rendering: true on the dim half of each interval.
    pub fn is_dimmed(&self) -> bool {
        self.is_invulnerable() && (self.invulnerable_ticks / FLICKER_INTERVAL) % 2 == 0
    }

    /// Lose a life unless invulnerable.  Returns whether the hit landed.
    ///
    /// A surviving player becomes invulnerable; a player left with no lives
    /// does not, and the caller ends the game.
    pub fn take_hit(&mut self) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.invulnerable_ticks = self.invulnerability_duration;
        }
        true
    }

    /// Add one life, capped at `MAX_LIVES`.
    pub fn grant_life(&mut self) {
        if self.lives < MAX_LIVES {
            self.lives += 1;
        }
    }

    /// Full lives, no invulnerability, centred at the bottom of the world.
    pub fn reset(&mut self) {
        self.lives = MAX_LIVES;
        self.invulnerable_ticks = 0;
        self.body.vx = 0.0;
        self.body.x = self.max_x() / 2.0;
        self.body.y = self.world_height - PLAYER_BOTTOM_MARGIN - self.body.h;
    }
}

// ── Projectile ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Projectile {
    pub body: Entity,
}

impl Projectile {
    /// Spawn centred on the player's top edge, travelling up at `speed`.
    pub fn fire_from(player: &Player, speed: f32) -> Self {
        Projectile {
            body: Entity {
                x: player.body.center_x() - PROJECTILE_WIDTH / 2.0,
                y: player.body.y - PROJECTILE_HEIGHT / 2.0,
                w: PROJECTILE_WIDTH,
                h: PROJECTILE_HEIGHT,
                vx: 0.0,
                vy: -speed,
            },
        }
    }

    pub fn tick(&mut self) {
        self.body.advance();
    }

    /// Bottom edge has passed above the top of the world.
    pub fn is_offscreen(&self) -> bool {
        self.body.bottom() < 0.0
    }
}

// ── Hazard ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Hazard {
    pub body: Entity,
}

impl Hazard {
    /// New hazard above the visible area with a speed drawn once from the
    /// configured range.
    pub fn spawn(rng: &mut impl Rng, settings: &Settings) -> Self {
        let speed = rng.gen_range(settings.hazard_speed_min..=settings.hazard_speed_max);
        let mut hazard = Hazard {
            body: Entity {
                x: 0.0,
                y: 0.0,
                w: HAZARD_WIDTH,
                h: HAZARD_HEIGHT,
                vx: 0.0,
                vy: speed as f32,
            },
        };
        hazard.recycle(rng, settings.world_width);
        hazard
    }

    pub fn tick(&mut self) {
        self.body.advance();
    }

    /// Top edge has dropped below the bottom of the world.
    pub fn is_offscreen(&self, world_height: f32) -> bool {
        self.body.y > world_height
    }

    /// Reposition above the top of the world.  Speed is kept.
    pub fn recycle(&mut self, rng: &mut impl Rng, world_width: f32) {
        self.body.x = random_x(rng, world_width, self.body.w);
        self.body.y = rng.gen_range(HAZARD_SPAWN_Y.0..=HAZARD_SPAWN_Y.1);
    }
}

// ── Pickup ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Pickup {
    pub body: Entity,
}

impl Pickup {
    pub fn spawn(rng: &mut impl Rng, settings: &Settings) -> Self {
        Pickup {
            body: Entity {
                x: random_x(rng, settings.world_width, PICKUP_WIDTH),
                y: rng.gen_range(PICKUP_SPAWN_Y.0..=PICKUP_SPAWN_Y.1),
                w: PICKUP_WIDTH,
                h: PICKUP_HEIGHT,
                vx: 0.0,
                vy: settings.pickup_speed,
            },
        }
    }

    pub fn tick(&mut self) {
        self.body.advance();
    }

    pub fn is_offscreen(&self, world_height: f32) -> bool {
        self.body.y > world_height
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// The whole simulation.  Owns every entity; built and advanced by `compute`.
#[derive(Clone, Debug)]
pub struct World {
    pub settings: Settings,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub hazards: Vec<Hazard>,
    pub pickups: Vec<Pickup>,
    pub score: u32,
    pub phase: Phase,
    /// Ticks since the last pickup spawned.
    pub pickup_spawn_timer: u32,
    /// Movement requested for the next tick; cleared once applied.
    pub pending_move: Direction,
    /// Ticks simulated since the session started.
    pub frame: u64,
}

/// Read-only view used by the presentation layer.
impl World {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every entity with its kind, player last so it draws on top.
    pub fn entities(&self) -> impl Iterator<Item = (EntityKind, &Entity)> + '_ {
        let hazards = self.hazards.iter().map(|h| (EntityKind::Hazard, &h.body));
        let pickups = self.pickups.iter().map(|p| (EntityKind::Pickup, &p.body));
        let projectiles = self
            .projectiles
            .iter()
            .map(|p| (EntityKind::Projectile, &p.body));
        hazards
            .chain(pickups)
            .chain(projectiles)
            .chain(std::iter::once((EntityKind::Player, &self.player.body)))
    }
}
