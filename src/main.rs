mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Stdout, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use mini_shooter::compute::{handle_input, new_world, tick};
use mini_shooter::entities::{InputEvent, World};
use mini_shooter::settings::{Settings, CONFIG_ENV_VAR};

/// Render cadence, independent of the simulation tick rate.
const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Upper bound on simulation ticks run per rendered frame, so a stalled
/// terminal cannot make the loop spiral.
const MAX_SUBSTEPS: u32 = 8;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Edge-triggered game input for a freshly pressed key.
fn edge_event(code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(InputEvent::Quit),
        KeyCode::Char(' ') => Some(InputEvent::Fire),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(InputEvent::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputEvent::Restart),
        _ => None,
    }
}

/// Records one key event in `key_frame` and returns the edge event it
/// starts, if any.
///
/// A press of a key that is still held is an OS auto-repeat, not a new
/// press, so it only refreshes the hold.
fn track_key(
    key_frame: &mut HashMap<KeyCode, u64>,
    key: KeyEvent,
    frame: u64,
) -> Option<InputEvent> {
    match key.kind {
        KeyEventKind::Press => {
            let fresh = !is_held(key_frame, &key.code, frame);
            key_frame.insert(key.code, frame);
            if fresh {
                edge_event(key.code, key.modifiers)
            } else {
                None
            }
        }
        KeyEventKind::Repeat => {
            key_frame.insert(key.code, frame);
            None
        }
        KeyEventKind::Release => {
            key_frame.remove(&key.code);
            None
        }
    }
}

// ── Terminal lifetime ─────────────────────────────────────────────────────────

/// Raw mode, alternate screen and hidden cursor for as long as this lives.
/// Dropping it restores the terminal, including while unwinding from a panic.
struct TerminalGuard {
    out: BufWriter<Stdout>,
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        let mut out = BufWriter::new(stdout());

        terminal::enable_raw_mode().context("cannot enable raw mode")?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;

        // Request key-release (and key-repeat) events from the terminal.
        // Kitty-protocol terminals support this; others fall back gracefully.
        let keyboard_enhanced = out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();

        Ok(TerminalGuard {
            out,
            keyboard_enhanced,
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Each frame drains every pending key event first: presses of one-shot keys
/// become edge events, direction keys are recorded in `key_frame`.  Then the
/// simulation catches up on elapsed time in fixed ticks, feeding the held
/// direction into every tick, and finally one frame is rendered.
///
/// Held keys work on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence, and a repeated `Press` inside that window is not a new edge.
fn game_loop<W: Write>(
    out: &mut W,
    world: &mut World,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let mut rng = thread_rng();
    let tick_dt = Duration::from_secs_f64(1.0 / world.settings().tick_rate as f64);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut accumulator = Duration::ZERO;
    let mut last = Instant::now();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut edges = Vec::new();
        loop {
            let ev = match rx.try_recv() {
                Ok(ev) => ev,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => anyhow::bail!("input stream closed"),
            };
            if let Event::Key(key) = ev {
                edges.extend(track_key(&mut key_frame, key, frame));
            }
        }

        for event in edges {
            if let ControlFlow::Break(()) = handle_input(world, event, &mut rng) {
                log::info!("Quit requested with score {}", world.score());
                return Ok(());
            }
        }

        let left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame)
            || is_held(&key_frame, &KeyCode::Char('A'), frame);
        let right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame)
            || is_held(&key_frame, &KeyCode::Char('D'), frame);

        // ── Fixed-rate simulation ─────────────────────────────────────────────
        let now = Instant::now();
        accumulator += now - last;
        last = now;

        let mut substeps = 0;
        while accumulator >= tick_dt && substeps < MAX_SUBSTEPS {
            if left && !right {
                let _ = handle_input(world, InputEvent::MoveLeft, &mut rng);
            } else if right && !left {
                let _ = handle_input(world, InputEvent::MoveRight, &mut rng);
            }
            tick(world, &mut rng);
            accumulator -= tick_dt;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            accumulator = Duration::ZERO;
        }

        let (width, height) = terminal::size()?;
        display::render(out, world, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let settings = Settings::load_or_default(config_path.as_deref());
    let mut world = new_world(settings, &mut thread_rng());
    log::info!(
        "Starting with {} hazards on a {}x{} field",
        world.settings().initial_hazards,
        world.settings().world_width,
        world.settings().world_height
    );

    let mut guard = TerminalGuard::enter()?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(e) => {
                log::error!("Input thread stopped: {}", e);
                break;
            }
        }
    });

    let result = game_loop(&mut guard.out, &mut world, &rx);

    // Restore the terminal before anything is printed.
    drop(guard);

    log::info!("Final score {}", world.score());
    result.context("game loop failed")
}
