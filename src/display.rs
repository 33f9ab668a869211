/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// world.  No game logic is performed; this module only scales world
/// coordinates onto the terminal grid and translates state into commands.
/// Everything is queued and flushed once, so a frame is shown whole or not
/// at all.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use mini_shooter::entities::{Entity, EntityKind, Phase, World};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PLAYER_DIM: Color = Color::DarkGrey;
const C_HAZARD: Color = Color::DarkYellow;
const C_PICKUP: Color = Color::Magenta;
const C_PROJECTILE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Maps world units onto the cells inside the border.
struct Viewport {
    /// First playable column and how many there are.
    left: u16,
    cols: u16,
    /// First playable row and how many there are.
    top: u16,
    rows: u16,
    scale_x: f32,
    scale_y: f32,
}

impl Viewport {
    fn new(world: &World, width: u16, height: u16) -> Self {
        // Row 0 is the HUD, row 1 and h-2 the border, h-1 the hint line.
        let cols = width.saturating_sub(2).max(1);
        let rows = height.saturating_sub(4).max(1);
        Viewport {
            left: 1,
            cols,
            top: 2,
            rows,
            scale_x: cols as f32 / world.settings().world_width,
            scale_y: rows as f32 / world.settings().world_height,
        }
    }

    /// Visible cells covered by an entity as `(col, row, cols, rows)`,
    /// or `None` when it is entirely outside the play area.
    fn cells(&self, body: &Entity) -> Option<(u16, u16, u16, u16)> {
        let x0 = (body.x * self.scale_x).floor();
        let y0 = (body.y * self.scale_y).floor();
        let x1 = ((body.x + body.w) * self.scale_x).ceil().max(x0 + 1.0);
        let y1 = ((body.y + body.h) * self.scale_y).ceil().max(y0 + 1.0);

        let x0 = x0.max(0.0);
        let y0 = y0.max(0.0);
        let x1 = x1.min(self.cols as f32);
        let y1 = y1.min(self.rows as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((
            self.left + x0 as u16,
            self.top + y0 as u16,
            (x1 - x0) as u16,
            (y1 - y0) as u16,
        ))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    world: &World,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let view = Viewport::new(world, width, height);
    draw_border(out, width, height)?;
    draw_hud(out, world, width)?;

    if world.phase() == Phase::Paused {
        let lines = [("PAUSED", Color::Cyan), ("P - Resume  Q - Quit", Color::White)];
        draw_overlay(out, width, height, &lines)?;
    } else {
        for (kind, body) in world.entities() {
            draw_entity(out, &view, world, kind, body)?;
        }
    }

    draw_controls_hint(out, height)?;

    if world.phase() == Phase::GameOver {
        let score_line = format!("Final Score: {:>6}", world.score());
        draw_overlay(
            out,
            width,
            height,
            &[
                ("GAME  OVER", Color::Red),
                (score_line.as_str(), Color::Yellow),
                ("R - Play Again  Q - Quit", Color::White),
            ],
        )?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, world: &World, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {}", world.score())))?;

    let lives = world.player().lives;
    let lives_str = format!("Lives: {} {}", lives, "♥".repeat(lives as usize));
    let rx = width.saturating_sub(lives_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_entity<W: Write>(
    out: &mut W,
    view: &Viewport,
    world: &World,
    kind: EntityKind,
    body: &Entity,
) -> std::io::Result<()> {
    let Some((col, row, cols, rows)) = view.cells(body) else {
        return Ok(());
    };

    let (glyph, color) = match kind {
        EntityKind::Player if world.player().is_dimmed() => ("▒", C_PLAYER_DIM),
        EntityKind::Player => ("█", C_PLAYER),
        EntityKind::Hazard => ("▓", C_HAZARD),
        EntityKind::Pickup => ("♥", C_PICKUP),
        EntityKind::Projectile => ("║", C_PROJECTILE),
    };

    out.queue(style::SetForegroundColor(color))?;
    let line = glyph.repeat(cols as usize);
    for r in row..row + rows {
        out.queue(cursor::MoveTo(col, r))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Centred overlay box ───────────────────────────────────────────────────────

fn draw_overlay<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let inner = lines
        .iter()
        .map(|(text, _)| text.chars().count())
        .max()
        .unwrap_or(0)
        + 4;
    let cx = width / 2;
    let total_rows = lines.len() as u16 + 2;
    let start_row = (height / 2).saturating_sub(total_rows / 2);
    let box_col = cx.saturating_sub(inner as u16 / 2 + 1);

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(box_col, start_row))?;
    out.queue(Print(format!("╔{}╗", "═".repeat(inner))))?;
    out.queue(cursor::MoveTo(box_col, start_row + total_rows - 1))?;
    out.queue(Print(format!("╚{}╝", "═".repeat(inner))))?;

    for (i, (text, color)) in lines.iter().enumerate() {
        let row = start_row + 1 + i as u16;
        out.queue(cursor::MoveTo(box_col, row))?;
        out.queue(style::SetForegroundColor(C_BORDER))?;
        out.queue(Print(format!("║{}║", " ".repeat(inner))))?;

        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*text))?;
    }

    Ok(())
}
