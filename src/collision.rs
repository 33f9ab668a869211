/// Axis-aligned bounding-box collision.
///
/// Boxes are tested at their current positions only; nothing is swept along
/// the velocity, so a fast entity can pass through a thin one between ticks.

/// A rectangle in world units, anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// True when the two boxes share interior area.  Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Pair up shooters and targets one-to-one.
///
/// Each shooter claims the first target it overlaps that no earlier shooter
/// has claimed.  Returns `(shooter_index, target_index)` pairs in shooter order.
pub fn match_pairs(shooters: &[Rect], targets: &[Rect]) -> Vec<(usize, usize)> {
    let mut claimed = vec![false; targets.len()];
    let mut pairs = Vec::new();

    for (si, shooter) in shooters.iter().enumerate() {
        let hit = targets
            .iter()
            .enumerate()
            .find(|(ti, target)| !claimed[*ti] && shooter.overlaps(target));
        if let Some((ti, _)) = hit {
            claimed[ti] = true;
            pairs.push((si, ti));
        }
    }
    pairs
}

/// Indices of every box in `others` that overlaps `rect`.
pub fn overlapping(rect: &Rect, others: &[Rect]) -> Vec<usize> {
    others
        .iter()
        .enumerate()
        .filter(|(_, o)| rect.overlaps(o))
        .map(|(i, _)| i)
        .collect()
}
