//! Debug overlay drawn on top of the presented frame.
//!
//! A small panel in the top-left corner:
//! - a toggle box for the post-process effect (clickable)
//! - a bar filled to `visible / total`
//! - one cell per instance, lit when the instance survived culling
//!
//! The overlay is composited after post-processing, so it is never inverted.

mod rect;

pub use rect::{Rect, RectInstance, RectRenderer};

use crate::culling::CullingKind;
use crate::render::{RenderCtx, RenderTarget};

const MARGIN: f32 = 12.0;
const PADDING: f32 = 8.0;
const CELL: f32 = 12.0;
const GAP: f32 = 4.0;
const COLUMNS: usize = 12;
const TOGGLE: f32 = 18.0;
/// Cells beyond this count are not drawn; the bar still covers them.
pub const MAX_CELLS: usize = 240;

const PANEL: [f32; 4] = [0.02, 0.02, 0.03, 0.6];
const FRAME: [f32; 4] = [0.85, 0.85, 0.85, 1.0];
const TOGGLE_ON: [f32; 4] = [0.95, 0.72, 0.18, 1.0];
const TOGGLE_OFF: [f32; 4] = [0.22, 0.22, 0.24, 1.0];
const VISIBLE: [f32; 4] = [0.30, 0.85, 0.42, 1.0];
const CULLED: [f32; 4] = [0.30, 0.30, 0.32, 0.9];
const BAR_BACK: [f32; 4] = [0.18, 0.18, 0.20, 0.9];
const DEVICE_TINT: [f32; 4] = [0.35, 0.55, 0.95, 1.0];
const HOST_TINT: [f32; 4] = [0.85, 0.55, 0.35, 1.0];

/// Values the overlay displays.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStats<'a> {
    pub total: u32,
    pub visible: u32,
    pub culling: CullingKind,
    pub post_process: bool,
    /// Visible instance indices when known (host culling). Device culling
    /// only reports a count, so cells are lit in order.
    pub visible_indices: Option<&'a [u32]>,
}

impl OverlayStats<'_> {
    pub fn culled(&self) -> u32 {
        self.total.saturating_sub(self.visible)
    }
}

/// Rectangles for one frame plus the hit area of the toggle.
#[derive(Debug, Clone, Default)]
pub struct OverlayLayout {
    pub rects: Vec<RectInstance>,
    pub toggle: Rect,
}

/// Lays out the panel in logical pixels.
pub fn layout(stats: &OverlayStats<'_>) -> OverlayLayout {
    let cells = (stats.total as usize).min(MAX_CELLS);
    let rows = cells.div_ceil(COLUMNS);
    let grid_w = COLUMNS as f32 * (CELL + GAP) - GAP;
    let grid_h = if rows == 0 { 0.0 } else { rows as f32 * (CELL + GAP) - GAP };

    let inner_x = MARGIN + PADDING;
    let inner_y = MARGIN + PADDING;
    let header_h = TOGGLE;
    let panel = Rect::new(
        MARGIN,
        MARGIN,
        grid_w + 2.0 * PADDING,
        header_h + if rows == 0 { 0.0 } else { GAP + grid_h } + 2.0 * PADDING,
    );

    let mut rects = Vec::with_capacity(cells + 8);
    rects.push(RectInstance::solid(panel, PANEL));

    // Post-process toggle: frame, then fill.
    let toggle = Rect::new(inner_x, inner_y, TOGGLE, TOGGLE);
    rects.push(RectInstance::solid(toggle, FRAME));
    let fill = if stats.post_process { TOGGLE_ON } else { TOGGLE_OFF };
    rects.push(RectInstance::solid(inset(toggle, 2.0), fill));

    // Culling strategy marker next to the toggle.
    let marker = Rect::new(inner_x + TOGGLE + GAP, inner_y, 6.0, TOGGLE);
    let tint = match stats.culling {
        CullingKind::Host => HOST_TINT,
        CullingKind::Device => DEVICE_TINT,
    };
    rects.push(RectInstance::solid(marker, tint));

    // Visible fraction bar.
    let bar_x = marker.x + marker.w + GAP;
    let bar = Rect::new(bar_x, inner_y + 4.0, inner_x + grid_w - bar_x, TOGGLE - 8.0);
    rects.push(RectInstance::solid(bar, BAR_BACK));
    if stats.total > 0 && stats.visible > 0 {
        let frac = (stats.visible as f32 / stats.total as f32).min(1.0);
        rects.push(RectInstance::solid(
            Rect::new(bar.x, bar.y, bar.w * frac, bar.h),
            VISIBLE,
        ));
    }

    let grid_y = inner_y + header_h + GAP;
    for i in 0..cells {
        let col = i % COLUMNS;
        let row = i / COLUMNS;
        let cell = Rect::new(
            inner_x + col as f32 * (CELL + GAP),
            grid_y + row as f32 * (CELL + GAP),
            CELL,
            CELL,
        );
        let lit = match stats.visible_indices {
            Some(indices) => indices.contains(&(i as u32)),
            None => (i as u32) < stats.visible,
        };
        rects.push(RectInstance::solid(cell, if lit { VISIBLE } else { CULLED }));
    }

    OverlayLayout { rects, toggle }
}

fn inset(r: Rect, by: f32) -> Rect {
    Rect::new(r.x + by, r.y + by, (r.w - 2.0 * by).max(0.0), (r.h - 2.0 * by).max(0.0))
}

/// Stateful overlay: remembers the last toggle rect for hit testing.
pub struct DebugOverlay {
    renderer: RectRenderer,
    toggle: Option<Rect>,
    enabled: bool,
}

impl DebugOverlay {
    pub fn new(renderer: RectRenderer, enabled: bool) -> Self {
        Self {
            renderer,
            toggle: None,
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.toggle = None;
        }
    }

    /// True when `(x, y)` (logical pixels) hits the post-process toggle.
    pub fn hit_toggle(&self, x: f32, y: f32) -> bool {
        self.toggle.is_some_and(|r| r.contains(x, y))
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        stats: &OverlayStats<'_>,
    ) {
        if !self.enabled {
            return;
        }
        let OverlayLayout { rects, toggle } = layout(stats);
        self.toggle = Some(toggle);
        self.renderer.render(ctx, target, &rects);
    }
}

/// One-line summary used for the window title.
pub fn summary(stats: &OverlayStats<'_>) -> String {
    format!(
        "visible {} / {} (culled {}) | {} culling | post {}",
        stats.visible,
        stats.total,
        stats.culled(),
        stats.culling,
        if stats.post_process { "on" } else { "off" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u32, visible: u32, indices: Option<&[u32]>) -> OverlayStats<'_> {
        OverlayStats {
            total,
            visible,
            culling: CullingKind::Host,
            post_process: false,
            visible_indices: indices,
        }
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn one_cell_per_instance() {
        let lit = layout(&stats(23, 0, Some(&[])));
        let fixed = layout(&stats(0, 0, None)).rects.len();
        assert_eq!(lit.rects.len(), fixed + 23);
    }

    #[test]
    fn cells_lit_by_index() {
        let indices = [0u32, 5];
        let l = layout(&stats(6, 2, Some(&indices)));
        let cells = &l.rects[l.rects.len() - 6..];
        let visible = RectInstance::solid(Rect::default(), VISIBLE).color;
        let lit: Vec<bool> = cells.iter().map(|c| c.color == visible).collect();
        assert_eq!(lit, vec![true, false, false, false, false, true]);
    }

    #[test]
    fn count_only_lights_leading_cells() {
        let l = layout(&stats(4, 3, None));
        let cells = &l.rects[l.rects.len() - 4..];
        let visible = RectInstance::solid(Rect::default(), VISIBLE).color;
        assert_eq!(cells.iter().filter(|c| c.color == visible).count(), 3);
    }

    #[test]
    fn cell_count_is_capped() {
        let l = layout(&stats(10_000, 0, None));
        let fixed = layout(&stats(0, 0, None)).rects.len();
        assert_eq!(l.rects.len(), fixed + MAX_CELLS);
    }

    // ── toggle ────────────────────────────────────────────────────────────

    #[test]
    fn toggle_hit_area() {
        let l = layout(&stats(23, 23, None));
        let t = l.toggle;
        assert!(t.contains(t.x + t.w / 2.0, t.y + t.h / 2.0));
        assert!(!t.contains(t.x - 1.0, t.y));
    }

    #[test]
    fn summary_reports_culled() {
        let s = summary(&stats(23, 17, None));
        assert!(s.contains("visible 17 / 23"));
        assert!(s.contains("culled 6"));
        assert!(s.contains("host"));
    }
}
