//! Sprite rasterization
//!
//! Projects sky coordinates onto a character grid and picks a glyph and
//! style per sprite.

use ratatui::style::{Color, Modifier, Style};

use crate::entities::{EntityKind, Facing};
use crate::render::{Sprite, SpriteFrame};
use crate::world::{Boundary, Vec2};

/// Sprites fainter than this are not drawn at all
const MIN_VISIBLE_OPACITY: f32 = 0.05;

/// One character cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// Row-major character grid, row 0 at the top
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    /// Map a sky position onto a cell; `None` when off the grid
    pub fn project(&self, boundary: &impl Boundary, pos: Vec2) -> Option<(i32, i32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let ext = boundary.extents();
        let u = (pos.x + ext.x) / (2.0 * ext.x);
        let v = (ext.y - pos.y) / (2.0 * ext.y);
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        let x = (u * self.width as f32).floor().min((self.width - 1) as f32) as i32;
        let y = (v * self.height as f32).floor().min((self.height - 1) as f32) as i32;
        Some((x, y))
    }
}

/// Draw every sprite of `frame` into a fresh grid
pub fn rasterize(frame: &SpriteFrame, boundary: &impl Boundary, width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height);

    for sprite in frame.sprites() {
        if sprite.opacity < MIN_VISIBLE_OPACITY {
            continue;
        }
        let Some((x, y)) = grid.project(boundary, sprite.position) else {
            continue;
        };
        let style = style_for(sprite);

        if sprite.kind == EntityKind::Cloud {
            // Clouds are drawn as a horizontal puff centered on their position
            let half = (sprite.scale * 2.0).round() as i32;
            for dx in -half..=half {
                grid.put(x + dx, y, Cell { ch: cloud_glyph(dx, half), style });
            }
        } else {
            grid.put(x, y, Cell { ch: glyph_for(sprite), style });
        }
    }

    grid
}

fn cloud_glyph(dx: i32, half: i32) -> char {
    if dx.abs() == half {
        '░'
    } else {
        '▒'
    }
}

pub fn glyph_for(sprite: &Sprite) -> char {
    match sprite.kind {
        EntityKind::Bird => match sprite.facing {
            Facing::Left => '<',
            Facing::Right => '>',
        },
        EntityKind::Cloud => '▒',
        EntityKind::Star => {
            if sprite.scale >= 1.0 {
                '*'
            } else {
                '·'
            }
        }
        EntityKind::Roamer => '@',
        EntityKind::DroppedItem => '?',
    }
}

pub fn style_for(sprite: &Sprite) -> Style {
    let color = match sprite.kind {
        EntityKind::Bird => Color::LightCyan,
        EntityKind::Cloud => Color::Gray,
        EntityKind::Star => Color::Yellow,
        EntityKind::Roamer => Color::LightMagenta,
        EntityKind::DroppedItem => Color::LightGreen,
    };

    let style = Style::default().fg(color);
    if sprite.opacity < 0.5 {
        style.add_modifier(Modifier::DIM)
    } else if sprite.kind == EntityKind::Roamer {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}
