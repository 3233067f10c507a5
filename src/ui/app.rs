//! Main UI Application
//!
//! Draws the sky and a status line, and handles the few keys the viewer
//! understands.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::raster::rasterize;
use crate::render::SpriteFrame;
use crate::sky::Sky;
use crate::world::Viewport;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;
/// Half-height of the sky in world units, whatever the terminal size
const ORTHO_SIZE: f32 = 5.0;

/// Main UI application
pub struct App {
    /// Sprites collected from the sky each frame
    sprites: SpriteFrame,
    paused: bool,
    help_visible: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            sprites: SpriteFrame::new(),
            paused: false,
            help_visible: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                self.paused = !self.paused;
                log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
            }
            KeyCode::Char('?') | KeyCode::Char('h') => self.help_visible = !self.help_visible,
            _ => {}
        }
        Ok(false)
    }

    /// Viewport matching the sky area of a terminal of the given size
    pub fn viewport_for(area: Rect) -> Viewport {
        let sky = Self::sky_area(area);
        let inner_w = sky.width.saturating_sub(2).max(1) as f32;
        let inner_h = sky.height.saturating_sub(2).max(1) as f32;
        Viewport::from_ortho(ORTHO_SIZE, inner_w / (inner_h * CELL_ASPECT))
    }

    fn layout(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area)
    }

    fn sky_area(area: Rect) -> Rect {
        Self::layout(area)[0]
    }

    pub fn render(&mut self, frame: &mut Frame, sky: &Sky) {
        frame.render_widget(Clear, frame.area());
        let chunks = Self::layout(frame.area());

        sky.present(&mut self.sprites);
        self.render_sky(frame, chunks[0], sky);
        self.render_status(frame, chunks[1], sky);

        if self.help_visible {
            self.render_help(frame);
        }
    }

    fn render_sky(&self, frame: &mut Frame, area: Rect, sky: &Sky) {
        let title = if self.paused { " Skyscape (paused) " } else { " Skyscape " };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 2 || inner.height < 2 {
            return;
        }

        let grid = rasterize(&self.sprites, sky.viewport(), inner.width as usize, inner.height as usize);
        let lines: Vec<Line> = (0..grid.height())
            .map(|y| {
                let spans: Vec<Span> = grid
                    .row(y)
                    .iter()
                    .map(|cell| Span::styled(cell.ch.to_string(), cell.style))
                    .collect();
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, sky: &Sky) {
        let census = sky.census();
        let volume = (sky.music_volume() * 100.0).round() as u32;
        let status = Line::from(vec![
            Span::styled(format!(" {:>6.1}s ", sky.elapsed()), Style::default().fg(Color::DarkGray)),
            Span::raw(census.to_string()),
            Span::styled(format!(" | music {}%", volume), Style::default().fg(Color::DarkGray)),
            Span::styled("  [q] quit  [space] pause  [?] help", Style::default().add_modifier(Modifier::DIM)),
        ]);
        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = centered_rect(40, 9, frame.area());
        let help = vec![
            Line::from(Span::styled("Legend", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  > <  bird"),
            Line::from("  ▒▒▒  cloud"),
            Line::from("  * ·  star"),
            Line::from("  @    roamer"),
            Line::from("  ?    dropped item"),
        ];
        let paragraph = Paragraph::new(help).block(Block::default().title(" Help ").borders(Borders::ALL));
        frame.render_widget(Clear, area);
        frame.render_widget(paragraph, area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width` x `height` rectangle centered in `area`, clipped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(area.x + (area.width - w) / 2, area.y + (area.height - h) / 2, w, h)
}
