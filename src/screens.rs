use crate::config::Config;
use crate::game::{Game, TickOutcome};
use crate::render::{self, PixelBuf, PxRect};
use crate::scores::ScoreEntry;
use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};

/// Result of a screen reacting to input; consumed by the controller loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Menu,
    Play { player: String },
    Scores,
    SubmitScore { score: u32, name: String },
    Exit,
}

const DEFAULT_NAME: &str = "PLAYER";
const MENU_ITEMS: [&str; 3] = ["START", "SCORES", "QUIT"];

// ── Menu ────────────────────────────────────────────────────────────────────

pub struct MenuScreen {
    pub name: String,
    selected: usize,
    frame: u64,
    name_limit: usize,
}

pub struct MenuLayout {
    pub name_box: PxRect,
    pub buttons: [PxRect; 3],
}

pub fn menu_layout(pw: i32, ph: i32) -> MenuLayout {
    let bw = (pw / 2).clamp(40, 72);
    let bh = 7;
    let cx = pw / 2;
    let button = |i: i32| PxRect {
        x: cx - bw / 2,
        y: ph / 2 + i * (bh + 1),
        w: bw,
        h: bh,
    };
    MenuLayout {
        name_box: PxRect {
            x: cx - bw / 2,
            y: ph / 3,
            w: bw,
            h: bh,
        },
        buttons: [button(0), button(1), button(2)],
    }
}

impl MenuScreen {
    pub fn new(cfg: &Config, name: String) -> Self {
        Self {
            name,
            selected: 0,
            frame: 0,
            name_limit: cfg.name_limit,
        }
    }

    pub fn tick(&mut self) {
        self.frame += 1;
    }

    pub fn handle_event(&mut self, ev: &Event, pw: i32, ph: i32) -> Option<Transition> {
        match ev {
            Event::Key(key) => match key.code {
                KeyCode::Esc => Some(Transition::Exit),
                KeyCode::Up => {
                    self.selected = (self.selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
                    None
                }
                KeyCode::Down => {
                    self.selected = (self.selected + 1) % MENU_ITEMS.len();
                    None
                }
                KeyCode::Enter => Some(self.activate(self.selected)),
                KeyCode::Backspace => {
                    self.name.pop();
                    None
                }
                KeyCode::Char(c) => {
                    self.insert_char(c, key.modifiers);
                    None
                }
                _ => None,
            },
            Event::Mouse(m) => {
                if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                    let (px, py) = (m.column as i32, m.row as i32 * 2);
                    let layout = menu_layout(pw, ph);
                    for (i, rect) in layout.buttons.iter().enumerate() {
                        if rect.contains(px, py) {
                            return Some(self.activate(i));
                        }
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn insert_char(&mut self, c: char, modifiers: KeyModifiers) {
        // The name ends up in the `;`-delimited score file and in an
        // uppercase-only bitmap font; keep it to safe characters.
        if modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        if (c.is_ascii_alphanumeric() || c == ' ') && self.name.chars().count() < self.name_limit {
            self.name.push(c.to_ascii_uppercase());
        }
    }

    fn activate(&self, item: usize) -> Transition {
        match item {
            0 => Transition::Play {
                player: self.player_name(),
            },
            1 => Transition::Scores,
            _ => Transition::Exit,
        }
    }

    pub fn player_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        draw_backdrop(buf);
        let (pw, ph) = (buf.w as i32, buf.h as i32);
        let cx = pw / 2;

        let bob = ((self.frame as f64 * 0.08).sin() * 2.0) as i32;
        render::draw_text_centered(buf, cx, ph / 8 + bob, "FLAPPY", 2, render::BIRD_Y);

        let layout = menu_layout(pw, ph);
        let shown = if (self.frame / 8) % 2 == 0 {
            format!("{}_", self.name)
        } else {
            format!("{} ", self.name)
        };
        panel(buf, &layout.name_box, false);
        render::draw_text_centered(
            buf,
            cx,
            layout.name_box.y + 1,
            &shown,
            1,
            render::BIRD_PUPIL,
        );

        for (i, rect) in layout.buttons.iter().enumerate() {
            let selected = i == self.selected;
            panel(buf, rect, selected);
            let label = if selected {
                format!("> {}", MENU_ITEMS[i])
            } else {
                MENU_ITEMS[i].to_string()
            };
            let fg = if selected {
                render::WHITE
            } else {
                render::BIRD_PUPIL
            };
            render::draw_text_centered(buf, cx, rect.y + 1, &label, 1, fg);
        }
    }
}

// ── High scores ─────────────────────────────────────────────────────────────

pub struct ScoresScreen {
    entries: Vec<ScoreEntry>,
    frame: u64,
}

impl ScoresScreen {
    pub fn new(entries: Vec<ScoreEntry>) -> Self {
        Self { entries, frame: 0 }
    }

    pub fn tick(&mut self) {
        self.frame += 1;
    }

    pub fn handle_event(&mut self, ev: &Event) -> Option<Transition> {
        match ev {
            Event::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                    Some(Transition::Menu)
                }
                _ => None,
            },
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Down(_) => Some(Transition::Menu),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        draw_backdrop(buf);
        let (pw, ph) = (buf.w as i32, buf.h as i32);
        let cx = pw / 2;

        render::draw_text_centered(buf, cx, 2, "SCORES", 1, render::WHITE);

        let w = (pw * 3 / 4).min(120);
        let left = cx - w / 2;
        let right = cx + w / 2;
        let top = 10;
        let row_h = ((ph - top - 8) / 10).max(6);

        if (self.frame / 10) % 2 == 0 {
            render::draw_text_centered(buf, cx, ph - 12, "BACK - ESC", 1, render::DIRT_PALE);
        }

        if self.entries.is_empty() {
            render::draw_text_centered(buf, cx, ph / 2, "NO SCORES YET", 1, render::WHITE);
        }
        for (i, e) in self.entries.iter().take(10).enumerate() {
            let y = top + i as i32 * row_h;
            render::draw_text(buf, left, y, &format!("{}.", i + 1), 1, render::DIRT_PALE);
            render::draw_text(buf, left + 14, y, &e.name, 1, render::WHITE);
            let score = e.score.to_string();
            let sx = right - render::text_width(&score, 1);
            render::draw_text(buf, sx, y, &score, 1, render::BIRD_Y);
        }
    }
}

// ── Game ────────────────────────────────────────────────────────────────────

/// Wraps the simulation with the run's player name, the best score shown on
/// the game-over panel, and the post-collision confirm gate.
pub struct GameScreen {
    pub game: Game,
    player: String,
    best: u32,
    dead_timer: u32,
}

impl GameScreen {
    pub fn new(cfg: Config, player: String, best: u32) -> Self {
        Self {
            game: Game::new(cfg),
            player,
            best,
            dead_timer: 0,
        }
    }

    pub fn flap(&mut self) {
        self.game.flap();
    }

    pub fn tick(&mut self) -> TickOutcome {
        let out = self.game.tick();
        if self.game.over {
            self.dead_timer += 1;
        }
        out
    }

    /// The game-over prompt accepts confirm only after a short hold, so a
    /// flap pressed at the moment of death does not immediately submit.
    pub fn awaiting_confirm(&self) -> bool {
        self.game.over && self.dead_timer > 15
    }

    pub fn result(&self) -> Transition {
        Transition::SubmitScore {
            score: self.game.score,
            name: self.player.clone(),
        }
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        self.game.draw(buf);
        if self.awaiting_confirm() {
            self.draw_game_over(buf);
        }
    }

    fn draw_game_over(&self, buf: &mut PixelBuf) {
        buf.dim();
        let (pw, ph) = (buf.w as i32, buf.h as i32);
        let cx = pw / 2;
        let panel_w = (pw * 2 / 3).min(100).max(60);
        let panel_h = 34.min(ph - 4);
        let px = cx - panel_w / 2;
        let py = ph / 2 - panel_h / 2;

        buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, render::SHADOW);
        buf.fill_rect(px, py, panel_w, panel_h, render::DIRT);
        buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, render::DIRT_PALE);

        render::draw_text_centered(buf, cx, py + 3, "GAME OVER", 1, render::BIRD_BEAK);
        render::draw_number(buf, cx, py + 11, self.game.score, render::WHITE);
        render::draw_number(buf, cx, py + 19, self.best, render::BIRD_Y);
        render::draw_text_centered(buf, cx, py + 27, "PRESS ENTER", 1, render::BIRD_PUPIL);
    }
}

// ── Shared chrome ───────────────────────────────────────────────────────────

fn draw_backdrop(buf: &mut PixelBuf) {
    let (pw, ph) = (buf.w as i32, buf.h as i32);
    let ground_y = ph - 6;
    for y in 0..ground_y {
        let t = (y * 256 / ground_y.max(1)) as u16;
        let c = render::Rgb::lerp(render::SKY_TOP, render::SKY_BOT, t);
        for x in 0..pw {
            buf.set(x, y, c);
        }
    }
    for x in 0..pw {
        buf.set(x, ground_y, if (x / 3) % 2 == 0 { render::GRASS } else { render::GRASS_LIGHT });
        buf.set(x, ground_y + 1, render::GRASS);
    }
    for y in (ground_y + 2)..ph {
        for x in 0..pw {
            let stripe = (x + (y - ground_y) * 2) % 12 < 6;
            buf.set(x, y, if stripe { render::DIRT } else { render::DIRT_DARK });
        }
    }
}

fn panel(buf: &mut PixelBuf, r: &PxRect, highlight: bool) {
    buf.fill_rect(r.x - 1, r.y - 1, r.w + 2, r.h + 2, render::SHADOW);
    buf.fill_rect(r.x, r.y, r.w, r.h, render::DIRT);
    let inner = if highlight {
        render::BIRD_HI
    } else {
        render::DIRT_PALE
    };
    buf.fill_rect(r.x + 1, r.y + 1, r.w - 2, r.h - 2, inner);
}
