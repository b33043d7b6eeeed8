mod config;
mod game;
mod render;
mod scores;
mod screens;
mod sound;

use config::Config;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute, terminal,
};
use render::PixelBuf;
use scores::ScoreBoard;
use screens::{GameScreen, MenuScreen, ScoresScreen, Transition};
use sound::Audio;
use std::io::{self, stdout};
use std::time::{Duration, Instant};

enum Screen {
    Menu(MenuScreen),
    Game(GameScreen),
    Scores(ScoresScreen),
}

/// Ctrl+C is the terminal's close signal; it exits from any screen.
fn is_close(ev: &Event) -> bool {
    matches!(
        ev,
        Event::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}

fn main() -> io::Result<()> {
    let cfg = Config::default();
    let board = ScoreBoard::new(cfg.scores_path.clone(), cfg.scores_limit);
    let audio = Audio::new();

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);

    let mut screen = Screen::Menu(MenuScreen::new(&cfg, String::new()));
    let mut player = String::new();

    loop {
        let frame_start = Instant::now();
        let frame_dur = match screen {
            Screen::Game(_) => cfg.game_tick,
            _ => cfg.menu_tick,
        };

        // Input
        let mut transition: Option<Transition> = None;
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            if is_close(&ev) {
                transition = Some(Transition::Exit);
                break;
            }
            if let Event::Resize(c, r) = ev {
                buf.resize(c as usize, r as usize * 2);
                continue;
            }
            match &mut screen {
                Screen::Menu(menu) => {
                    if let Some(t) = menu.handle_event(&ev, buf.w as i32, buf.h as i32) {
                        transition = Some(t);
                    }
                }
                Screen::Scores(scores) => {
                    if let Some(t) = scores.handle_event(&ev) {
                        transition = Some(t);
                    }
                }
                Screen::Game(game) => {
                    if let Event::Key(key) = &ev {
                        match key.code {
                            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => {
                                if game.awaiting_confirm() {
                                    transition = Some(game.result());
                                } else {
                                    game.flap();
                                    audio.flap();
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        if let Some(t) = transition {
            match t {
                Transition::Menu => {
                    screen = Screen::Menu(MenuScreen::new(&cfg, player.clone()));
                }
                Transition::Play { player: name } => {
                    player = name.clone();
                    screen = Screen::Game(GameScreen::new(cfg.clone(), name, board.best()));
                }
                Transition::Scores => {
                    screen = Screen::Scores(ScoresScreen::new(board.load().unwrap_or_default()));
                }
                Transition::SubmitScore { score, name } => {
                    // A failed write is not surfaced; the run is over either way.
                    let _ = board.save(score, &name);
                    player = name;
                    screen = Screen::Menu(MenuScreen::new(&cfg, player.clone()));
                }
                Transition::Exit => {
                    cleanup(&mut out)?;
                    return Ok(());
                }
            }
        }

        // Update + render
        match &mut screen {
            Screen::Menu(menu) => {
                menu.tick();
                menu.draw(&mut buf);
            }
            Screen::Scores(scores) => {
                scores.tick();
                scores.draw(&mut buf);
            }
            Screen::Game(game) => {
                let outcome = game.tick();
                if outcome.scored {
                    audio.score();
                }
                if outcome.collided {
                    audio.death();
                }
                game.draw(&mut buf);
            }
        }
        buf.render(&mut out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
