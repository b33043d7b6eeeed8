use crate::config::Config;
use crate::render::{self, PixelBuf, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

// ── Geometry ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Strict overlap on both axes. Rectangles that merely share an edge
    /// (zero overlapping area) do not intersect.
    pub fn intersects(&self, o: &Rect) -> bool {
        self.x < o.x + o.w && self.x + self.w > o.x && self.y < o.y + o.h && self.y + self.h > o.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

// ── Bird ────────────────────────────────────────────────────────────────────

pub struct Bird {
    /// Vertical center in world units.
    pub y: f64,
    pub velocity: f64,
}

impl Bird {
    pub fn new(cfg: &Config) -> Self {
        Self {
            y: cfg.screen_h / 2.0,
            velocity: 0.0,
        }
    }

    /// One tick of gravity. The ceiling zeroes velocity; the floor only
    /// clamps position, since floor contact ends the run.
    pub fn update(&mut self, cfg: &Config) {
        self.velocity += cfg.gravity;
        self.y += self.velocity;
        if self.y > cfg.screen_h {
            self.y = cfg.screen_h;
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.velocity = 0.0;
        }
    }

    /// Instantaneous impulse, overriding whatever velocity the bird had.
    pub fn jump(&mut self, cfg: &Config) {
        self.velocity = cfg.jump_impulse;
    }

    pub fn rect(&self, cfg: &Config) -> Rect {
        Rect {
            x: cfg.bird_x - cfg.bird_w / 2.0,
            y: self.y - cfg.bird_h / 2.0,
            w: cfg.bird_w,
            h: cfg.bird_h,
        }
    }

    pub fn hits_floor(&self, cfg: &Config) -> bool {
        self.rect(cfg).bottom() >= cfg.screen_h
    }
}

// ── Pipe ────────────────────────────────────────────────────────────────────

pub struct Pipe {
    pub x: f64,
    /// Top edge of the gap, fixed at creation.
    pub gap_top: f64,
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: f64, gap_top: f64) -> Self {
        Self {
            x,
            gap_top,
            passed: false,
        }
    }

    pub fn update(&mut self, cfg: &Config) {
        self.x -= cfg.pipe_speed;
    }

    pub fn top_rect(&self, cfg: &Config) -> Rect {
        Rect {
            x: self.x,
            y: 0.0,
            w: cfg.pipe_w,
            h: self.gap_top,
        }
    }

    pub fn bottom_rect(&self, cfg: &Config) -> Rect {
        let top = self.gap_top + cfg.pipe_gap;
        Rect {
            x: self.x,
            y: top,
            w: cfg.pipe_w,
            h: cfg.screen_h - top,
        }
    }

    pub fn collides(&self, bird: &Rect, cfg: &Config) -> bool {
        self.top_rect(cfg).intersects(bird) || self.bottom_rect(cfg).intersects(bird)
    }
}

// ── Spawner ─────────────────────────────────────────────────────────────────

/// Time-gated pipe creation against the simulated clock.
pub struct Spawner {
    interval: Duration,
    last_spawn: Duration,
}

impl Spawner {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_spawn: Duration::ZERO,
        }
    }

    /// True exactly when a full interval has elapsed since the last spawn;
    /// resets the timer to `now` when it fires.
    pub fn poll(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_spawn) > self.interval {
            self.last_spawn = now;
            true
        } else {
            false
        }
    }
}

// ── Game ────────────────────────────────────────────────────────────────────

#[derive(Default, Clone, Copy)]
pub struct TickOutcome {
    pub scored: bool,
    pub collided: bool,
}

pub struct Game {
    cfg: Config,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub score: u32,
    pub over: bool,
    spawner: Spawner,
    clock: Duration,
    frame: u64,
    rng: StdRng,
}

impl Game {
    pub fn new(cfg: Config) -> Self {
        let rng = StdRng::from_entropy();
        Self::with_rng(cfg, rng)
    }

    #[cfg(test)]
    pub fn seeded(cfg: Config, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: Config, rng: StdRng) -> Self {
        Self {
            bird: Bird::new(&cfg),
            pipes: Vec::new(),
            score: 0,
            over: false,
            spawner: Spawner::new(cfg.spawn_interval),
            clock: Duration::ZERO,
            frame: 0,
            rng,
            cfg,
        }
    }

    pub fn flap(&mut self) {
        if !self.over {
            self.bird.jump(&self.cfg);
        }
    }

    /// One fixed-rate simulation step. Once the run is over the world is
    /// frozen and ticks are no-ops.
    pub fn tick(&mut self) -> TickOutcome {
        let mut out = TickOutcome::default();
        if self.over {
            return out;
        }
        self.frame += 1;
        self.clock += self.cfg.game_tick;

        self.bird.update(&self.cfg);

        if self.spawner.poll(self.clock) {
            let max_top = self.cfg.screen_h - self.cfg.gap_margin - self.cfg.pipe_gap;
            let gap_top = self.rng.gen_range(self.cfg.gap_margin..=max_top);
            self.pipes.push(Pipe::new(self.cfg.screen_w, gap_top));
        }

        let bird_rect = self.bird.rect(&self.cfg);
        for pipe in &mut self.pipes {
            pipe.update(&self.cfg);
            if pipe.collides(&bird_rect, &self.cfg) {
                out.collided = true;
            }
            // Trailing-edge comparison once per tick; at extreme pipe speeds
            // a pass could straddle two ticks, which is accepted.
            if !pipe.passed && pipe.x + self.cfg.pipe_w < self.cfg.bird_x {
                pipe.passed = true;
                self.score += 1;
                out.scored = true;
            }
        }

        let pw = self.cfg.pipe_w;
        self.pipes.retain(|p| p.x > -pw);

        if self.bird.hits_floor(&self.cfg) {
            out.collided = true;
        }
        if out.collided {
            self.over = true;
        }
        out
    }

    // ── Drawing ─────────────────────────────────────────────────────────────

    pub fn draw(&self, buf: &mut PixelBuf) {
        let v = View::new(buf, &self.cfg);
        self.draw_sky(buf, &v);
        self.draw_hills(buf, &v);
        self.draw_pipes(buf, &v);
        self.draw_ground(buf, &v);
        self.draw_bird(buf, &v);
        render::draw_number(buf, v.pw / 2, 4, self.score, render::WHITE);
    }

    fn draw_sky(&self, buf: &mut PixelBuf, v: &View) {
        let sky_h = v.sky_h();
        for y in 0..sky_h {
            let t = (y * 256 / sky_h.max(1)) as u16;
            let c = Rgb::lerp(render::SKY_TOP, render::SKY_BOT, t);
            for x in 0..v.pw {
                buf.set(x, y, c);
            }
        }
    }

    fn draw_hills(&self, buf: &mut PixelBuf, v: &View) {
        let base = v.sky_h();
        let scroll = self.frame as f64 * self.cfg.pipe_speed * v.sx;
        // Far hills
        for x in 0..v.pw {
            let fx = (x as f64 + scroll * 0.2) * 0.04;
            let h = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * v.scale;
            let top = base - h as i32 - (4.0 * v.scale) as i32;
            for y in top..base {
                buf.set(x, y, render::HILL_FAR);
            }
        }
        // Near hills
        for x in 0..v.pw {
            let fx = (x as f64 + scroll * 0.4) * 0.06;
            let h = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * v.scale;
            let top = base - h as i32 - (2.0 * v.scale) as i32;
            for y in top..base {
                buf.set(x, y, render::HILL_NEAR);
            }
        }
    }

    fn draw_ground(&self, buf: &mut PixelBuf, v: &View) {
        let gy = v.sky_h();
        let scroll = self.frame as f64 * self.cfg.pipe_speed * v.sx;
        for x in 0..v.pw {
            let alt = ((x as f64 + scroll) as i32 / 3) % 2 == 0;
            buf.set(x, gy, if alt { render::GRASS } else { render::GRASS_LIGHT });
            buf.set(x, gy + 1, render::GRASS);
        }
        for y in (gy + 2)..v.ph {
            for x in 0..v.pw {
                let stripe = ((x as f64 + scroll * 0.8) as i32 + (y - gy) * 2) % 12 < 6;
                buf.set(x, y, if stripe { render::DIRT } else { render::DIRT_DARK });
            }
        }
    }

    fn draw_pipes(&self, buf: &mut PixelBuf, v: &View) {
        let cap_extra = (2.0 * v.scale).max(1.0) as i32;
        let cap_h = (3.0 * v.scale).max(2.0) as i32;
        let pw = ((self.cfg.pipe_w * v.sx) as i32).max(2);

        for pipe in &self.pipes {
            let px = v.x(pipe.x);
            let gap_top = v.y(pipe.gap_top);
            let gap_bot = v.y(pipe.gap_top + self.cfg.pipe_gap);

            // Top body
            for x in 0..pw {
                let c = render::pipe_shade(x, pw);
                for y in 0..gap_top - cap_h {
                    buf.set(px + x, y, c);
                }
            }
            // Top cap
            for x in -cap_extra..(pw + cap_extra) {
                let c = render::pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in (gap_top - cap_h)..gap_top {
                    buf.set(px + x, y, c);
                }
                buf.set(px + x, gap_top - cap_h, render::CAP_DARK);
                buf.set(px + x, gap_top - 1, render::CAP_DARK);
            }

            // Bottom cap
            for x in -cap_extra..(pw + cap_extra) {
                let c = render::pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in gap_bot..(gap_bot + cap_h) {
                    buf.set(px + x, y, c);
                }
                buf.set(px + x, gap_bot, render::CAP_DARK);
                buf.set(px + x, gap_bot + cap_h - 1, render::CAP_DARK);
            }
            // Bottom body
            for x in 0..pw {
                let c = render::pipe_shade(x, pw);
                for y in (gap_bot + cap_h)..v.sky_h() {
                    buf.set(px + x, y, c);
                }
            }
        }
    }

    fn draw_bird(&self, buf: &mut PixelBuf, v: &View) {
        let cx = v.x(self.cfg.bird_x);
        let cy = v.y(self.bird.y);
        let s = v.scale;

        let tilt = (self.bird.velocity / (3.0 * s)).clamp(-1.0, 1.0) as i32;

        let bw = ((self.cfg.bird_w / 2.0 * v.sx) as i32).max(2);
        let bh = ((self.cfg.bird_h / 2.0 * v.sy) as i32).max(2);
        buf.fill_rect(cx - bw, cy - bh, bw * 2 + 1, bh * 2, render::BIRD_Y);

        // Highlight along the top of the body
        buf.fill_rect(
            cx - bw + 1,
            cy - bh,
            bw * 2 - 2,
            1.max((s * 0.8) as i32),
            render::BIRD_HI,
        );

        // Wing
        let wing_y_off = if self.frame % 8 < 4 { -1 } else { 1 };
        let wing_h = (1.5 * s).max(1.0) as i32;
        let wing_w = (2.0 * s).max(1.0) as i32;
        buf.fill_rect(
            cx - bw + 1,
            cy + wing_y_off + tilt,
            wing_w,
            wing_h,
            render::BIRD_WING,
        );

        // Eye
        let ex = cx + bw - (1.5 * s) as i32;
        let ey = cy - bh + (1.0 * s).max(1.0) as i32;
        let eye_r = (0.8 * s).max(1.0) as i32;
        buf.fill_rect(ex, ey, eye_r + 1, eye_r + 1, render::BIRD_EYE);
        buf.set(ex + eye_r, ey + eye_r, render::BIRD_PUPIL);
        if s >= 1.5 {
            buf.set(ex + eye_r - 1, ey + eye_r, render::BIRD_PUPIL);
        }

        // Beak
        let beak_x = cx + bw;
        let beak_y = cy - (0.5 * s) as i32 + tilt;
        let beak_w = (2.5 * s).max(2.0) as i32;
        let beak_h = (1.5 * s).max(1.0) as i32;
        buf.fill_rect(beak_x, beak_y, beak_w, beak_h / 2 + 1, render::BIRD_BEAK_HI);
        buf.fill_rect(
            beak_x,
            beak_y + beak_h / 2 + 1,
            beak_w,
            beak_h / 2,
            render::BIRD_BEAK,
        );

        // Tail
        let tail_w = (1.5 * s).max(1.0) as i32;
        buf.fill_rect(cx - bw - tail_w, cy - 1 + tilt, tail_w, 2, render::BIRD_WING);
    }
}

/// Maps the fixed world playfield onto the terminal pixel buffer, reserving
/// a strip at the bottom for the decorative ground.
struct View {
    pw: i32,
    ph: i32,
    ground_h: i32,
    scale: f64,
    sx: f64,
    sy: f64,
}

impl View {
    fn new(buf: &PixelBuf, cfg: &Config) -> Self {
        let scale = buf.h as f64 / 48.0;
        let ground_h = (8.0 * scale).max(6.0) as i32;
        let sky_h = (buf.h as i32 - ground_h).max(1);
        Self {
            pw: buf.w as i32,
            ph: buf.h as i32,
            ground_h,
            scale,
            sx: buf.w as f64 / cfg.screen_w,
            sy: sky_h as f64 / cfg.screen_h,
        }
    }

    fn sky_h(&self) -> i32 {
        self.ph - self.ground_h
    }

    fn x(&self, wx: f64) -> i32 {
        (wx * self.sx) as i32
    }

    fn y(&self, wy: f64) -> i32 {
        (wy * self.sy) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn gravity_accumulates_each_tick() {
        let c = cfg();
        let mut bird = Bird::new(&c);
        for i in 1..=20 {
            bird.update(&c);
            assert_eq!(bird.velocity, i as f64 * c.gravity);
        }
    }

    #[test]
    fn jump_overrides_velocity() {
        let c = cfg();
        let mut bird = Bird::new(&c);
        for _ in 0..50 {
            bird.update(&c);
        }
        bird.jump(&c);
        assert_eq!(bird.velocity, c.jump_impulse);
        bird.jump(&c);
        assert_eq!(bird.velocity, c.jump_impulse);
    }

    #[test]
    fn ceiling_clamps_and_zeroes_velocity() {
        let c = cfg();
        let mut bird = Bird::new(&c);
        bird.velocity = -1000.0;
        bird.update(&c);
        assert_eq!(bird.y, 0.0);
        assert_eq!(bird.velocity, 0.0);
    }

    #[test]
    fn floor_clamps_position() {
        let c = cfg();
        let mut bird = Bird::new(&c);
        bird.velocity = 1000.0;
        bird.update(&c);
        assert_eq!(bird.y, c.screen_h);
        assert!(bird.hits_floor(&c));
    }

    #[test]
    fn rects_sharing_an_edge_do_not_intersect() {
        let a = Rect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        };
        let b = Rect {
            x: 10.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        };
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn any_positive_overlap_intersects() {
        let a = Rect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        };
        let b = Rect {
            x: 9.99,
            y: 9.99,
            w: 10.0,
            h: 10.0,
        };
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn disjoint_rects_do_not_intersect() {
        let a = Rect {
            x: 0.0,
            y: 0.0,
            w: 5.0,
            h: 5.0,
        };
        let b = Rect {
            x: 6.0,
            y: 0.0,
            w: 5.0,
            h: 5.0,
        };
        assert!(!a.intersects(&b));
    }

    #[test]
    fn spawner_fires_once_per_elapsed_interval() {
        let mut s = Spawner::new(Duration::from_millis(1500));
        assert!(!s.poll(Duration::from_millis(1500)));
        assert!(s.poll(Duration::from_millis(1501)));
        // Timer was reset; nothing until another full interval passes.
        assert!(!s.poll(Duration::from_millis(2000)));
        assert!(!s.poll(Duration::from_millis(3001)));
        assert!(s.poll(Duration::from_millis(3002)));
    }

    #[test]
    fn spawner_with_wide_timestamps_fires_each_time() {
        let mut s = Spawner::new(Duration::from_millis(1500));
        for i in 1..=5u64 {
            assert!(s.poll(Duration::from_millis(i * 1600)));
        }
    }

    #[test]
    fn pipe_segments_span_screen_minus_gap() {
        let c = cfg();
        let p = Pipe::new(c.screen_w, 120.0);
        let top = p.top_rect(&c);
        let bot = p.bottom_rect(&c);
        assert_eq!(top.y, 0.0);
        assert_eq!(top.h, 120.0);
        assert_eq!(bot.y, 120.0 + c.pipe_gap);
        assert_eq!(bot.bottom(), c.screen_h);
    }

    #[test]
    fn pipe_gap_admits_a_centered_bird() {
        let c = cfg();
        let p = Pipe::new(c.bird_x - c.pipe_w / 2.0, 200.0);
        let bird = Bird {
            y: 200.0 + c.pipe_gap / 2.0,
            velocity: 0.0,
        };
        assert!(!p.collides(&bird.rect(&c), &c));
        let high = Bird {
            y: 200.0 - 1.0,
            velocity: 0.0,
        };
        assert!(p.collides(&high.rect(&c), &c));
    }

    #[test]
    fn first_pipe_spawns_after_one_interval_at_right_edge() {
        let c = cfg();
        let mut game = Game::seeded(c.clone(), 7);
        // Hold the bird in the air so it survives long enough.
        let ticks_per_interval =
            (c.spawn_interval.as_secs_f64() / c.game_tick.as_secs_f64()).ceil() as u32;
        for i in 0..ticks_per_interval {
            if i % 10 == 0 {
                game.flap();
            }
            game.tick();
        }
        assert!(!game.over);
        assert_eq!(game.pipes.len(), 1);
        let p = &game.pipes[0];
        // Spawned at the right edge, moved once on its spawn tick.
        assert_eq!(p.x, c.screen_w - c.pipe_speed);
        assert!(p.gap_top >= c.gap_margin);
        assert!(p.gap_top <= c.screen_h - c.gap_margin - c.pipe_gap);
    }

    #[test]
    fn passing_a_pipe_scores_exactly_once() {
        let c = cfg();
        let mut game = Game::seeded(c.clone(), 1);
        // A pipe just about to clear the bird's x, gap nowhere near the bird.
        game.pipes.push(Pipe::new(c.bird_x - c.pipe_w, 230.0));
        game.bird.y = 230.0 + c.pipe_gap / 2.0;
        game.bird.velocity = 0.0;
        let out = game.tick();
        assert!(out.scored);
        assert_eq!(game.score, 1);
        let out = game.tick();
        assert!(!out.scored);
        assert_eq!(game.score, 1);
    }

    #[test]
    fn offscreen_pipes_are_dropped_in_order() {
        let c = cfg();
        let mut game = Game::seeded(c.clone(), 1);
        game.bird.y = 230.0 + c.pipe_gap / 2.0;
        game.pipes.push(Pipe::new(-c.pipe_w + c.pipe_speed, 230.0));
        game.pipes.push(Pipe::new(150.0, 230.0));
        game.pipes.push(Pipe::new(250.0, 230.0));
        game.tick();
        assert_eq!(game.pipes.len(), 2);
        assert!(game.pipes[0].x < game.pipes[1].x);
    }

    #[test]
    fn floor_contact_ends_the_run_and_freezes_it() {
        let c = cfg();
        let mut game = Game::seeded(c, 1);
        let mut out = game.tick();
        while !game.over {
            out = game.tick();
        }
        assert!(out.collided);
        let y = game.bird.y;
        let score = game.score;
        let out = game.tick();
        assert!(!out.collided && !out.scored);
        assert_eq!(game.bird.y, y);
        assert_eq!(game.score, score);
        // Flapping a finished run does nothing.
        let v = game.bird.velocity;
        game.flap();
        assert_eq!(game.bird.velocity, v);
        assert!(game.over);
    }

    #[test]
    fn pipe_overlap_ends_the_run() {
        let c = cfg();
        let mut game = Game::seeded(c.clone(), 1);
        // Pipe straddling the bird, gap far below it.
        game.pipes
            .push(Pipe::new(c.bird_x - c.pipe_w / 2.0 + c.pipe_speed, 300.0));
        game.bird.y = 100.0;
        game.bird.velocity = 0.0;
        let out = game.tick();
        assert!(out.collided);
        assert!(game.over);
    }
}
