use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::compositor::Compositor;
use crate::compositor::Frame;
use crate::config::Config;
use crate::config::ConfigError;
use crate::grid::Grid;
use crate::interaction;
use crate::pacing::PacingController;
use crate::pacing::Tick;
use crate::palette::Color;
use crate::palette::Palette;
use crate::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Idle,
    Running,

    /// Pointer input edits cells. The simulation is paused.
    Paint,
}

/// Which palette entry a [`Command::SetColor`] replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Dead,
    Alive,
    Mesh,
}

/// Everything a host can ask of a [`Simulation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,

    /// Start when paused, pause when running
    TogglePause,
    SetMode(RunMode),
    TogglePaintMode,

    /// Advance exactly one generation
    Step,
    Randomize,
    Clear,

    SetRate(f64),

    /// Add to the current rate
    AdjustRate(f64),

    Resize {
        rows: usize,
        cols: usize,
    },

    /// The host viewport is now `width` pixels wide
    Relayout {
        width: f64,
    },

    PaintCell {
        row: usize,
        col: usize,
        alive: bool,
    },
    ToggleCell {
        row: usize,
        col: usize,
    },

    SetColor(ColorTarget, Color),
    ToggleMesh,
}

/// The whole simulation context: cells, clock, run mode and the compositor that draws them.
///
/// Hosts drive it with [`Simulation::apply`] for commands and [`Simulation::tick`] once per
/// display refresh, then read [`Simulation::frame`] whenever [`Simulation::frame_serial`] moves.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    pacing: PacingController,
    palette: Palette,
    compositor: Compositor,

    mode: RunMode,

    /// Generations since the last reset
    generation: u64,

    /// Cells changed by the most recent tick or step, summed over its generations
    changed: usize,

    /// Bumped whenever the canvas is drawn on
    frame_serial: u64,

    density: f64,
}

impl Simulation {
    pub fn new(rows: usize, cols: usize, rate: f64, palette: Palette, cell_size: usize) -> Self {
        let mut sim = Self {
            grid: Grid::new(rows, cols),
            pacing: PacingController::new(rate),
            palette,
            compositor: Compositor::new(cell_size),
            mode: RunMode::Idle,
            generation: 0,
            changed: 0,
            frame_serial: 0,
            density: interaction::DEFAULT_DENSITY,
        };

        sim.render();
        sim
    }

    /// Build a simulation as configured, for a viewport `viewport_width` pixels wide.
    ///
    /// Explicit `rows` and `cols` win over the viewport. The seed pattern is stamped and, with
    /// `autostart`, the simulation is left running.
    pub fn from_config(config: &Config, viewport_width: f64) -> Result<Self, ConfigError> {
        let palette = config.palette()?;

        let mut sim = Self::new(0, 0, config.steps_per_second, palette, config.cell_size);
        sim.density = config.density;
        sim.compositor.set_mesh(config.mesh);
        sim.compositor.set_mesh_opacity(config.mesh_opacity);

        match (config.rows, config.cols) {
            (Some(rows), Some(cols)) => sim.resize(rows, cols),
            _ => sim.relayout(viewport_width),
        }

        if let Some(name) = &config.seed_pattern {
            match patterns::find(name) {
                Some(pattern) => pattern.stamp_centered(&mut sim.grid),
                None => warn!(name, "unknown seed pattern"),
            }
        }

        sim.render();

        if config.autostart {
            sim.start();
        }

        Ok(sim)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn changed(&self) -> usize {
        self.changed
    }

    pub fn rate(&self) -> f64 {
        self.pacing.rate()
    }

    pub fn frame(&self) -> &Frame {
        self.compositor.canvas()
    }

    pub fn frame_serial(&self) -> u64 {
        self.frame_serial
    }

    pub fn apply(&mut self, command: Command) {
        debug!(?command, "apply");

        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::TogglePause => {
                if self.mode == RunMode::Running {
                    self.pause()
                } else {
                    self.start()
                }
            }
            Command::SetMode(mode) => self.set_mode(mode),
            Command::TogglePaintMode => self.toggle_paint_mode(),
            Command::Step => self.step(),
            Command::Randomize => self.randomize(),
            Command::Clear => self.clear(),
            Command::SetRate(rate) => {
                self.set_rate(rate);
            }
            Command::AdjustRate(delta) => {
                self.set_rate(self.rate() + delta);
            }
            Command::Resize { rows, cols } => self.resize(rows, cols),
            Command::Relayout { width } => self.relayout(width),
            Command::PaintCell { row, col, alive } => {
                self.paint_cell(row, col, alive);
            }
            Command::ToggleCell { row, col } => {
                self.toggle_cell(row, col);
            }
            Command::SetColor(target, color) => self.set_color(target, color),
            Command::ToggleMesh => {
                self.compositor.toggle_mesh();
                self.render();
            }
        }
    }

    /// Start running. Leaves paint mode.
    pub fn start(&mut self) {
        if self.mode == RunMode::Running {
            return;
        }

        self.pacing.start();
        self.mode = RunMode::Running;
    }

    /// Stop running. Paint mode is kept.
    pub fn pause(&mut self) {
        self.pacing.pause();

        if self.mode == RunMode::Running {
            self.mode = RunMode::Idle;
        }
    }

    pub fn set_mode(&mut self, mode: RunMode) {
        match mode {
            RunMode::Running => self.start(),
            RunMode::Idle | RunMode::Paint => {
                self.pause();

                if self.mode != mode {
                    info!(?mode, "mode changed");
                }

                self.mode = mode;
            }
        }
    }

    pub fn toggle_paint_mode(&mut self) {
        if self.mode == RunMode::Paint {
            self.set_mode(RunMode::Idle);
        } else {
            self.set_mode(RunMode::Paint);
        }
    }

    /// Returns the rate in effect after clamping.
    pub fn set_rate(&mut self, rate: f64) -> f64 {
        self.pacing.set_rate(rate)
    }

    /// Reallocate the grid, losing its cells. Ignored when a dimension is zero or the grid would
    /// be too large to composite.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if self.compositor.canvas_size(rows, cols).is_none() {
            warn!(rows, cols, "ignoring resize beyond the canvas limits");
            return;
        }

        if self.grid.resize(rows, cols) {
            self.generation = 0;
            self.changed = 0;
            self.render();
        }
    }

    /// Resize to fit a viewport `width` pixels wide.
    pub fn relayout(&mut self, width: f64) {
        let (rows, cols) = interaction::relayout(width, self.compositor.cell_size(), self.density);
        self.resize(rows, cols);
    }

    /// Pause, then set every cell alive or dead at random.
    pub fn randomize(&mut self) {
        self.pause();
        self.grid.randomize();
        self.generation = 0;
        self.changed = 0;
        self.render();
    }

    /// Pause, then kill every cell.
    pub fn clear(&mut self) {
        self.pause();
        self.grid.clear();
        self.generation = 0;
        self.changed = 0;
        self.render();
    }

    /// Advance a single generation, whatever the mode.
    pub fn step(&mut self) {
        self.changed = self.grid.step();
        self.generation += 1;
        self.render();
    }

    /// Set a cell and draw it right away. Only honored in paint mode; returns whether the cell
    /// was painted.
    pub fn paint_cell(&mut self, row: usize, col: usize, alive: bool) -> bool {
        if self.mode != RunMode::Paint || self.grid.get(row, col).is_none() {
            return false;
        }

        self.grid.set(row, col, alive);
        self.draw_cell(row, col, alive);

        true
    }

    /// Flip a cell and draw it right away. Only honored in paint mode; returns the new state.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Option<bool> {
        if self.mode != RunMode::Paint {
            return None;
        }

        let alive = self.grid.toggle(row, col)?;
        self.draw_cell(row, col, alive);

        Some(alive)
    }

    pub fn set_color(&mut self, target: ColorTarget, color: Color) {
        let changed = match target {
            ColorTarget::Dead => self.palette.set_dead(color),
            ColorTarget::Alive => self.palette.set_alive(color),
            ColorTarget::Mesh => self.palette.set_mesh(color),
        };

        if changed {
            self.render();
        }
    }

    /// Let the pacing controller account for time `now` and run however many generations it
    /// owes, followed by one render.
    pub fn tick(&mut self, now: Duration) -> Tick {
        let tick = self.pacing.tick(now);

        if let Tick::Advance(n) = tick {
            let mut changed = 0;

            for _ in 0..n {
                changed += self.grid.step();
            }

            self.generation += n;
            self.changed = changed;
            trace!(generations = n, changed, generation = self.generation, "stepped");

            self.render();
        }

        tick
    }

    /// Full redraw of the canvas.
    pub fn render(&mut self) -> &Frame {
        self.frame_serial += 1;
        self.compositor.render(&self.grid, &self.palette)
    }

    fn draw_cell(&mut self, row: usize, col: usize, alive: bool) {
        if self.compositor.draw_cell(row, col, alive, &self.palette) {
            self.frame_serial += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn sim() -> Simulation {
        Simulation::new(8, 8, 10.0, Palette::default(), 2)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn paint_forces_pause() {
        let mut sim = sim();
        sim.start();

        sim.apply(Command::TogglePaintMode);

        assert_eq!(sim.mode(), RunMode::Paint);
        assert_eq!(sim.tick(ms(0)), Tick::Stopped);
    }

    #[test]
    fn start_leaves_paint() {
        let mut sim = sim();
        sim.set_mode(RunMode::Paint);

        sim.apply(Command::Start);

        assert_eq!(sim.mode(), RunMode::Running);
        assert_eq!(sim.tick(ms(0)), Tick::Anchored);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut sim = sim();

        sim.pause();
        sim.pause();
        assert_eq!(sim.mode(), RunMode::Idle);

        sim.set_mode(RunMode::Paint);
        sim.pause();
        assert_eq!(sim.mode(), RunMode::Paint);
    }

    #[test]
    fn painting_needs_paint_mode() {
        let mut sim = sim();

        assert!(!sim.paint_cell(1, 1, true));
        assert_eq!(sim.toggle_cell(1, 1), None);
        assert_eq!(sim.grid().population(), 0);

        sim.set_mode(RunMode::Paint);
        let serial = sim.frame_serial();

        assert!(sim.paint_cell(1, 1, true));
        assert_eq!(sim.toggle_cell(2, 2), Some(true));
        assert_eq!(sim.grid().population(), 2);
        assert_eq!(sim.frame_serial(), serial + 2);

        // outside the grid
        assert!(!sim.paint_cell(8, 0, true));
        assert_eq!(sim.toggle_cell(0, 8), None);
    }

    #[test]
    fn painted_cell_shows_immediately() {
        let mut sim = sim();
        sim.set_mode(RunMode::Paint);

        sim.paint_cell(0, 1, true);

        // cell size 2, so column 1 starts at x = 2
        assert_eq!(sim.frame().pixel(2, 0), Some([255, 255, 255, 255]));
        assert_eq!(sim.frame().pixel(1, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn tick_steps_and_counts_generations() {
        let mut sim = sim();
        for c in 2..5 {
            sim.grid.set(3, c, true);
        }

        sim.start();
        sim.tick(ms(1_000));
        let serial = sim.frame_serial();

        // 10 generations per second, 350ms in
        assert_eq!(sim.tick(ms(1_350)), Tick::Advance(3));
        assert_eq!(sim.generation(), 3);
        assert_eq!(sim.frame_serial(), serial + 1);

        // a blinker flips four cells per generation
        assert_eq!(sim.changed(), 12);

        // an odd number of blinker steps leaves it vertical
        assert_eq!(sim.grid().get(2, 3), Some(true));
        assert_eq!(sim.grid().get(3, 2), Some(false));
    }

    #[test]
    fn step_counts_changes() {
        let mut sim = sim();
        for c in 2..5 {
            sim.grid.set(3, c, true);
        }

        sim.apply(Command::Step);
        assert_eq!(sim.changed(), 4);

        sim.apply(Command::Clear);
        assert_eq!(sim.changed(), 0);
    }

    #[test]
    fn randomize_and_clear_reset() {
        let mut sim = sim();
        sim.step();
        sim.step();
        sim.start();

        sim.apply(Command::Randomize);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.mode(), RunMode::Idle);
        assert!(sim.grid().population() > 0);

        sim.step();
        sim.apply(Command::Clear);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.grid().population(), 0);
    }

    #[test]
    fn zero_resize_is_ignored() {
        let mut sim = sim();
        sim.step();

        sim.apply(Command::Resize { rows: 0, cols: 4 });

        assert_eq!((sim.grid().rows(), sim.grid().cols()), (8, 8));
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn oversized_resize_is_ignored() {
        let mut sim = sim();
        sim.step();

        sim.apply(Command::Resize {
            rows: usize::MAX / 2,
            cols: 3,
        });
        sim.apply(Command::Resize {
            rows: 1,
            cols: usize::MAX / 2,
        });

        assert_eq!((sim.grid().rows(), sim.grid().cols()), (8, 8));
        assert_eq!((sim.frame().width(), sim.frame().height()), (16, 16));
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn resize_reshapes_the_canvas() {
        let mut sim = sim();

        sim.apply(Command::Resize { rows: 3, cols: 5 });

        assert_eq!((sim.frame().width(), sim.frame().height()), (10, 6));
    }

    #[test]
    fn relayout_uses_density() {
        let mut sim = sim();

        // 200px / 2px cells * 0.8 = 80 columns
        sim.apply(Command::Relayout { width: 200.0 });

        assert_eq!((sim.grid().rows(), sim.grid().cols()), (45, 80));
    }

    #[test]
    fn rate_commands_clamp() {
        let mut sim = sim();

        sim.apply(Command::SetRate(0.0));
        assert_eq!(sim.rate(), 1.0);

        sim.apply(Command::AdjustRate(9.0));
        assert_eq!(sim.rate(), 10.0);

        sim.apply(Command::AdjustRate(-50.0));
        assert_eq!(sim.rate(), 1.0);
    }

    #[test]
    fn color_change_rerenders() {
        let mut sim = sim();
        let serial = sim.frame_serial();

        sim.apply(Command::SetColor(ColorTarget::Dead, Color::BLACK));
        assert_eq!(sim.frame_serial(), serial);

        sim.apply(Command::SetColor(ColorTarget::Dead, Color::rgb(0, 0, 9)));
        assert_eq!(sim.frame_serial(), serial + 1);
        assert_eq!(sim.frame().pixel(0, 0), Some([0, 0, 9, 255]));
    }

    #[test]
    fn default_config_fits_the_viewport() -> anyhow::Result<()> {
        let sim = Simulation::from_config(&Config::default(), 200.0)?;

        assert_eq!((sim.grid().rows(), sim.grid().cols()), (45, 80));
        assert_eq!(sim.grid().population(), 5);
        assert_eq!(sim.mode(), RunMode::Running);
        assert_eq!(sim.generation(), 0);

        Ok(())
    }

    #[test]
    fn config_dimensions_win_over_the_viewport() -> anyhow::Result<()> {
        let config = Config {
            rows: Some(10),
            cols: Some(12),
            seed_pattern: Some("Exploder".to_string()),
            autostart: false,
            ..Config::default()
        };
        let mut sim = Simulation::from_config(&config, 200.0)?;

        assert_eq!((sim.grid().rows(), sim.grid().cols()), (10, 12));
        assert_eq!(sim.grid().population(), 12);
        assert_eq!(sim.mode(), RunMode::Idle);
        assert_eq!(sim.tick(ms(0)), Tick::Stopped);

        Ok(())
    }

    #[test]
    fn config_needs_both_dimensions() -> anyhow::Result<()> {
        let config = Config {
            rows: Some(10),
            ..Config::default()
        };
        let sim = Simulation::from_config(&config, 200.0)?;

        assert_eq!((sim.grid().rows(), sim.grid().cols()), (45, 80));

        Ok(())
    }

    #[test]
    fn unknown_seed_leaves_grid_empty() -> anyhow::Result<()> {
        let config = Config {
            seed_pattern: Some("spaceship".to_string()),
            ..Config::default()
        };
        let sim = Simulation::from_config(&config, 200.0)?;
        assert_eq!(sim.grid().population(), 0);
        assert_eq!(sim.mode(), RunMode::Running);

        let config = Config {
            seed_pattern: None,
            ..Config::default()
        };
        let sim = Simulation::from_config(&config, 200.0)?;
        assert_eq!(sim.grid().population(), 0);

        Ok(())
    }

    #[test]
    fn bad_config_color_is_an_error() {
        let config = Config {
            alive_color: "#12".to_string(),
            ..Config::default()
        };

        assert!(matches!(
            Simulation::from_config(&config, 200.0),
            Err(ConfigError::Color {
                field: "alive_color",
                ..
            })
        ));
    }
}
