use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::time;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::execute;
use crossterm::terminal;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lifeloop::braille::BrailleView;
use lifeloop::config;
use lifeloop::config::Config;
use lifeloop::config::Display;
use lifeloop::events::Event;
use lifeloop::interaction::Painter;
use lifeloop::io::convert_event;
use lifeloop::simulation::Command;
use lifeloop::simulation::Simulation;
use lifeloop::term;

const FRAMERATE: u32 = 60;
const FRAMETIME: time::Duration =
    time::Duration::from_millis(((1f64 / FRAMERATE as f64) * 1_000f64) as u64);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_PATH));
    let config = config::load(&path);

    let (cols, _) = terminal::size().context("Failed to query the terminal size")?;
    let width = term::viewport_width(config.display, config.cell_size, cols);
    let mut sim = Simulation::from_config(&config, width).context("Invalid configuration")?;

    terminal::enable_raw_mode().context("Failed to enter raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture,
        cursor::Hide
    )?;

    let res = run(&mut stdout, &mut sim, &config);

    execute!(
        stdout,
        cursor::Show,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;

    res
}

fn run<W: Write>(out: &mut W, sim: &mut Simulation, config: &Config) -> anyhow::Result<()> {
    let origin = Instant::now();
    let mut painter = Painter::new(config.cell_size);
    let mut braille = BrailleView::new();

    let (mut cols, mut rows) = terminal::size()?;
    let mut drawn = None;

    execute!(out, terminal::Clear(terminal::ClearType::All))?;

    loop {
        let t = Instant::now();

        // Poll events for as long as FRAMETIME
        while event::poll(FRAMETIME.saturating_sub(t.elapsed()))? {
            let Some(event) = convert_event(event::read()?) else {
                continue;
            };

            match event {
                Event::Exit => return Ok(()),
                Event::Command(command) => sim.apply(command),
                Event::Pointer(pointer) => {
                    let (column, row) = pointer.position();
                    let at = term::pointer_position(config.display, config.cell_size, column, row);
                    let (rows, cols) = (sim.grid().rows(), sim.grid().cols());

                    if let Some(command) = painter.handle(pointer, at, sim.mode(), rows, cols) {
                        sim.apply(command);
                    }
                }
                Event::Viewport {
                    cols: new_cols,
                    rows: new_rows,
                } => {
                    (cols, rows) = (new_cols, new_rows);
                    debug!(cols, rows, "terminal resized");

                    let width = term::viewport_width(config.display, config.cell_size, cols);
                    sim.apply(Command::Relayout { width });

                    execute!(out, terminal::Clear(terminal::ClearType::All))?;
                    drawn = None;
                }
            }
        }

        sim.tick(origin.elapsed());

        // leave the last line for the status
        let canvas_rows = rows.saturating_sub(1);

        if drawn != Some(sim.frame_serial()) {
            match config.display {
                Display::Blocks => term::draw_frame(out, sim.frame(), cols, canvas_rows)?,
                Display::Braille => term::draw_text(out, braille.render(sim.grid()), canvas_rows)?,
            }

            drawn = Some(sim.frame_serial());
        }

        let status = term::Status {
            generation: sim.generation(),
            rate: sim.rate(),
            mode: sim.mode(),
            population: sim.grid().population(),
            changed: sim.changed(),
            rows: sim.grid().rows(),
            cols: sim.grid().cols(),
        };
        term::draw_status(out, &status, canvas_rows)?;

        out.flush()?;
    }
}
