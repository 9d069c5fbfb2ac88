#![deny(clippy::all)]
#![forbid(unsafe_code)]

use clap::Parser;
use error_iter::ErrorIter as _;
use life_grid::{Board, BoardError, Canvas, GridSize, Pattern, Random, Rgba, World};
use log::{debug, error, info, trace};
use pixels_main_support::{AnimateError, AnimationConfig, animate, window_size_to_grid_size};
use std::process::ExitCode;
use thiserror::Error;
use winit::dpi::PhysicalSize;

const WINDOW_TITLE: &str = "Game of life";
const BACKGROUND_COLOR: Rgba = [0, 0, 0, 0xff];
const CELL_COLOR: Rgba = [200, 200, 200, 0xff];
const GRID_LINE_COLOR: Rgba = [80, 80, 80, 0xff];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial live cells as `x,y` pairs, e.g. `[1,1;2,2]`
    #[arg(short, long, value_name = "PATTERN")]
    initial: Option<Pattern>,

    /// Fill the board at random with this fraction of live cells instead
    #[arg(
        short,
        long,
        value_name = "DENSITY",
        value_parser = parse_density,
        conflicts_with = "initial"
    )]
    random: Option<f64>,

    /// Seed for --random
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    /// Window width in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Cell width and height in pixels
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    cell_size: u32,

    /// Generations per second
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
}

fn parse_density(s: &str) -> Result<f64, String> {
    let density: f64 = s.parse().map_err(|_| format!("`{s}` isn't a number"))?;
    if (0.0..=1.0).contains(&density) {
        Ok(density)
    } else {
        Err(format!("density must be between 0 and 1, got {density}"))
    }
}

impl Args {
    fn window_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }

    fn initial_life(&self) -> InitialLife {
        if let Some(pattern) = &self.initial {
            InitialLife::Pattern(pattern.clone())
        } else if let Some(density) = self.random {
            let rand = self.seed.map_or_else(Random::new, Random::from_seed);
            InitialLife::Random(rand, density)
        } else {
            InitialLife::Pattern(Pattern::default_seed())
        }
    }
}

#[derive(Debug)]
enum InitialLife {
    Pattern(Pattern),
    Random(Random, f64),
}

#[derive(Debug, Error)]
enum RunError {
    #[error("cannot create board")]
    Board(#[from] BoardError),
    #[error("animation failed")]
    Animate(#[from] AnimateError),
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error(err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), RunError> {
    let world = ConwayWorld::new(
        window_size_to_grid_size(args.window_size(), args.cell_size),
        args.cell_size,
        args.initial_life(),
    )?;
    let config = AnimationConfig {
        title: WINDOW_TITLE.to_string(),
        window_size: args.window_size(),
        ticks_per_second: args.fps,
    };
    animate(config, world)?;
    Ok(())
}

fn log_error<E: std::error::Error + 'static>(err: E) {
    error!("{err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}

#[derive(Debug)]
pub struct ConwayWorld {
    board: Board,
    cell_pixel_width: u32,
}

impl ConwayWorld {
    fn new(
        grid_size: GridSize,
        cell_pixel_width: u32,
        initial_life: InitialLife,
    ) -> Result<Self, BoardError> {
        assert!(cell_pixel_width > 0);
        let mut result = Self {
            board: Board::new(grid_size)?,
            cell_pixel_width,
        };
        info!("{grid_size} board, {cell_pixel_width}px cells");
        result.add_life(initial_life);
        Ok(result)
    }

    fn add_life(&mut self, initial_life: InitialLife) {
        match initial_life {
            InitialLife::Pattern(pattern) => {
                info!("seeding {} cells: {}", pattern.len(), pattern);
                self.board.seed(&pattern);
            }
            InitialLife::Random(mut rand, density) => {
                info!("seeding at random, density {density}");
                self.board.add_random_life(&mut rand, density);
            }
        }
        debug!("initial population {}", self.board.population());
    }

    fn draw_cells(&self, canvas: &mut impl Canvas) {
        let cell = self.cell_pixel_width;
        for loc in self.board.alive_locs() {
            canvas.fill_rect(loc.x as u32 * cell, loc.y as u32 * cell, cell, cell, CELL_COLOR);
        }
    }

    fn draw_grid_lines(&self, canvas: &mut impl Canvas) {
        let (width, height) = (canvas.width(), canvas.height());
        let step = self.cell_pixel_width as usize;
        for y in (self.cell_pixel_width..height).step_by(step) {
            canvas.draw_line((0, y), (width.saturating_sub(1), y), GRID_LINE_COLOR);
        }
        for x in (self.cell_pixel_width..width).step_by(step) {
            canvas.draw_line((x, 0), (x, height.saturating_sub(1)), GRID_LINE_COLOR);
        }
    }
}

impl World for ConwayWorld {
    fn draw(&self, canvas: &mut impl Canvas) {
        canvas.clear(BACKGROUND_COLOR);
        self.draw_cells(canvas);
        self.draw_grid_lines(canvas);
    }

    fn update(&mut self) {
        self.board.advance();
        debug!(
            "generation {}: population {}",
            self.board.generation(),
            self.board.population()
        );
        trace!("\n{}", self.board);
    }
}
