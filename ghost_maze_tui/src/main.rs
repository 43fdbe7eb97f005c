use anyhow::{Context, Result};
use clap::Parser;
use ghost_maze_core::{
    Direction, Position,
    game::{FrameOutcome, Game, GameSnapshot, GameStatus},
    ghost::{GhostColor, GhostState},
    movement::Agent,
    world::{BlockType, Item, World, load_world_from_string},
};
use ratatui::{
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE", default_value = "maps/classic.txt")]
    map: PathBuf,

    /// Seed for the ghosts' random choices
    #[arg(short, long)]
    seed: Option<u64>,

    /// Milliseconds between simulation frames
    #[arg(long, value_name = "MILLIS", default_value_t = 16)]
    frame_ms: u64,

    /// Write tracing output to this file
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct App {
    /// Map text, kept to start a fresh round.
    map_source: String,
    seed: u64,
    game: Game,
    /// Last steering request that the avatar has not taken yet.
    wanted_direction: Option<Direction>,
    should_quit: bool,
}

impl App {
    fn new(map_source: String, seed: u64) -> Result<Self> {
        let world = load_world_from_string(&map_source).context("Failed to load map")?;
        Ok(App {
            map_source,
            seed,
            game: Game::new(world, seed),
            wanted_direction: None,
            should_quit: false,
        })
    }

    /// Handles one step of the simulation.
    fn tick(&mut self, elapsed_millis: u32) {
        let outcome = self.game.step(elapsed_millis, self.wanted_direction);
        if outcome == FrameOutcome::LifeLost {
            self.wanted_direction = None;
        }
        if self.wanted_direction == Some(self.game.avatar().direction()) {
            self.wanted_direction = None;
        }
    }

    fn steer(&mut self, direction: Direction) {
        self.wanted_direction = Some(direction);
    }

    /// Starts a new round once the current one is over.
    fn restart(&mut self) -> Result<()> {
        if self.game.status() == GameStatus::Playing {
            return Ok(());
        }
        let world = load_world_from_string(&self.map_source).context("Failed to reload map")?;
        self.seed = self.seed.wrapping_add(1);
        self.game = Game::new(world, self.seed);
        self.wanted_direction = None;
        info!(seed = self.seed, "new round");
        Ok(())
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        init_logging(log_file)?;
    }

    // Load the map and pick a seed
    let map_source = std::fs::read_to_string(&args.map)
        .with_context(|| format!("Failed to read map file: {}", args.map.display()))?;
    let seed = args.seed.unwrap_or_else(rand::random);

    // Create the application state
    let mut app = App::new(map_source, seed)?;
    info!(map = %args.map.display(), seed, "starting game");

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app, Duration::from_millis(args.frame_ms.max(1)));

    // Restore the terminal state before reporting any error
    restore_terminal(&mut terminal)?;
    result
}

/// Sends tracing output to `path`; the terminal itself belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        // Calculate timeout for event polling
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        // Poll for key presses
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                        KeyCode::Char('r') => app.restart()?,
                        KeyCode::Up | KeyCode::Char('w') => app.steer(Direction::Up),
                        KeyCode::Down | KeyCode::Char('s') => app.steer(Direction::Down),
                        KeyCode::Left | KeyCode::Char('a') => app.steer(Direction::Left),
                        KeyCode::Right | KeyCode::Char('d') => app.steer(Direction::Right),
                        _ => {}
                    }
                }
            }
        }

        // Step the game once a frame has passed
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            let millis = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
            app.tick(millis);
            last_tick = Instant::now();
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let snapshot = app.game.snapshot();
    let [map_area, status_area, help_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .areas(frame.area());

    render_map(frame, map_area, app.game.world(), &snapshot, app.game.coordinator().wobble());
    render_status(frame, status_area, &snapshot, app.seed);

    let help_text = Paragraph::new(
        "Arrows/WASD steer, 'r' starts a new round when it is over, 'q' or 'Esc' quits.",
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, help_area);
}

/// Renders score, lives and the end-of-round banner.
fn render_status(frame: &mut Frame, area: Rect, snapshot: &GameSnapshot, seed: u64) {
    let mut spans = vec![
        Span::styled(
            format!("Score: {}  ", snapshot.score),
            Style::default().bold(),
        ),
        Span::styled(
            format!("Lives: {}  ", "@".repeat(usize::from(snapshot.lives))),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!("Dots left: {}  Seed: {}  ", snapshot.dots_left, seed)),
    ];
    match snapshot.status {
        GameStatus::Playing => {}
        GameStatus::LevelCleared => spans.push(Span::styled(
            "LEVEL CLEARED!",
            Style::default().fg(Color::Yellow).bold(),
        )),
        GameStatus::GameOver => spans.push(Span::styled(
            "GAME OVER",
            Style::default().fg(Color::Red).bold(),
        )),
    }

    let status = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn ghost_style(color: GhostColor, state: GhostState, wobble: bool) -> Style {
    match state {
        GhostState::Dead => Style::default().fg(Color::Gray),
        GhostState::Vulnerable if wobble => Style::default().fg(Color::White).bold(),
        GhostState::Vulnerable => Style::default().fg(Color::Blue).bold(),
        GhostState::Healthy => {
            let fg = match color {
                GhostColor::Red => Color::Red,
                GhostColor::Cyan => Color::Cyan,
                GhostColor::Pink => Color::LightMagenta,
                GhostColor::Orange => Color::Rgb(255, 165, 0),
            };
            Style::default().fg(fg).bold()
        }
    }
}

/// Renders the maze two columns per tile, with agents drawn on their nearest tile.
fn render_map(
    frame: &mut Frame,
    area: Rect,
    world: &World,
    snapshot: &GameSnapshot,
    wobble: bool,
) {
    let avatar_tile = snapshot.avatar.position.nearest_tile();
    let mut lines: Vec<Line> = Vec::with_capacity(world.height());

    for y in 0..world.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(world.width());
        for x in 0..world.width() {
            let position = Position::new(x, y);

            let ghost = snapshot
                .ghosts
                .iter()
                .find(|ghost| ghost.agent.position.nearest_tile() == position);

            if let Some(ghost) = ghost {
                let glyph = if ghost.state == GhostState::Dead { "\"\"" } else { "MM" };
                spans.push(Span::styled(glyph, ghost_style(ghost.color, ghost.state, wobble)));
            } else if position == avatar_tile {
                spans.push(Span::styled("@@", Style::default().fg(Color::Yellow).bold()));
            } else if let Some(Some(item)) = world.items().get(position) {
                let span = match item {
                    Item::Dot => Span::styled(" .", Style::default().fg(Color::White)),
                    Item::PowerPellet if snapshot.pellets_visible => {
                        Span::styled("()", Style::default().fg(Color::White).bold())
                    }
                    Item::PowerPellet => Span::raw("  "),
                };
                spans.push(span);
            } else {
                let span = match world.block_type(position) {
                    Some(BlockType::Block) => {
                        Span::styled("##", Style::default().fg(Color::Blue))
                    }
                    Some(BlockType::PartialBlock) => {
                        Span::styled("--", Style::default().fg(Color::Magenta))
                    }
                    Some(BlockType::NoBlock) | None => Span::raw("  "),
                };
                spans.push(span);
            }
        }
        lines.push(Line::from(spans));
    }

    let title = if snapshot.ghosts_vulnerable {
        "Ghost Maze (ghosts are vulnerable!)"
    } else {
        "Ghost Maze"
    };
    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
