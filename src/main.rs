use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use crossterm::terminal;
use indoc::indoc;
use portable_pty::CommandBuilder;
use ratatui::layout::Rect;
use tracing::{info, warn};

use term_overlay::app::{App, Config, DEFAULT_DIAGNOSTIC_COMMAND};
use term_overlay::chrome::Chrome;
use term_overlay::constants::POLL_INTERVAL;
use term_overlay::content::event_log::{self, EventLogHandle};
use term_overlay::content::{AssetLoader, default_shell_command};
use term_overlay::drivers::{InputDriver, OutputDriver};
use term_overlay::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_overlay::error::ShellError;
use term_overlay::event_loop::{ControlFlow, EventLoop};
use term_overlay::host::HostView;
use term_overlay::overlay::Viewport;
use term_overlay::prefs::PreferenceStore;
use term_overlay::tracing_sub;

const KEYS_HELP: &str = indoc! {"
    Keys:
      F2        toggle the leaderboard
      F3 / F4   open tool A / tool B (asks for the unlock code)
      F6        close the topmost panel
      F7        cycle the scanline filter (off, on, both)
      F8        cycle the background
      F9        toggle mouse capture (off lets the terminal select text)
      Ctrl+Q    quit
"};

#[derive(Parser, Debug)]
#[command(
    name = "term-overlay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run a program full screen with draggable panels floating above it",
    after_help = KEYS_HELP
)]
struct Cli {
    /// Directory panel documents are read from.
    #[arg(long, value_name = "DIR", default_value = "assets")]
    assets: PathBuf,

    /// JSON file remembering the filter and background choice.
    #[arg(long, value_name = "FILE")]
    prefs: Option<PathBuf>,

    /// Append log output to this file as well as the event log panel.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Code that unlocks the diagnostic panels. Without one they stay locked.
    #[arg(
        long,
        value_name = "CODE",
        env = "TERM_OVERLAY_UNLOCK_CODE",
        hide_env_values = true
    )]
    unlock_code: Option<String>,

    /// Command line run inside the tool A panel.
    #[arg(long, value_name = "COMMAND", default_value = DEFAULT_DIAGNOSTIC_COMMAND)]
    diagnostic_command: String,

    /// Panel to request at startup; may be repeated.
    #[arg(long = "open", value_name = "PANEL")]
    open: Vec<String>,

    /// Host program and its arguments. Defaults to the user's shell.
    #[arg(last = true, value_name = "HOST_COMMAND")]
    host_command: Vec<String>,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            assets: cli.assets.clone(),
            unlock_code: cli.unlock_code.clone(),
            diagnostic_command: cli.diagnostic_command.clone(),
        }
    }
}

fn host_command(words: &[String]) -> CommandBuilder {
    let Some((program, args)) = words.split_first() else {
        return default_shell_command();
    };
    let mut command = CommandBuilder::new(program);
    command.args(args);
    if let Ok(cwd) = std::env::current_dir() {
        command.cwd(cwd);
    }
    command
}

fn load_prefs(path: Option<&PathBuf>) -> PreferenceStore {
    let Some(path) = path else {
        return PreferenceStore::in_memory();
    };
    PreferenceStore::load(path).unwrap_or_else(|err| {
        warn!(%err, "using default preferences");
        PreferenceStore::in_memory()
    })
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = Config::from(&cli);

    let log = EventLogHandle::default();
    event_log::install_global(log.clone());
    event_log::install_panic_hook();
    tracing_sub::init_default(cli.log_file.as_deref())?;

    let (cols, rows) = terminal::size()?;
    let screen = Rect::new(0, 0, cols, rows);
    let host = HostView::spawn(host_command(&cli.host_command), Chrome::host_area(screen))
        .map_err(ShellError::from)?;
    let loader = AssetLoader::new(&config.assets).with_event_log(log);
    let mut app = App::new(
        &config,
        Box::new(loader),
        Some(host),
        load_prefs(cli.prefs.as_ref()),
        Viewport::new(cols, rows),
    )?;
    for id in &cli.open {
        if let Err(err) = app.request_panel(id) {
            warn!(%err, "--open ignored");
        }
    }
    info!(cols, rows, "shell started");

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), POLL_INTERVAL);
    let result = event_loop.run(|input, event| {
        let now = Instant::now();
        match event {
            Some(event) => app.handle_event(&event, now),
            None => {
                if let Some(enabled) = app.take_mouse_capture_change() {
                    input.set_mouse_capture(enabled)?;
                }
                app.tick(now);
                output.draw(|mut frame| app.draw(&mut frame))?;
            }
        }
        Ok(if app.should_quit() {
            ControlFlow::Quit
        } else {
            ControlFlow::Continue
        })
    });
    output.exit()?;
    result
}
