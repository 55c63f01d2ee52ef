use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
};
use webbrowser::Browser;

use trails::{
    app::{App, Control},
    bridge::{EventSink, JsonLinesSink},
    config::{ConfigStore, FileConfigStore, Layered, Preset, QueryParams},
    generator::{random_custom_positions, GeneratorForm, DEFAULT_BASE_URL},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TrailEvent},
    settings::TrailSettings,
    trail::SymbolType,
};

/// trail making test in the terminal
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Trail making test in the terminal. Click the targets in order with the mouse. \
                  Configured with the same query parameters as the web exercise."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run the test (default)
    Run(RunArgs),
    /// build a configured exercise URL
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// query string or full exercise URL, e.g. "trailLength=12&symbolType=letters"
    #[clap(short = 'q', long)]
    query: Option<String>,

    /// ignore the saved preset
    #[clap(long)]
    no_preset: bool,

    /// append bridge messages as JSON lines to this file
    #[clap(short = 'b', long)]
    bridge: Option<std::path::PathBuf>,

    /// seed for target placement
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum SymbolArg {
    Numbers,
    Letters,
    NumbersLetters,
    LettersNumbers,
}

impl From<SymbolArg> for SymbolType {
    fn from(arg: SymbolArg) -> Self {
        match arg {
            SymbolArg::Numbers => SymbolType::Numbers,
            SymbolArg::Letters => SymbolType::Letters,
            SymbolArg::NumbersLetters => SymbolType::NumbersLetters,
            SymbolArg::LettersNumbers => SymbolType::LettersNumbers,
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// number of targets
    #[clap(short = 'n', long, default_value_t = 10)]
    trail_length: u32,

    /// target radius in pixels
    #[clap(short = 'r', long, default_value_t = 30)]
    number_radius: u32,

    /// symbols used for targets
    #[clap(short = 's', long, value_enum, default_value_t = SymbolArg::Numbers)]
    symbol_type: SymbolArg,

    /// count down instead of up
    #[clap(long)]
    reverse_order: bool,

    /// hide the running timer
    #[clap(long)]
    hide_timer: bool,

    /// draw connecting lines over the targets
    #[clap(long)]
    lines_over_dots: bool,

    /// let a wrong target consume a turn
    #[clap(long)]
    allow_wrong_selections: bool,

    /// do not highlight wrong selections
    #[clap(long)]
    hide_wrong_selections: bool,

    /// hide the result dialog buttons
    #[clap(long)]
    hide_popup_buttons: bool,

    /// hide time and errors in the result dialog
    #[clap(long)]
    hide_popup_results: bool,

    /// suppress the result dialog entirely
    #[clap(long)]
    hide_popup_all: bool,

    /// custom positions as a JSON array of {"x","y"} percentages
    #[clap(short = 'c', long, conflicts_with = "random_positions")]
    custom_positions: Option<String>,

    /// generate random custom positions for every target
    #[clap(long)]
    random_positions: bool,

    /// exercise page the query is appended to
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// save the generated parameters as the preset for `run`
    #[clap(long)]
    save_preset: bool,

    /// open the generated URL in a browser
    #[clap(long)]
    open: bool,
}

impl GenerateArgs {
    fn to_form(&self) -> Result<GeneratorForm, serde_json::Error> {
        let custom_positions = if self.random_positions {
            let mut rng = StdRng::from_entropy();
            let positions = random_custom_positions(self.trail_length as usize, &mut rng);
            Some(serde_json::to_string_pretty(&positions)?)
        } else {
            self.custom_positions.clone()
        };

        Ok(GeneratorForm {
            trail_length: self.trail_length,
            number_radius: self.number_radius,
            symbol_type: self.symbol_type.into(),
            reverse_order: self.reverse_order,
            show_timer: !self.hide_timer,
            lines_under_dots: !self.lines_over_dots,
            allow_wrong_selections: self.allow_wrong_selections,
            show_wrong_selections: !self.hide_wrong_selections,
            hide_popup_buttons: self.hide_popup_buttons,
            hide_popup_results: self.hide_popup_results,
            hide_popup_all: self.hide_popup_all,
            custom_positions,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Generate(args) => generate(args),
        Command::Run(args) => run(args),
    }
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    logging::init_stderr_logging();

    let form = args.to_form()?;
    let url = form.to_url(&args.base_url);
    println!("{url}");

    if args.save_preset {
        let store = FileConfigStore::new();
        store.save(&Preset::from_query(&QueryParams::parse(&form.to_query())))?;
        eprintln!("preset saved to {}", store.path().display());
    }

    if args.open && Browser::is_available() {
        webbrowser::open(&url)?;
    }

    Ok(())
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init_file_logging();

    let query = QueryParams::parse(args.query.as_deref().unwrap_or_default());
    let preset = if args.no_preset {
        Preset::default()
    } else {
        FileConfigStore::new().load()
    };
    let settings = TrailSettings::from_provider(&Layered::new(&query, &preset));
    tracing::info!(?settings, "starting trail making test");

    let sink: Option<Box<dyn EventSink>> = match &args.bridge {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(Box::new(JsonLinesSink::new(file)))
        }
        None => None,
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let area = terminal_area(&terminal)?;
    let mut app = App::new(settings, area, args.seed, sink);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn terminal_area<B: Backend>(terminal: &Terminal<B>) -> io::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        if let TrailEvent::Resize = event {
            app.set_area(terminal_area(terminal)?);
        }

        let redraw = match &event {
            TrailEvent::Tick => app.test.has_started() && !app.test.has_finished(),
            _ => true,
        };

        if app.handle(event) == Control::Quit {
            break;
        }

        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
