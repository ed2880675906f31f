use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use clap::Parser;
use dealer::{GameOutcome, Session, SessionConfig};
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uno::{visualize_view, CardId, GameView, PlayerId};

#[derive(Parser)]
struct Args {
    /// Path to a JSON session config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// How long the machine thinks per move, overrides the config
    #[arg(long)]
    think_time_ms: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "warn")]
    log_level: LevelFilter,
}

enum Command {
    Play(usize),
    Draw,
    Pass,
    Uno,
    Accuse,
    Next,
    Back,
    Exit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "play" | "p" => Command::Play(words.next()?.parse().ok()?),
            "draw" | "d" => Command::Draw,
            "pass" => Command::Pass,
            "uno" | "u" => Command::Uno,
            "accuse" | "a" => Command::Accuse,
            "next" | "n" => Command::Next,
            "back" | "b" => Command::Back,
            "exit" | "quit" | "q" => Command::Exit,
            _ => return None,
        };
        Some(command)
    }
}

const HELP: &str = "Commands: play <n>, draw, pass, uno, accuse, next, back, exit";

/// The part of the screen state the console owns: which slice of the hand is
/// visible, and the last snapshot it was drawn from.
struct Screen {
    window_start: AtomicUsize,
    window_width: usize,
    last_view: Mutex<Option<GameView>>,
}

impl Screen {
    fn render(&self, view: &GameView) {
        let mut start = self.window_start.load(Ordering::Relaxed);
        // The hand shrank below the window, show its last cards instead.
        if view.human_hand.window(start, self.window_width).is_empty() {
            start = view.human_hand.len().saturating_sub(self.window_width);
            self.window_start.store(start, Ordering::Relaxed);
        }
        println!("\n{}", visualize_view(view, start, self.window_width));
    }

    fn update(&self, view: &GameView) {
        let mut last = self.last_view.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_ref() != Some(view) {
            self.render(view);
            *last = Some(view.clone());
        }
    }

    fn scroll(&self, forward: bool) {
        let last = self.last_view.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(view) = last.as_ref() else {
            return;
        };
        let start = self.window_start.load(Ordering::Relaxed);
        let start = if forward {
            start + self.window_width
        } else {
            start.saturating_sub(self.window_width)
        };
        if !view.human_hand.window(start, self.window_width).is_empty() {
            self.window_start.store(start, Ordering::Relaxed);
        }
        self.render(view);
    }

    fn accepts_input(&self) -> bool {
        let last = self.last_view.lock().unwrap_or_else(PoisonError::into_inner);
        last.as_ref().is_some_and(GameView::accepts_human_input)
    }

    /// Maps a 1-based slot of the visible window to the card shown there and
    /// its position in the hand.
    fn card_in_slot(&self, slot: usize) -> Option<(usize, CardId)> {
        let last = self.last_view.lock().unwrap_or_else(PoisonError::into_inner);
        let view = last.as_ref()?;
        let start = self.window_start.load(Ordering::Relaxed);
        let card = view.human_hand.window(start, self.window_width).get(slot.checked_sub(1)?)?;
        Some((start + slot - 1, card.id))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(think_time_ms) = args.think_time_ms {
        config.think_time_ms = think_time_ms;
    }
    config.validate()?;
    debug!(?config);

    let mut session = Session::new(config)?;
    let screen = Arc::new(Screen {
        window_start: AtomicUsize::new(0),
        window_width: session.config().hand_window,
        last_view: Mutex::new(None),
    });
    {
        let mut bus = session.bus();
        let on_change = screen.clone();
        bus.on_view_changed(move |_, view| on_change.update(view));
        bus.on_game_ended(|outcome, _| match outcome {
            GameOutcome::Won {
                winner: PlayerId::Human,
            } => println!("\nYou won! Type exit to leave."),
            GameOutcome::Won {
                winner: PlayerId::Machine,
            } => println!("\nThe machine won. Type exit to leave."),
            GameOutcome::Aborted => {
                println!("\nThe deck ran out, the game is over. Type exit to leave.")
            }
        });
    }
    println!("{}", HELP);
    session.start()?;

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                println!("{}", HELP);
            }
            continue;
        };
        let engine = session.engine();
        let needs_turn = matches!(command, Command::Play(_) | Command::Draw | Command::Pass);
        if needs_turn && !screen.accepts_input() {
            println!("Wait for your turn");
            continue;
        }
        let result = match command {
            Command::Play(slot) => match screen.card_in_slot(slot) {
                Some((index, card_id)) => engine.play_card(index, card_id).map(drop),
                None => {
                    println!("There is no card {} in view", slot);
                    Ok(())
                }
            },
            Command::Draw => engine.draw_card().map(drop),
            Command::Pass => engine.pass_turn(),
            Command::Uno => {
                if !engine.declare_uno() {
                    println!("You do not hold exactly one card");
                }
                Ok(())
            }
            Command::Accuse => engine.accuse_opponent().map(|penalized| {
                if !penalized {
                    println!("The machine did nothing wrong");
                }
            }),
            Command::Next => {
                screen.scroll(true);
                Ok(())
            }
            Command::Back => {
                screen.scroll(false);
                Ok(())
            }
            Command::Exit => break,
        };
        if let Err(err) = result {
            println!("{}", err);
        }
    }

    info!("Leaving the table");
    session.shutdown();
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
