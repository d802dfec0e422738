use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use catalogue::CatalogueStore;
use engine::{Action, Answer, CatalogueData, ConfirmOutcome, EngineConfig, Game, StepOutcome, TerminalOutcome};

/// Guess the film from yes/no/unknown answers.
#[derive(Parser)]
#[command(name = "akinator")]
#[command(about = "An Akinator-style film-guessing game", long_about = None)]
struct Cli {
    /// Path to the SQLite film catalogue.
    #[arg(short, long, default_value = "catalogue.db")]
    catalogue: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game in the terminal.
    Play {
        /// Soft-category contradictions tolerated before elimination.
        #[arg(long, default_value_t = EngineConfig::default().max_strikes)]
        max_strikes: u8,

        /// Consecutive questions a film must lead before the streak rule triggers a guess.
        #[arg(long, default_value_t = EngineConfig::default().top_streak_questions)]
        top_streak_questions: u32,

        /// Questions forced after a rejected guess before guessing can resume.
        #[arg(long, default_value_t = EngineConfig::default().guess_cooldown)]
        guess_cooldown: u32,

        /// Rejected guesses allowed before the escape hatch forces a targeted question.
        #[arg(long, default_value_t = EngineConfig::default().max_consecutive_guesses)]
        max_consecutive_guesses: u32,

        /// Optional cap on how many films are loaded from the catalogue.
        #[arg(long)]
        catalogue_row_limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            max_strikes,
            top_streak_questions,
            guess_cooldown,
            max_consecutive_guesses,
            catalogue_row_limit,
        } => {
            let config = EngineConfig {
                max_strikes,
                top_streak_questions,
                guess_cooldown,
                max_consecutive_guesses,
                catalogue_row_limit,
            };
            play(&cli.catalogue, config)
        }
    }
}

fn play(catalogue_path: &PathBuf, config: EngineConfig) -> Result<()> {
    println!("Loading catalogue from {}...", catalogue_path.display());
    let store = Rc::new(
        CatalogueStore::open(catalogue_path)
            .with_context(|| format!("failed to open catalogue at {}", catalogue_path.display()))?,
    );
    let catalogue = Rc::new(CatalogueData::load(&store, &config).context("failed to load catalogue")?);
    println!("{} Loaded {} films.", "✓".green(), catalogue.films.len());

    let mut game = Game::new(catalogue, store, config);
    let mut outcome = game.start()?;

    loop {
        match outcome {
            StepOutcome::Turn(turn) => match turn.action {
                Action::Question { prompt, .. } => {
                    println!("\n{} {}", format!("Q{}.", turn.question_number).bold(), prompt);
                    let answer = read_answer()?;
                    outcome = game.answer(answer)?;
                }
                Action::Guess { title, .. } => {
                    println!("\n{}", format!("Is it \"{title}\"?").bold().yellow());
                    let correct = read_yes_no()?;
                    match game.confirm(correct)? {
                        ConfirmOutcome::Found { questions_asked, .. } => {
                            println!(
                                "\n{} Got it in {} questions: {}",
                                "✓".green(),
                                questions_asked,
                                title.bold()
                            );
                            return Ok(());
                        }
                        ConfirmOutcome::Continue(next) => outcome = next,
                    }
                }
            },
            StepOutcome::Terminal(terminal) => match terminal.outcome {
                TerminalOutcome::Success => {
                    let title = terminal
                        .film_id
                        .and_then(|id| game.catalogue_title(id))
                        .unwrap_or_else(|| "the film".to_string());
                    println!("\n{} I'm confident it's {}.", "✓".green(), title);
                    return Ok(());
                }
                TerminalOutcome::Failure => {
                    println!("\n{} I couldn't narrow it down to a single film.", "✗".red());
                    return Ok(());
                }
            },
        }
    }
}

fn read_answer() -> Result<Answer> {
    loop {
        print!("[y]es / [n]o / [u]nknown / [py] probably yes / [pn] probably no > ");
        std::io::stdout().flush().ok();
        let line = read_line()?;
        let code = match line.trim().to_lowercase().as_str() {
            "y" | "yes" => "y",
            "n" | "no" => "n",
            "u" | "unknown" | "?" => "?",
            "py" => "py",
            "pn" => "pn",
            _ => {
                println!("Please answer y, n, u, py, or pn.");
                continue;
            }
        };
        if let Some(answer) = Answer::from_code(code) {
            return Ok(answer);
        }
    }
}

fn read_yes_no() -> Result<bool> {
    loop {
        print!("[y]es / [n]o > ");
        std::io::stdout().flush().ok();
        let line = read_line()?;
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| anyhow!("failed to read from stdin: {e}"))?;
    Ok(line)
}
