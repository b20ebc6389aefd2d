//! Mill engine command line: engine self-play, position analysis and perft.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mill_engine::config::{
    AppConfig, COMPUTERS, ConfigChain, ConfigValue, DefaultsProvider, JsonFileProvider, KEY_RULES,
    KEY_SEED, MapProvider,
};
use mill_engine::core::{HashSeeds, Move};
use mill_engine::engine::search::format_score;
use mill_engine::engine::{ExperienceStore, SearchController, Searcher, TranspositionTable};
use mill_engine::game::{GameControl, PlayerAgent};
use mill_engine::rules::{GameResult, RuleOracle, RuleSet, perft};

#[derive(Parser, Debug)]
#[command(name = "mill_engine", version, about = "Search engine for mill games")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Settings {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override a setting, e.g. `--set ai/computerA/max_depth=6`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Rule preset (standard, lasker, morabaraba, nine-holes, ...)
    #[arg(long)]
    rules: Option<String>,

    /// Maximum search depth for both engines
    #[arg(long)]
    depth: Option<u32>,

    /// Thinking time per move in milliseconds for both engines
    #[arg(long)]
    time_ms: Option<u64>,

    /// Seed for reproducible root move order
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let two engines play against each other
    Selfplay {
        #[command(flatten)]
        settings: Settings,

        #[arg(long, default_value = "1")]
        games: u32,

        /// Give up a game after this many plies
        #[arg(long, default_value = "400")]
        max_plies: usize,

        /// Experience file loaded before and saved after the games
        #[arg(long)]
        experience: Option<PathBuf>,
    },
    /// Search a position given as a sequence of moves from the start
    Analyze {
        #[command(flatten)]
        settings: Settings,

        /// Moves in board notation, e.g. `a1 d2 a1-a4xb2`
        moves: Vec<String>,
    },
    /// Count leaf nodes of the move tree
    Perft {
        #[arg(long, default_value = "standard")]
        rules: String,

        #[arg(long, default_value = "3")]
        depth: u32,
    },
}

impl Settings {
    fn resolve(&self) -> Result<AppConfig> {
        let mut chain = ConfigChain::new();

        let mut flags = MapProvider::from_assignments("command line", &self.overrides)?;
        if let Some(rules) = &self.rules {
            flags.set(KEY_RULES, ConfigValue::Text(rules.clone()));
        }
        for computer in COMPUTERS {
            if let Some(depth) = self.depth {
                flags.set(
                    format!("ai/{computer}/max_depth"),
                    ConfigValue::Int(depth as i64),
                );
            }
            if let Some(time_ms) = self.time_ms {
                flags.set(
                    format!("ai/{computer}/max_time"),
                    ConfigValue::Int(time_ms as i64),
                );
            }
        }
        if let Some(seed) = self.seed {
            flags.set(KEY_SEED, ConfigValue::Int(seed as i64));
        }
        chain.push(flags);

        if let Some(path) = &self.config {
            chain.push(JsonFileProvider::load(path)?);
        }
        chain.push(DefaultsProvider);

        let config = AppConfig::resolve(&chain)?;
        log::debug!("configuration: {:?}", config);
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Selfplay {
            settings,
            games,
            max_plies,
            experience,
        } => selfplay(&settings.resolve()?, games, max_plies, experience),
        Command::Analyze { settings, moves } => analyze(&settings.resolve()?, &moves),
        Command::Perft { rules, depth } => run_perft(&rules, depth),
    }
}

fn selfplay(
    config: &AppConfig,
    games: u32,
    max_plies: usize,
    experience_path: Option<PathBuf>,
) -> Result<()> {
    let rules: Arc<dyn RuleOracle> = Arc::new(RuleSet::preset(config.rules));
    let seeds = Arc::new(HashSeeds::default());

    let store = match &experience_path {
        Some(path) if path.exists() => ExperienceStore::load_json(path)
            .with_context(|| format!("loading experience from {}", path.display()))?,
        _ => ExperienceStore::new(),
    };
    log::info!("experience holds {} positions", store.len());
    let experience = Arc::new(parking_lot::RwLock::new(store));

    let (tx, rx) = unbounded();
    let shared = TranspositionTable::shared(config.table_bits);
    let table = |i: usize| {
        if config.share_tables || i == 0 {
            shared.clone()
        } else {
            TranspositionTable::shared(config.table_bits)
        }
    };
    let engine = |i: usize| {
        let controller = SearchController::new(
            COMPUTERS[i],
            rules.clone(),
            table(i),
            config.computers[i].clone(),
            tx.clone(),
        )
        .with_experience(experience.clone());
        PlayerAgent::AlphaBeta(Box::new(controller))
    };

    let mut game = GameControl::new(rules.clone(), seeds, engine(0), engine(1), rx);
    let mut score = [0u32; 3];
    for n in 1..=games {
        if n > 1 {
            game.reset();
        }
        let started = Instant::now();
        let result = game.play_to_end(max_plies)?;
        let plies = game.history().ply();
        match result {
            Some(GameResult::Winner(p)) => {
                score[p.index()] += 1;
                println!("game {n}: {p} wins after {plies} plies");
            }
            Some(GameResult::Tie) => {
                score[2] += 1;
                println!("game {n}: tie after {plies} plies");
            }
            None => {
                score[2] += 1;
                println!("game {n}: undecided after {plies} plies");
            }
        }
        log::debug!("game {} took {:?}", n, started.elapsed());
    }
    println!("white {} black {} drawn {}", score[0], score[1], score[2]);

    if let Some(path) = &experience_path {
        experience
            .read()
            .save_json(path)
            .with_context(|| format!("saving experience to {}", path.display()))?;
        log::info!("saved {} positions to {}", experience.read().len(), path.display());
    }
    Ok(())
}

fn analyze(config: &AppConfig, moves: &[String]) -> Result<()> {
    let rules: Arc<dyn RuleOracle> = Arc::new(RuleSet::preset(config.rules));
    let topology = rules.topology();
    let mut board = rules.start_board(Arc::new(HashSeeds::default()));

    let mut legal = Vec::new();
    for text in moves {
        let mv = Move::parse(text, topology)?;
        legal.clear();
        rules.generate_moves(&board, &mut legal);
        if !legal.contains(&mv) {
            bail!("illegal move `{}` at {}", text, board);
        }
        board.apply_move(&mv);
    }
    println!("{board}");

    if let Some(result) = rules.outcome(&board) {
        println!("game over: {result:?}");
        return Ok(());
    }

    let tt = TranspositionTable::shared(config.table_bits);
    let mut searcher = Searcher::new(rules.clone(), tt, config.computers[0].clone());
    let Some(result) = searcher.search(&board) else {
        bail!("no move found");
    };

    let line: Vec<String> = result
        .variation
        .iter()
        .map(|mv| mv.notation(topology))
        .collect();
    println!("bestmove {}", result.best_move.notation(topology));
    println!("score {}", format_score(result.value, board.current_player()));
    println!("depth {} nodes {}", result.depth, result.stats.total_nodes);
    println!("pv {}", line.join(" "));
    Ok(())
}

fn run_perft(preset: &str, depth: u32) -> Result<()> {
    let rules = RuleSet::preset(preset.parse()?);
    let mut board = rules.start_board(Arc::new(HashSeeds::default()));

    for d in 1..=depth {
        let started = Instant::now();
        let nodes = perft(&rules, &mut board, d);
        let elapsed = started.elapsed().max(Duration::from_micros(1));
        println!(
            "perft {} = {} ({:.0} nps)",
            d,
            nodes,
            nodes as f64 / elapsed.as_secs_f64()
        );
    }
    Ok(())
}
