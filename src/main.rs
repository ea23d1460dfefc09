//! Terminal battle: Player 1 against the rival team. `--memory` plays the
//! memory-matching card game instead.
//!
//! Usage: `pokemon-arena [CONFIG.ron] [--team TEAM.json] [--memory]`
//!
//! Set `RUST_LOG=debug` to trace every battle event on stderr.

use pokemon_arena::errors::{BattleEngineError, MemoryGameError};
use pokemon_arena::memory_game::{shuffle, standard_deck, DEFAULT_PAIR_COUNT, FLIP_BACK_DELAY};
use pokemon_arena::prefab_teams::build_prefab_team;
use pokemon_arena::roster::load_team;
use pokemon_arena::{
    BattleConfig, BattleRunner, BattleSession, CreatureDefinition, DeferredTimer, FlipOutcome, MemoryGame,
    NextInput, Side, TurnRng,
};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: pokemon-arena [CONFIG.ron] [--team TEAM.json] [--memory]";

struct Options {
    config: Option<PathBuf>,
    team: Option<PathBuf>,
    memory: bool,
}

struct Teams {
    a: Vec<CreatureDefinition>,
    b: Vec<CreatureDefinition>,
}

enum Flow {
    Continue,
    Quit,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        config: None,
        team: None,
        memory: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--team" => {
                let path = args.next().ok_or("--team needs a path")?;
                options.team = Some(PathBuf::from(path));
            }
            "--memory" => options.memory = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            path if options.config.is_none() => options.config = Some(PathBuf::from(path)),
            other => return Err(format!("unexpected argument '{}'\n{}", other, USAGE)),
        }
    }
    Ok(options)
}

fn print_help() {
    println!("Commands:");
    println!("  move <n>     - Use move n of the active Pokemon (1-based)");
    println!("  struggle     - Attack with Struggle once every move is out of PP");
    println!("  switch <id>  - Send in the team member with that id");
    println!("  status       - Show both teams and the active moves");
    println!("  reset        - Start the battle over");
    println!("  quit         - Exit");
}

fn print_status(session: Option<&BattleSession>) {
    let Some(session) = session else {
        println!("No battle in progress.");
        return;
    };

    for side in [Side::A, Side::B] {
        println!("{} (turn {}):", side, session.turn_number);
        for (index, creature) in session.team(side).iter().enumerate() {
            let marker = if index == session.active[side.index()] { "*" } else { " " };
            let condition = creature
                .condition
                .map(|kind| format!(" [{}]", kind))
                .unwrap_or_default();
            println!(
                " {} {:<12} {:>3}/{:<3} HP{}  id: {}",
                marker, creature.name, creature.current_hp, creature.max_hp, condition, creature.creature_id
            );
        }
    }

    let active = session.active(session.turn_owner);
    println!("{}'s moves:", active.name);
    for (index, slot) in active.moves.iter().enumerate() {
        println!(
            "  {}. {:<14} {:>2}/{:<2} PP",
            index + 1,
            slot.definition.name,
            slot.current_pp,
            slot.definition.base_pp
        );
    }
}

fn prompt(runner: &BattleRunner) {
    match runner.next_input() {
        NextInput::SelectAction(side) => println!("{} > move <n> | switch <id> | status", side),
        NextInput::SelectReplacement(side) => println!("{} > switch <id>", side),
        NextInput::OpponentThinking(side) => println!("{} is thinking...", side),
        NextInput::BattleOver(_) => println!("Type 'reset' for a rematch or 'quit' to exit."),
        NextInput::NoBattle => println!("No battle. Type 'reset' to start one."),
    }
}

fn handle_command(line: &str, runner: &mut BattleRunner, scheduler: &mut DeferredTimer, teams: &Teams) -> Flow {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Flow::Continue;
    };

    let result = match (command, parts.next()) {
        ("move", Some(slot)) => match slot.parse::<usize>() {
            Ok(number) if number >= 1 => runner.submit_move(number - 1),
            _ => {
                println!("Usage: move <n> (1-based)");
                return Flow::Continue;
            }
        },
        ("struggle", _) => runner.submit_struggle(),
        ("switch", Some(id)) => runner.submit_switch(id),
        ("status", _) => {
            print_status(runner.session());
            return Flow::Continue;
        }
        ("reset", _) => {
            scheduler.cancel();
            runner.reset_session();
            runner.initialize(&teams.a, &teams.b)
        }
        ("quit" | "exit", _) => return Flow::Quit,
        ("help", _) => {
            print_help();
            return Flow::Continue;
        }
        _ => {
            println!("Unknown command: {}. Type help for commands.", line);
            return Flow::Continue;
        }
    };

    match result {
        // Already printed from the battle log.
        Err(BattleEngineError::Action(_)) if runner.session().is_some() => {}
        Err(error) => println!("Error: {}", error),
        Ok(()) => {}
    }
    Flow::Continue
}

fn schedule_ai(runner: &BattleRunner, scheduler: &mut DeferredTimer, delay: Duration) {
    if matches!(runner.next_input(), NextInput::OpponentThinking(_)) && !scheduler.is_pending() {
        scheduler.schedule(delay, runner.generation());
    }
}

fn print_memory_help() {
    println!("Commands:");
    println!("  flip <n>  - Turn over card n (1-based)");
    println!("  board     - Show the cards");
    println!("  new       - Deal a new game");
    println!("  quit      - Exit");
}

fn print_board(game: &MemoryGame) {
    for (index, card) in game.cards().iter().enumerate() {
        let face = if card.is_flipped {
            format!("{} of {}", card.face.value, card.face.suit)
        } else {
            "??".to_string()
        };
        let marker = if card.is_matched { "*" } else { " " };
        print!("{:>3}.{}{:<17}", index + 1, marker, face);
        if index % 4 == 3 {
            println!();
        }
    }
    println!("Moves: {}  Time: {}s", game.moves(), game.elapsed().as_secs());
}

fn deal_memory(game: &mut MemoryGame, rng: &mut TurnRng) -> Result<(), MemoryGameError> {
    let mut deck = standard_deck();
    shuffle(&mut deck, rng);
    game.deal(&deck, rng)
}

fn flip_card(argument: Option<&str>, game: &mut MemoryGame, timer: &mut DeferredTimer) {
    let Some(number) = argument.and_then(|arg| arg.parse::<usize>().ok()).filter(|&n| n >= 1) else {
        println!("Usage: flip <n> (1-based)");
        return;
    };
    match game.flip(number - 1) {
        Ok(outcome) => {
            print_board(game);
            match outcome {
                FlipOutcome::FirstCard => {}
                FlipOutcome::Matched => println!("Match!"),
                FlipOutcome::Mismatched => {
                    println!("No match.");
                    timer.schedule(FLIP_BACK_DELAY, game.generation());
                }
                FlipOutcome::Won => {
                    if let Some(message) = game.win_message() {
                        println!("{}", message);
                    }
                }
            }
        }
        Err(error) => println!("Error: {}", error),
    }
}

async fn run_memory(seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let mut rng = seed.map(TurnRng::from_seed).unwrap_or_else(TurnRng::new_random);
    let mut game = MemoryGame::new(DEFAULT_PAIR_COUNT);
    let mut timer = DeferredTimer::new();

    println!("Memory Match");
    println!("============");
    print_memory_help();
    println!();
    deal_memory(&mut game, &mut rng)?;
    print_board(&game);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let mut parts = line.split_whitespace();
                match parts.next() {
                    None => {}
                    Some("flip") => flip_card(parts.next(), &mut game, &mut timer),
                    Some("board") => print_board(&game),
                    Some("new") => {
                        timer.cancel();
                        deal_memory(&mut game, &mut rng)?;
                        print_board(&game);
                    }
                    Some("quit" | "exit") => break,
                    Some("help") => print_memory_help(),
                    Some(other) => println!("Unknown command: {}. Type help for commands.", other),
                }
            }
            Some(generation) = timer.fired() => {
                if generation != game.generation() {
                    tracing::debug!(generation, current = game.generation(), "discarding stale flip-back");
                    continue;
                }
                if game.resolve_mismatch() {
                    print_board(&game);
                }
            }
        }
    }

    timer.cancel();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            return Ok(());
        }
    };

    let config = match &options.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if options.memory {
        return run_memory(config.seed).await;
    }

    let delay = Duration::from_millis(config.ai_delay_ms);
    let teams = Teams {
        a: match &options.team {
            Some(path) => load_team(path)?,
            None => build_prefab_team("starters")?,
        },
        b: build_prefab_team("rivals")?,
    };

    println!("Pokemon Arena");
    println!("=============");
    print_help();
    println!();

    let mut runner = BattleRunner::new(config).with_deferred_ai();
    let mut shown = 0;
    runner.on_state_changed(move |session| match session {
        Some(session) => {
            if session.log.len() < shown {
                shown = 0;
            }
            for line in &session.log[shown..] {
                println!("{}", line);
            }
            shown = session.log.len();
        }
        None => shown = 0,
    });

    let mut scheduler = DeferredTimer::new();
    runner.initialize(&teams.a, &teams.b)?;
    schedule_ai(&runner, &mut scheduler, delay);
    prompt(&runner);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if let Flow::Quit = handle_command(line.trim(), &mut runner, &mut scheduler, &teams) {
                    break;
                }
            }
            Some(generation) = scheduler.fired() => {
                if generation != runner.generation() {
                    tracing::debug!(generation, current = runner.generation(), "discarding stale ai turn");
                    continue;
                }
                if let Err(error) = runner.step_ai() {
                    println!("Error: {}", error);
                }
            }
        }
        schedule_ai(&runner, &mut scheduler, delay);
        prompt(&runner);
    }

    scheduler.cancel();
    Ok(())
}
