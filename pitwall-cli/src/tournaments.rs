use clap::Subcommand;
use pitwall_api::id::TournamentId;
use pitwall_api::{sync, Client, Result};
use pitwall_core::{BracketEngine, BracketSize, MatchSlot};

use crate::utils::Prompt;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List your saved tournaments.
    List,
    /// Print a saved tournament's bracket.
    Show { id: TournamentId },
    /// Interactively build, run and save a tournament.
    Create,
    /// Delete a saved tournament.
    Delete { id: TournamentId },
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        match self {
            Self::List => {
                let tournaments = client.tournaments().list().await?;

                println!("ID | Name | Players | Date");
                for tournament in tournaments {
                    let date = tournament
                        .date
                        .map(|date| date.to_string())
                        .unwrap_or_default();

                    println!(
                        "{} | {} | {} | {}",
                        tournament.id, tournament.name, tournament.player_count, date
                    );
                }
            }
            Self::Show { id } => {
                let engine = sync::load(client, id).await?;
                print_engine(&engine);
            }
            Self::Create => {
                let mut engine = build_engine();
                run_bracket(&mut engine);

                let id = sync::save(client, &mut engine).await?;
                println!("Saved tournament {}", id);
            }
            Self::Delete { id } => {
                client.tournaments().delete(id).await?;
                println!("Deleted tournament {}", id);
            }
        }

        Ok(())
    }
}

fn build_engine() -> BracketEngine {
    let name: String = Prompt::new("Name").read_valid();
    let mut engine = BracketEngine::new(&name);

    if let Some(description) = Prompt::<String>::new("Description (optional)").read_optional() {
        engine.set_description(&description);
    }

    let size = loop {
        let count: u16 = Prompt::new("Size (2-32)").read_valid();

        match BracketSize::new(count) {
            Ok(size) => break size,
            Err(err) => println!("{}", err),
        }
    };
    engine.set_size(size);

    println!("Enter player names in seed order, empty line to finish:");
    while let Some(name) = Prompt::<String>::new("Player").read_optional() {
        engine.add_player(&name);
    }

    engine
}

fn run_bracket(engine: &mut BracketEngine) {
    if let Err(err) = engine.generate() {
        println!("{}", err);
        return;
    }

    print_engine(engine);

    println!("Record winners as `round position seed`, empty line to finish:");
    while let Some(input) = Prompt::<String>::new("Winner").read_optional() {
        let fields: Vec<u16> = input
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();

        let (round, position, seed) = match fields[..] {
            [round, position, seed] => (round, position, seed),
            _ => {
                println!("Expected `round position seed`");
                continue;
            }
        };

        let player = match engine.roster().player_by_seed(seed) {
            Some(player) => player.id,
            None => {
                println!("No player with seed {}", seed);
                continue;
            }
        };

        match engine.select_winner(round, position, player) {
            Ok(()) => {
                if let Some(champion) = engine.champion() {
                    println!("Champion: {}", champion.name);
                }
            }
            Err(err) => println!("{}", err),
        }
    }
}

fn print_engine(engine: &BracketEngine) {
    println!("{} ({} players)", engine.name(), engine.size().get());
    if !engine.description().is_empty() {
        println!("{}", engine.description());
    }

    let bracket = match engine.bracket() {
        Some(bracket) => bracket,
        None => {
            println!("No bracket generated");
            return;
        }
    };

    for round in 1..=bracket.total_rounds() {
        println!("Round {}", round);

        for m in bracket.round(round) {
            let winner = m
                .winner
                .and_then(|id| engine.roster().get(id))
                .map(|player| format!(" => {}", player.name))
                .unwrap_or_default();

            println!(
                "  {:>2}. {} vs {}{}",
                m.position,
                slot_name(engine, m.slots[0]),
                slot_name(engine, m.slots[1]),
                winner
            );
        }
    }

    if let Some(champion) = engine.champion() {
        println!("Champion: {}", champion.name);
    }
}

fn slot_name(engine: &BracketEngine, slot: MatchSlot) -> String {
    match slot {
        MatchSlot::Player(id) => match engine.roster().get(id) {
            Some(player) => format!("#{} {}", player.seed, player.name),
            None => "?".to_owned(),
        },
        MatchSlot::Empty => "-".to_owned(),
        MatchSlot::Pending => "TBD".to_owned(),
    }
}
