//! The save/load round trip between a [`BracketEngine`] and the gateway
//! tables.
//!
//! The engine is the source of truth while editing; the persisted rows
//! are a derived snapshot. Saving rebuilds the snapshot wholesale
//! (delete then reinsert, no diffing) and loading rebuilds the whole
//! engine, discarding any unsaved edits. The individual steps are
//! separate requests with no transaction around them: a failure aborts
//! the sequence but already-committed steps stay. Two saves racing on
//! the same tournament are not coordinated against each other.

use std::collections::HashMap;

use pitwall_core::bracket::{Bracket, BracketMatch, BracketSize, MatchSlot};
use pitwall_core::{BracketEngine, PlayerId, Roster};

use crate::id::{PlayerRowId, TournamentId};
use crate::tournaments::{
    MatchRow, NewMatchRow, NewPlayerRow, NewTournament, PlayerRow, Tournament, TournamentPatch,
};
use crate::{Client, Error, Result};

/// Persists the engine state, inserting a new tournament or updating the
/// one the engine is bound to, and binds the engine to the saved row.
///
/// Freshly inserted player rows are re-fetched to learn their gateway
/// ids, then correlated back to the roster by seed, the client-supplied
/// key that is unique and immutable within a tournament. Display names
/// take no part in the correlation, so duplicate names are safe.
///
/// # Errors
///
/// Returns [`Error::Unauthenticated`] if nobody is signed in (checked
/// before any network call), or an [`enum@Error`] if a gateway call
/// fails. Steps committed before the failure are not rolled back.
pub async fn save(client: &Client, engine: &mut BracketEngine) -> Result<TournamentId> {
    let owner = client.owner().ok_or(Error::Unauthenticated)?;
    let tournaments = client.tournaments();

    let id = match engine.remote_id() {
        Some(id) => {
            let id = TournamentId::from(id);

            tournaments
                .update(
                    &id,
                    &TournamentPatch {
                        name: engine.name().to_owned(),
                        description: description_of(engine),
                        player_count: engine.size().get(),
                    },
                )
                .await?;

            id
        }
        None => {
            let row = tournaments
                .insert(&NewTournament {
                    name: engine.name().to_owned(),
                    description: description_of(engine),
                    player_count: engine.size().get(),
                    date: None,
                    user_id: owner,
                })
                .await?;

            row.id
        }
    };

    log::debug!("Saving tournament {} with {} players", id, engine.roster().len());

    let players = tournaments.players(id.clone());
    players.replace(&player_rows(engine, &id)).await?;

    // Re-fetch the rows just inserted: only the gateway knows their ids.
    let inserted = players.list().await?;
    let by_seed: HashMap<u16, PlayerRowId> = inserted
        .into_iter()
        .map(|row| (row.seed, row.id))
        .collect();

    tournaments
        .matches(id.clone())
        .replace(&match_rows(engine, &id, &by_seed))
        .await?;

    engine.bind_remote(id.to_string());

    Ok(id)
}

/// Loads the tournament with the given `id` and rebuilds an engine from
/// it. The returned engine replaces whatever the session held before;
/// there is no dirty-state guard.
///
/// # Errors
///
/// Returns an [`enum@Error`] if a gateway call fails or the loaded rows
/// do not form a valid bracket.
pub async fn load(client: &Client, id: &TournamentId) -> Result<BracketEngine> {
    let tournaments = client.tournaments();

    let tournament = tournaments.get(id).await?;
    let players = tournaments.players(id.clone()).list().await?;
    let matches = tournaments.matches(id.clone()).list().await?;

    restore_engine(tournament, players, matches)
}

fn description_of(engine: &BracketEngine) -> Option<String> {
    let description = engine.description();
    (!description.is_empty()).then(|| description.to_owned())
}

fn player_rows(engine: &BracketEngine, id: &TournamentId) -> Vec<NewPlayerRow> {
    engine
        .roster()
        .iter()
        .map(|player| NewPlayerRow {
            tournament_id: id.clone(),
            name: player.name.clone(),
            seed: player.seed,
        })
        .collect()
}

fn match_rows(
    engine: &BracketEngine,
    id: &TournamentId,
    by_seed: &HashMap<u16, PlayerRowId>,
) -> Vec<NewMatchRow> {
    let bracket = match engine.bracket() {
        Some(bracket) => bracket,
        None => return Vec::new(),
    };

    let resolve = |player: Option<PlayerId>| -> Option<PlayerRowId> {
        player
            .and_then(|id| engine.roster().get(id))
            .and_then(|player| by_seed.get(&player.seed))
            .cloned()
    };

    bracket
        .matches()
        .iter()
        .map(|m| NewMatchRow {
            tournament_id: id.clone(),
            round: m.round,
            position: m.position,
            player1_id: resolve(m.player1()),
            player2_id: resolve(m.player2()),
            winner_id: resolve(m.winner),
        })
        .collect()
}

fn restore_engine(
    tournament: Tournament,
    players: Vec<PlayerRow>,
    matches: Vec<MatchRow>,
) -> Result<BracketEngine> {
    let size = BracketSize::new(tournament.player_count)?;
    let roster = Roster::restore(players.into_iter().map(|row| (row.name, row.seed)));

    let bracket = if matches.is_empty() {
        None
    } else {
        let matches = matches
            .into_iter()
            .map(|row| {
                let slot = |player: &Option<super::PlayerRef>| match player {
                    Some(player) => match roster.player_by_seed(player.seed) {
                        Some(player) => MatchSlot::Player(player.id),
                        None => MatchSlot::Empty,
                    },
                    None if row.round == 1 => MatchSlot::Empty,
                    None => MatchSlot::Pending,
                };

                BracketMatch {
                    round: row.round,
                    position: row.position,
                    slots: [slot(&row.player1), slot(&row.player2)],
                    winner: row
                        .winner
                        .and_then(|player| roster.player_by_seed(player.seed))
                        .map(|player| player.id),
                }
            })
            .collect();

        Some(Bracket::restore(size, matches)?)
    };

    Ok(BracketEngine::restore(
        tournament.name,
        tournament.description.unwrap_or_default(),
        size,
        roster,
        bracket,
        Some(tournament.id.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pitwall_core::{BracketEngine, BracketSize};

    use super::{match_rows, player_rows, restore_engine};
    use crate::id::{MatchRowId, PlayerRowId, TournamentId, UserId};
    use crate::tournaments::{MatchRow, NewMatchRow, PlayerRef, PlayerRow, Tournament};

    fn engine(names: &[&str], size: u16) -> BracketEngine {
        let mut engine = BracketEngine::new("Friday Cup");
        engine.set_size(BracketSize::new(size).unwrap());

        for name in names {
            engine.add_player(name).unwrap();
        }

        engine.generate().unwrap();
        engine
    }

    fn row_ids(engine: &BracketEngine) -> HashMap<u16, PlayerRowId> {
        engine
            .roster()
            .iter()
            .map(|p| (p.seed, PlayerRowId::from(format!("row-{}", p.seed))))
            .collect()
    }

    fn select_by_seed(engine: &mut BracketEngine, round: u16, position: u16, seed: u16) {
        let id = engine.roster().player_by_seed(seed).unwrap().id;
        engine.select_winner(round, position, id).unwrap();
    }

    #[test]
    fn test_match_rows_resolve_by_seed() {
        let mut engine = engine(&["A", "B", "C", "D"], 4);
        select_by_seed(&mut engine, 1, 1, 1);
        select_by_seed(&mut engine, 1, 2, 4);
        select_by_seed(&mut engine, 2, 1, 1);

        let id = TournamentId::from("t1");
        let by_seed = row_ids(&engine);
        let rows = match_rows(&engine, &id, &by_seed);

        assert_eq!(
            rows,
            vec![
                NewMatchRow {
                    tournament_id: id.clone(),
                    round: 1,
                    position: 1,
                    player1_id: Some(by_seed[&1].clone()),
                    player2_id: Some(by_seed[&2].clone()),
                    winner_id: Some(by_seed[&1].clone()),
                },
                NewMatchRow {
                    tournament_id: id.clone(),
                    round: 1,
                    position: 2,
                    player1_id: Some(by_seed[&3].clone()),
                    player2_id: Some(by_seed[&4].clone()),
                    winner_id: Some(by_seed[&4].clone()),
                },
                NewMatchRow {
                    tournament_id: id.clone(),
                    round: 2,
                    position: 1,
                    player1_id: Some(by_seed[&1].clone()),
                    player2_id: Some(by_seed[&4].clone()),
                    winner_id: Some(by_seed[&1].clone()),
                },
            ]
        );
    }

    #[test]
    fn test_round_trip_preserves_duplicate_names() {
        // Two players share a display name; the seed correlation keeps
        // them apart through a save and load.
        let mut engine = engine(&["Alex", "Alex", "C", "D"], 4);
        select_by_seed(&mut engine, 1, 1, 2);

        let id = TournamentId::from("t1");
        let by_seed = row_ids(&engine);

        let players: Vec<PlayerRow> = player_rows(&engine, &id)
            .into_iter()
            .map(|row| PlayerRow {
                id: by_seed[&row.seed].clone(),
                tournament_id: row.tournament_id,
                name: row.name,
                seed: row.seed,
            })
            .collect();

        let reference = |row_id: &Option<PlayerRowId>| -> Option<PlayerRef> {
            let row_id = row_id.as_ref()?;
            let player = players.iter().find(|p| &p.id == row_id)?;

            Some(PlayerRef {
                id: player.id.clone(),
                name: player.name.clone(),
                seed: player.seed,
            })
        };

        let matches: Vec<MatchRow> = match_rows(&engine, &id, &by_seed)
            .into_iter()
            .enumerate()
            .map(|(i, row)| MatchRow {
                id: MatchRowId::from(format!("m{}", i)),
                round: row.round,
                position: row.position,
                player1: reference(&row.player1_id),
                player2: reference(&row.player2_id),
                winner: reference(&row.winner_id),
            })
            .collect();

        let tournament = Tournament {
            id: id.clone(),
            name: engine.name().to_owned(),
            description: None,
            player_count: engine.size().get(),
            date: None,
            user_id: UserId::from("u1"),
            created_at: None,
        };

        let restored = restore_engine(tournament, players, matches).unwrap();

        assert_eq!(restored.remote_id(), Some("t1"));
        assert_eq!(restored.name(), "Friday Cup");

        let names: Vec<(u16, &str)> = restored
            .roster()
            .iter()
            .map(|p| (p.seed, p.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![(1, "Alex"), (2, "Alex"), (3, "C"), (4, "D")]
        );

        // Seed 2 won the opener, and it is that Alex, not seed 1, who
        // advanced.
        let bracket = restored.bracket().unwrap();
        let winner = bracket.get(1, 1).unwrap().winner.unwrap();
        assert_eq!(restored.roster().get(winner).unwrap().seed, 2);
        assert_eq!(bracket.get(2, 1).unwrap().player1(), Some(winner));
    }

    #[test]
    fn test_restore_engine_without_matches() {
        let engine = engine(&["A", "B"], 2);
        let id = TournamentId::from("t2");

        let players: Vec<PlayerRow> = player_rows(&engine, &id)
            .into_iter()
            .map(|row| PlayerRow {
                id: PlayerRowId::from(format!("row-{}", row.seed)),
                tournament_id: row.tournament_id,
                name: row.name,
                seed: row.seed,
            })
            .collect();

        let tournament = Tournament {
            id,
            name: "Unscheduled".to_owned(),
            description: Some("roster only".to_owned()),
            player_count: 2,
            date: None,
            user_id: UserId::from("u1"),
            created_at: None,
        };

        let restored = restore_engine(tournament, players, Vec::new()).unwrap();

        assert!(restored.bracket().is_none());
        assert_eq!(restored.description(), "roster only");
        assert_eq!(restored.roster().len(), 2);
    }
}
