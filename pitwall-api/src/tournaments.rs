pub mod sync;

use crate::id::{MatchRowId, PlayerRowId, TournamentId, UserId};
use crate::{Client, Error, Result};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `tournaments` table. Rows are scoped per authenticated
/// owner through `user_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    pub player_count: u16,
    pub date: Option<NaiveDate>,
    pub user_id: UserId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The insert payload for `tournaments`; the gateway assigns the id.
#[derive(Clone, Debug, Serialize)]
pub struct NewTournament {
    pub name: String,
    pub description: Option<String>,
    pub player_count: u16,
    pub date: Option<NaiveDate>,
    pub user_id: UserId,
}

/// The update payload for an existing tournament row.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentPatch {
    pub name: String,
    pub description: Option<String>,
    pub player_count: u16,
}

/// A row of the `tournament_players` table. `(tournament_id, seed)` is
/// expected to be unique.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: PlayerRowId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub seed: u16,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewPlayerRow {
    pub tournament_id: TournamentId,
    pub name: String,
    pub seed: u16,
}

/// A row of the `tournament_matches` table as returned by [`list`], with
/// the player references resolved through their foreign keys in a single
/// call.
///
/// [`list`]: MatchesClient::list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRow {
    pub id: MatchRowId,
    pub round: u16,
    pub position: u16,
    pub player1: Option<PlayerRef>,
    pub player2: Option<PlayerRef>,
    pub winner: Option<PlayerRef>,
}

/// A resolved player reference embedded in a [`MatchRow`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerRowId,
    pub name: String,
    pub seed: u16,
}

/// The insert payload for `tournament_matches`. `winner_id`, if set,
/// must reference `player1_id` or `player2_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewMatchRow {
    pub tournament_id: TournamentId,
    pub round: u16,
    pub position: u16,
    pub player1_id: Option<PlayerRowId>,
    pub player2_id: Option<PlayerRowId>,
    pub winner_id: Option<PlayerRowId>,
}

pub struct TournamentsClient<'a> {
    client: &'a Client,
}

impl<'a> TournamentsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Returns the signed in owner's tournaments, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] if nobody is signed in, or an
    /// [`enum@Error`] if the request fails.
    pub async fn list(&self) -> Result<Vec<Tournament>> {
        let owner = self.client.owner().ok_or(Error::Unauthenticated)?;

        let req = self
            .client
            .request()
            .uri(&format!(
                "/rest/v1/tournaments?select=*&user_id=eq.{}&order=created_at.desc",
                owner
            ))
            .build();

        self.client.send(req).await?.json().await
    }

    /// Returns the [`Tournament`] with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists, or an
    /// [`enum@Error`] if the request fails.
    pub async fn get(&self, id: &TournamentId) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .uri(&format!("/rest/v1/tournaments?select=*&id=eq.{}", id))
            .build();

        let rows: Vec<Tournament> = self.client.send(req).await?.json().await?;
        rows.into_iter().next().ok_or(Error::NotFound)
    }

    /// Inserts a new tournament row and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn insert(&self, tournament: &NewTournament) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .post()
            .uri("/rest/v1/tournaments")
            .header("Prefer", "return=representation")
            .body(tournament)
            .build();

        let rows: Vec<Tournament> = self.client.send(req).await?.json().await?;
        rows.into_iter().next().ok_or(Error::NotFound)
    }

    /// Updates the tournament row with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn update(&self, id: &TournamentId, patch: &TournamentPatch) -> Result<()> {
        let req = self
            .client
            .request()
            .patch()
            .uri(&format!("/rest/v1/tournaments?id=eq.{}", id))
            .body(patch)
            .build();

        self.client.send(req).await?;
        Ok(())
    }

    /// Deletes the tournament with the given `id` along with its player
    /// and match rows. The child tables go first so no dangling
    /// references survive a partial failure.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a request fails.
    pub async fn delete(&self, id: &TournamentId) -> Result<()> {
        self.matches(id.clone()).delete_all().await?;
        self.players(id.clone()).delete_all().await?;

        let req = self
            .client
            .request()
            .delete()
            .uri(&format!("/rest/v1/tournaments?id=eq.{}", id))
            .build();

        self.client.send(req).await?;
        Ok(())
    }

    pub fn players(&self, tournament_id: TournamentId) -> PlayersClient<'a> {
        PlayersClient {
            client: self.client,
            tournament_id,
        }
    }

    pub fn matches(&self, tournament_id: TournamentId) -> MatchesClient<'a> {
        MatchesClient {
            client: self.client,
            tournament_id,
        }
    }
}

pub struct PlayersClient<'a> {
    client: &'a Client,
    tournament_id: TournamentId,
}

impl<'a> PlayersClient<'a> {
    /// Returns the tournament's player rows ordered by ascending seed.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn list(&self) -> Result<Vec<PlayerRow>> {
        let req = self
            .client
            .request()
            .uri(&format!(
                "/rest/v1/tournament_players?select=*&tournament_id=eq.{}&order=seed.asc",
                self.tournament_id
            ))
            .build();

        self.client.send(req).await?.json().await
    }

    /// Replaces all player rows of the tournament: deletes the existing
    /// rows, then inserts `rows`. The two steps are separate requests
    /// and are not transactional.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a request fails. A failure of the
    /// insert leaves the tournament without player rows.
    pub async fn replace(&self, rows: &[NewPlayerRow]) -> Result<()> {
        self.delete_all().await?;

        if rows.is_empty() {
            return Ok(());
        }

        let req = self
            .client
            .request()
            .post()
            .uri("/rest/v1/tournament_players")
            .body(&rows)
            .build();

        self.client.send(req).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let req = self
            .client
            .request()
            .delete()
            .uri(&format!(
                "/rest/v1/tournament_players?tournament_id=eq.{}",
                self.tournament_id
            ))
            .build();

        self.client.send(req).await?;
        Ok(())
    }
}

pub struct MatchesClient<'a> {
    client: &'a Client,
    tournament_id: TournamentId,
}

impl<'a> MatchesClient<'a> {
    /// Returns the tournament's match rows with all player references
    /// resolved, ordered by round and position.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the request fails.
    pub async fn list(&self) -> Result<Vec<MatchRow>> {
        let select = "id,round,position,\
            player1:player1_id(id,name,seed),\
            player2:player2_id(id,name,seed),\
            winner:winner_id(id,name,seed)";

        let req = self
            .client
            .request()
            .uri(&format!(
                "/rest/v1/tournament_matches?select={}&tournament_id=eq.{}&order=round.asc,position.asc",
                select, self.tournament_id
            ))
            .build();

        self.client.send(req).await?.json().await
    }

    /// Replaces all match rows of the tournament. See
    /// [`PlayersClient::replace`] for the non-transactional caveat.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a request fails.
    pub async fn replace(&self, rows: &[NewMatchRow]) -> Result<()> {
        self.delete_all().await?;

        if rows.is_empty() {
            return Ok(());
        }

        let req = self
            .client
            .request()
            .post()
            .uri("/rest/v1/tournament_matches")
            .body(&rows)
            .build();

        self.client.send(req).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let req = self
            .client
            .request()
            .delete()
            .uri(&format!(
                "/rest/v1/tournament_matches?tournament_id=eq.{}",
                self.tournament_id
            ))
            .build();

        self.client.send(req).await?;
        Ok(())
    }
}
