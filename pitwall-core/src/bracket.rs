use crate::roster::{Player, PlayerId, Roster};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The configured number of entrant slots for a tournament.
///
/// Any value in `2..=32` is accepted. Sizes that are not a power of two
/// are rounded up to the next power of two at generation time and the
/// surplus slots stay empty, so the round count is always integral.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BracketSize(u16);

impl BracketSize {
    /// The preset sizes offered by the bracket builder.
    pub const SUPPORTED: [u16; 5] = [2, 4, 8, 16, 32];

    /// Creates a new `BracketSize`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSize`] if `count` is outside `2..=32`.
    pub fn new(count: u16) -> Result<Self> {
        if (2..=32).contains(&count) {
            Ok(Self(count))
        } else {
            Err(Error::InvalidSize(count))
        }
    }

    /// The configured player count.
    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }

    /// The number of entrant slots actually laid out, `count` rounded up
    /// to a power of two.
    #[inline]
    pub fn slots(self) -> u16 {
        self.0.next_power_of_two()
    }

    /// The number of rounds in the bracket, `log2(slots)`.
    #[inline]
    pub fn total_rounds(self) -> u16 {
        self.slots().trailing_zeros() as u16
    }

    /// The total number of matches in the bracket, `slots - 1`.
    #[inline]
    pub fn total_matches(self) -> u16 {
        self.slots() - 1
    }
}

impl Default for BracketSize {
    #[inline]
    fn default() -> Self {
        Self(8)
    }
}

/// A spot for a player in a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchSlot {
    /// The spot is taken.
    Player(PlayerId),
    /// The spot is permanently vacant (a bye in a partial bracket).
    Empty,
    /// The spot is waiting for a winner from the previous round.
    Pending,
}

impl MatchSlot {
    /// Returns the occupying player, if any.
    #[inline]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` if the spot is taken.
    #[inline]
    pub fn is_player(self) -> bool {
        matches!(self, Self::Player(_))
    }
}

/// A single match, addressed by its `(round, position)` pair. Both are
/// 1-based; round 1 is the first set of matches.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BracketMatch {
    pub round: u16,
    pub position: u16,
    pub slots: [MatchSlot; 2],
    pub winner: Option<PlayerId>,
}

impl BracketMatch {
    fn new(round: u16, position: u16, vacant: MatchSlot) -> Self {
        Self {
            round,
            position,
            slots: [vacant, vacant],
            winner: None,
        }
    }

    #[inline]
    pub fn player1(&self) -> Option<PlayerId> {
        self.slots[0].player()
    }

    #[inline]
    pub fn player2(&self) -> Option<PlayerId> {
        self.slots[1].player()
    }

    /// Returns `true` if `player` occupies one of the two spots.
    #[inline]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.slots.iter().any(|s| s.player() == Some(player))
    }

    #[inline]
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}

/// A generated single elimination match tree.
///
/// Matches are stored round-major: all of round 1 ordered by position,
/// then round 2, and so on up to the final. Pairs of matches
/// `(2k - 1, 2k)` in round `r` feed match `k` in round `r + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bracket {
    size: BracketSize,
    matches: Vec<BracketMatch>,
}

impl Bracket {
    /// Generates a fresh bracket for `size`, seeding the first round from
    /// `roster` in ascending seed order: match 1 holds seeds 1 and 2,
    /// match 2 holds seeds 3 and 4, and so on (straight seeding). Slots
    /// beyond the roster are left empty.
    pub fn generate(size: BracketSize, roster: &Roster) -> Self {
        let slots = size.slots();
        let total_rounds = size.total_rounds();

        log::debug!(
            "Generating bracket with {} slots over {} rounds",
            slots,
            total_rounds
        );

        let mut matches = Vec::with_capacity(size.total_matches() as usize);
        for round in 1..=total_rounds {
            let in_round = slots >> round;
            let vacant = if round == 1 {
                MatchSlot::Empty
            } else {
                MatchSlot::Pending
            };

            for position in 1..=in_round {
                matches.push(BracketMatch::new(round, position, vacant));
            }
        }

        // Truncate to the configured count, not the padded slot count:
        // the rounding surplus always stays vacant.
        let seeded = roster.seeded();
        for (index, player) in seeded.iter().take(size.get() as usize).enumerate() {
            matches[index / 2].slots[index % 2] = MatchSlot::Player(player.id);
        }

        Self { size, matches }
    }

    /// Rebuilds a bracket from previously generated matches, e.g. rows
    /// loaded from the persistence gateway.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the number of matches does not fit
    /// `size` or a `(round, position)` pair falls outside the layout.
    pub fn restore(size: BracketSize, mut matches: Vec<BracketMatch>) -> Result<Self> {
        let expected = size.total_matches() as usize;
        let found = matches.len();

        if found != expected {
            return Err(Error::InvalidNumberOfMatches { expected, found });
        }

        matches.sort_by_key(|m| (m.round, m.position));

        let slots = size.slots();
        let mut index = 0;
        for round in 1..=size.total_rounds() {
            for position in 1..=(slots >> round) {
                let m = &matches[index];
                if (m.round, m.position) != (round, position) {
                    return Err(Error::UnknownMatch {
                        round: m.round,
                        position: m.position,
                    });
                }
                index += 1;
            }
        }

        Ok(Self { size, matches })
    }

    #[inline]
    pub fn size(&self) -> BracketSize {
        self.size
    }

    #[inline]
    pub fn total_rounds(&self) -> u16 {
        self.size.total_rounds()
    }

    /// All matches in round-major order.
    #[inline]
    pub fn matches(&self) -> &[BracketMatch] {
        &self.matches
    }

    /// The matches of a single round, ordered by position.
    pub fn round(&self, round: u16) -> &[BracketMatch] {
        match self.round_range(round) {
            Some((start, end)) => &self.matches[start..end],
            None => &[],
        }
    }

    /// Returns the match at `(round, position)`.
    pub fn get(&self, round: u16, position: u16) -> Option<&BracketMatch> {
        self.index_of(round, position).map(|i| &self.matches[i])
    }

    fn get_mut(&mut self, round: u16, position: u16) -> Option<&mut BracketMatch> {
        self.index_of(round, position).map(|i| &mut self.matches[i])
    }

    /// Records `player` as the winner of the match at `(round, position)`
    /// and advances it into the next round: winners of round `r` match
    /// `k` take spot 1 of round `r + 1` match `ceil(k / 2)` when `k` is
    /// odd, spot 2 when `k` is even. The final round has no successor.
    ///
    /// Re-selecting a different winner overwrites the advanced spot, and
    /// every downstream result that depended on the old winner is reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMatch`] if no match exists at the address
    /// and [`Error::InvalidWinner`] if `player` is not one of the two
    /// entrants of the match.
    pub fn select_winner(&mut self, round: u16, position: u16, player: PlayerId) -> Result<()> {
        let total_rounds = self.total_rounds();

        let m = self
            .get_mut(round, position)
            .ok_or(Error::UnknownMatch { round, position })?;

        if !m.contains(player) {
            return Err(Error::InvalidWinner {
                player,
                round,
                position,
            });
        }

        m.winner = Some(player);

        if round >= total_rounds {
            log::debug!("Match ({}, {}) is the final, not advancing", round, position);
            return Ok(());
        }

        let mut round = round;
        let mut position = position;
        let mut occupant = MatchSlot::Player(player);

        loop {
            let spot = if position % 2 == 1 { 0 } else { 1 };
            round += 1;
            position = (position + 1) / 2;

            let next = match self.get_mut(round, position) {
                Some(next) => next,
                None => break,
            };

            next.slots[spot] = occupant;

            // A decided match whose winner no longer appears in it holds a
            // stale result: clear it and keep resetting the spots it fed.
            let stale = matches!(next.winner, Some(w) if !next.contains(w));
            if !stale {
                break;
            }

            log::debug!("Resetting stale result of match ({}, {})", round, position);
            next.winner = None;

            if round >= total_rounds {
                break;
            }

            occupant = MatchSlot::Pending;
        }

        Ok(())
    }

    /// The winner of the final, once decided.
    pub fn champion(&self) -> Option<PlayerId> {
        self.get(self.total_rounds(), 1).and_then(|m| m.winner)
    }

    fn round_range(&self, round: u16) -> Option<(usize, usize)> {
        if round == 0 || round > self.total_rounds() {
            return None;
        }

        let slots = self.size.slots();
        let mut start = 0;
        for r in 1..round {
            start += (slots >> r) as usize;
        }

        Some((start, start + (slots >> round) as usize))
    }

    fn index_of(&self, round: u16, position: u16) -> Option<usize> {
        let (start, end) = self.round_range(round)?;
        let index = start + position.checked_sub(1)? as usize;

        (index < end).then_some(index)
    }
}

/// The per-session aggregate: roster, bracket and tournament metadata.
///
/// One `BracketEngine` is constructed per editing session and passed by
/// reference to whatever drives it; there is no ambient singleton. The
/// engine is the source of truth while editing, and the persisted rows
/// are a derived snapshot rebuilt on every save.
#[derive(Clone, Debug)]
pub struct BracketEngine {
    name: String,
    description: String,
    size: BracketSize,
    roster: Roster,
    bracket: Option<Bracket>,
    remote_id: Option<String>,
}

impl BracketEngine {
    /// Creates a new engine with an empty roster and no bracket.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: String::new(),
            size: BracketSize::default(),
            roster: Roster::new(),
            bracket: None,
            remote_id: None,
        }
    }

    /// Rebuilds an engine from loaded state, replacing everything the
    /// session held before.
    pub fn restore(
        name: String,
        description: String,
        size: BracketSize,
        roster: Roster,
        bracket: Option<Bracket>,
        remote_id: Option<String>,
    ) -> Self {
        Self {
            name,
            description,
            size,
            roster,
            bracket,
            remote_id,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
    }

    #[inline]
    pub fn size(&self) -> BracketSize {
        self.size
    }

    /// Sets the target size for the next generation. The current bracket,
    /// if any, keeps its old layout until [`generate`] is called again.
    ///
    /// [`generate`]: Self::generate
    pub fn set_size(&mut self, size: BracketSize) {
        self.size = size;
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// See [`Roster::add`].
    pub fn add_player(&mut self, name: &str) -> Option<PlayerId> {
        self.roster.add(name)
    }

    /// See [`Roster::remove`].
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.roster.remove(id)
    }

    /// See [`Roster::rename`].
    pub fn rename_player(&mut self, id: PlayerId, name: &str) -> bool {
        self.roster.rename(id, name)
    }

    /// Generates a fresh bracket from the roster, replacing the previous
    /// one wholesale. The engine also drops its association with any
    /// persisted tournament: a regenerated bracket is unsaved until it is
    /// explicitly saved again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughPlayers`] if fewer than 2 players are on
    /// the roster.
    pub fn generate(&mut self) -> Result<()> {
        if self.roster.len() < 2 {
            return Err(Error::NotEnoughPlayers(self.roster.len()));
        }

        self.bracket = Some(Bracket::generate(self.size, &self.roster));
        self.remote_id = None;

        Ok(())
    }

    #[inline]
    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    /// See [`Bracket::select_winner`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoBracket`] if no bracket has been generated.
    pub fn select_winner(&mut self, round: u16, position: u16, player: PlayerId) -> Result<()> {
        match self.bracket.as_mut() {
            Some(bracket) => bracket.select_winner(round, position, player),
            None => Err(Error::NoBracket),
        }
    }

    /// The tournament champion, once the final is decided.
    pub fn champion(&self) -> Option<&Player> {
        self.bracket
            .as_ref()
            .and_then(Bracket::champion)
            .and_then(|id| self.roster.get(id))
    }

    /// The id of the persisted tournament this engine was saved to or
    /// loaded from, if any.
    #[inline]
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    /// Associates the engine with a persisted tournament row.
    pub fn bind_remote(&mut self, id: String) {
        self.remote_id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::{Bracket, BracketEngine, BracketSize, MatchSlot};
    use crate::roster::{PlayerId, Roster};
    use crate::Error;

    fn roster(names: &[&str]) -> Roster {
        let mut roster = Roster::new();
        for name in names {
            roster.add(name).unwrap();
        }
        roster
    }

    fn seed(roster: &Roster, seed: u16) -> PlayerId {
        roster.player_by_seed(seed).unwrap().id
    }

    #[test]
    fn test_size_validation() {
        assert_eq!(BracketSize::new(1), Err(Error::InvalidSize(1)));
        assert_eq!(BracketSize::new(33), Err(Error::InvalidSize(33)));

        for count in BracketSize::SUPPORTED {
            assert_eq!(BracketSize::new(count).unwrap().slots(), count);
        }

        // Custom sizes round up to the next power of two.
        let size = BracketSize::new(6).unwrap();
        assert_eq!(size.get(), 6);
        assert_eq!(size.slots(), 8);
        assert_eq!(size.total_rounds(), 3);
    }

    #[test]
    fn test_generate_match_and_round_counts() {
        for count in BracketSize::SUPPORTED {
            let names: Vec<String> = (1..=count).map(|i| format!("P{}", i)).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let bracket =
                Bracket::generate(BracketSize::new(count).unwrap(), &roster(&names));

            assert_eq!(bracket.matches().len(), count as usize - 1);
            assert_eq!(bracket.total_rounds() as u32, (count as u32).ilog2());

            for round in 1..=bracket.total_rounds() {
                let matches = bracket.round(round);
                assert_eq!(matches.len(), (count >> round) as usize);

                for (i, m) in matches.iter().enumerate() {
                    assert_eq!(m.round, round);
                    assert_eq!(m.position, i as u16 + 1);
                }
            }
        }
    }

    #[test]
    fn test_generate_straight_seeding() {
        let roster = roster(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let bracket = Bracket::generate(BracketSize::new(8).unwrap(), &roster);

        // Round 1 match k holds seeds 2k - 1 and 2k.
        for k in 1..=4u16 {
            let m = bracket.get(1, k).unwrap();
            assert_eq!(m.player1(), Some(seed(&roster, 2 * k - 1)));
            assert_eq!(m.player2(), Some(seed(&roster, 2 * k)));
        }

        // Later rounds are entirely pending.
        for m in bracket.round(2).iter().chain(bracket.round(3)) {
            assert_eq!(m.slots, [MatchSlot::Pending, MatchSlot::Pending]);
        }
    }

    #[test]
    fn test_generate_partial_bracket_leaves_empty_slots() {
        let roster = roster(&["A", "B", "C", "D", "E", "F"]);
        let bracket = Bracket::generate(BracketSize::new(6).unwrap(), &roster);

        assert_eq!(bracket.matches().len(), 7);
        assert_eq!(bracket.get(1, 3).unwrap().player1(), Some(seed(&roster, 5)));
        assert_eq!(bracket.get(1, 3).unwrap().player2(), Some(seed(&roster, 6)));
        assert_eq!(
            bracket.get(1, 4).unwrap().slots,
            [MatchSlot::Empty, MatchSlot::Empty]
        );
    }

    #[test]
    fn test_advancement_rule() {
        let roster = roster(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let mut bracket = Bracket::generate(BracketSize::new(8).unwrap(), &roster);

        // Odd positions land in spot 1, even positions in spot 2 of the
        // match at ceil(k / 2).
        for k in 1..=4u16 {
            let winner = seed(&roster, 2 * k - 1);
            bracket.select_winner(1, k, winner).unwrap();

            let next = bracket.get(2, (k + 1) / 2).unwrap();
            let spot = if k % 2 == 1 { 0 } else { 1 };
            assert_eq!(next.slots[spot], MatchSlot::Player(winner));
        }
    }

    #[test]
    fn test_four_player_walkthrough() {
        let roster = roster(&["A", "B", "C", "D"]);
        let mut bracket = Bracket::generate(BracketSize::new(4).unwrap(), &roster);

        let s1 = seed(&roster, 1);
        let s4 = seed(&roster, 4);

        assert_eq!(bracket.get(1, 1).unwrap().player1(), Some(s1));
        assert_eq!(bracket.get(1, 2).unwrap().player2(), Some(s4));
        assert_eq!(
            bracket.get(2, 1).unwrap().slots,
            [MatchSlot::Pending, MatchSlot::Pending]
        );

        bracket.select_winner(1, 1, s1).unwrap();
        assert_eq!(bracket.get(2, 1).unwrap().player1(), Some(s1));

        bracket.select_winner(1, 2, s4).unwrap();
        assert_eq!(bracket.get(2, 1).unwrap().player2(), Some(s4));

        bracket.select_winner(2, 1, s1).unwrap();
        assert_eq!(bracket.champion(), Some(s1));
    }

    #[test]
    fn test_final_is_terminal() {
        let roster = roster(&["A", "B"]);
        let mut bracket = Bracket::generate(BracketSize::new(2).unwrap(), &roster);

        bracket.select_winner(1, 1, seed(&roster, 2)).unwrap();
        assert_eq!(bracket.champion(), Some(seed(&roster, 2)));
    }

    #[test]
    fn test_invalid_winner_is_rejected() {
        let roster = roster(&["A", "B", "C", "D"]);
        let mut bracket = Bracket::generate(BracketSize::new(4).unwrap(), &roster);

        let s3 = seed(&roster, 3);
        assert_eq!(
            bracket.select_winner(1, 1, s3),
            Err(Error::InvalidWinner {
                player: s3,
                round: 1,
                position: 1,
            })
        );

        assert_eq!(
            bracket.select_winner(5, 1, s3),
            Err(Error::UnknownMatch {
                round: 5,
                position: 1,
            })
        );
    }

    #[test]
    fn test_reselecting_winner_resets_downstream() {
        let roster = roster(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let mut bracket = Bracket::generate(BracketSize::new(8).unwrap(), &roster);

        let s1 = seed(&roster, 1);
        let s2 = seed(&roster, 2);
        let s3 = seed(&roster, 3);

        bracket.select_winner(1, 1, s1).unwrap();
        bracket.select_winner(1, 2, s3).unwrap();
        bracket.select_winner(2, 1, s1).unwrap();
        bracket.select_winner(3, 1, s1).unwrap();
        assert_eq!(bracket.champion(), Some(s1));

        // Changing the round 1 result invalidates everything that was
        // derived from it.
        bracket.select_winner(1, 1, s2).unwrap();

        let semi = bracket.get(2, 1).unwrap();
        assert_eq!(semi.player1(), Some(s2));
        assert_eq!(semi.winner, None);

        let r#final = bracket.get(3, 1).unwrap();
        assert_eq!(r#final.slots[0], MatchSlot::Pending);
        assert_eq!(bracket.champion(), None);
    }

    #[test]
    fn test_reselecting_same_winner_is_idempotent() {
        let roster = roster(&["A", "B", "C", "D"]);
        let mut bracket = Bracket::generate(BracketSize::new(4).unwrap(), &roster);

        let s1 = seed(&roster, 1);
        bracket.select_winner(1, 1, s1).unwrap();
        bracket.select_winner(1, 2, seed(&roster, 4)).unwrap();
        bracket.select_winner(2, 1, s1).unwrap();

        bracket.select_winner(1, 1, s1).unwrap();
        assert_eq!(bracket.champion(), Some(s1));
    }

    #[test]
    fn test_restore_validates_layout() {
        let roster = roster(&["A", "B", "C", "D"]);
        let bracket = Bracket::generate(BracketSize::new(4).unwrap(), &roster);
        let size = bracket.size();

        let mut matches = bracket.matches().to_vec();
        assert!(Bracket::restore(size, matches.clone()).is_ok());

        matches.pop();
        assert_eq!(
            Bracket::restore(size, matches.clone()),
            Err(Error::InvalidNumberOfMatches {
                expected: 3,
                found: 2,
            })
        );

        let mut matches = bracket.matches().to_vec();
        matches[2].position = 7;
        assert_eq!(
            Bracket::restore(size, matches),
            Err(Error::UnknownMatch {
                round: 2,
                position: 7,
            })
        );
    }

    #[test]
    fn test_engine_generate_requires_two_players() {
        let mut engine = BracketEngine::new("Club Cup");
        engine.add_player("Solo");

        assert_eq!(engine.generate(), Err(Error::NotEnoughPlayers(1)));
    }

    #[test]
    fn test_engine_regenerate_unbinds_persisted_tournament() {
        let mut engine = BracketEngine::new("Club Cup");
        engine.add_player("A");
        engine.add_player("B");

        engine.generate().unwrap();
        engine.bind_remote("b2a7c4".to_owned());
        assert_eq!(engine.remote_id(), Some("b2a7c4"));

        engine.generate().unwrap();
        assert_eq!(engine.remote_id(), None);
    }
}
