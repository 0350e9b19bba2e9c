use std::fmt::{self, Display, Formatter};
use std::slice::Iter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An identifier for a [`Player`], unique within one [`Roster`].
///
/// Ids are handed out by the roster and carry no meaning outside the
/// session that created them. The persistence layer assigns its own row
/// keys on save.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlayerId(pub u32);

impl Display for PlayerId {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single entrant on the roster.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// 1-based rank used for initial bracket placement. Lower is better.
    pub seed: u16,
}

/// The ordered list of players entered into a tournament.
///
/// Seeds follow insertion order: the next player always receives
/// `len + 1`. Removing a player leaves a gap in the seed sequence; the
/// remaining seeds are deliberately not renumbered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roster {
    players: Vec<Player>,
    next_id: u32,
}

impl Roster {
    /// Creates a new empty `Roster`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a roster from `(name, seed)` pairs, e.g. rows loaded from
    /// the persistence gateway. Fresh local ids are assigned in order.
    pub fn restore<I>(players: I) -> Self
    where
        I: IntoIterator<Item = (String, u16)>,
    {
        let mut roster = Self::new();

        for (name, seed) in players {
            let id = roster.mint_id();
            roster.players.push(Player { id, name, seed });
        }

        roster
    }

    /// Adds a player with the next free seed and returns its id.
    ///
    /// Empty and whitespace-only names are ignored and `None` is
    /// returned; the roster is left untouched.
    pub fn add(&mut self, name: &str) -> Option<PlayerId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = self.mint_id();
        let seed = self.players.len() as u16 + 1;

        log::debug!("Adding player {:?} with seed {}", name, seed);

        self.players.push(Player {
            id,
            name: name.to_owned(),
            seed,
        });

        Some(id)
    }

    /// Removes the player with the given `id`, returning it if present.
    ///
    /// Seeds of the remaining players are unchanged.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    /// Replaces the display name of the player with the given `id`.
    /// Seed and id are unchanged. Returns `false` if no such player
    /// exists or the new name is blank.
    pub fn rename(&mut self, id: PlayerId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.name = name.to_owned();
                true
            }
            None => false,
        }
    }

    /// Returns the player with the given `id`.
    #[inline]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Returns the player holding the given `seed`.
    #[inline]
    pub fn player_by_seed(&self, seed: u16) -> Option<&Player> {
        self.players.iter().find(|p| p.seed == seed)
    }

    /// Returns the players ordered by ascending seed.
    pub fn seeded(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by_key(|p| p.seed);
        players
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, Player> {
        self.players.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn mint_id(&mut self) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Player;
    type IntoIter = Iter<'a, Player>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Roster;

    #[test]
    fn test_add_assigns_sequential_seeds() {
        let mut roster = Roster::new();

        roster.add("Hamilton");
        roster.add("Verstappen");
        roster.add("Leclerc");

        let seeds: Vec<u16> = roster.iter().map(|p| p.seed).collect();
        assert_eq!(seeds, vec![1, 2, 3]);
    }

    #[test]
    fn test_add_blank_name_is_ignored() {
        let mut roster = Roster::new();

        assert_eq!(roster.add(""), None);
        assert_eq!(roster.add("   "), None);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_add_trims_whitespace() {
        let mut roster = Roster::new();

        let id = roster.add("  Norris  ").unwrap();
        assert_eq!(roster.get(id).unwrap().name, "Norris");
    }

    #[test]
    fn test_remove_leaves_seed_gap() {
        let mut roster = Roster::new();

        let _a = roster.add("A").unwrap();
        let b = roster.add("B").unwrap();
        let _c = roster.add("C").unwrap();

        roster.remove(b);

        let seeds: Vec<u16> = roster.iter().map(|p| p.seed).collect();
        assert_eq!(seeds, vec![1, 3]);
    }

    #[test]
    fn test_rename_keeps_seed_and_id() {
        let mut roster = Roster::new();

        let id = roster.add("Sainz").unwrap();
        assert!(roster.rename(id, "Sainz Jr."));

        let player = roster.get(id).unwrap();
        assert_eq!(player.name, "Sainz Jr.");
        assert_eq!(player.seed, 1);
        assert_eq!(player.id, id);
    }

    #[test]
    fn test_restore_keeps_seeds() {
        let roster = Roster::restore([("A".to_owned(), 1), ("C".to_owned(), 3)]);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.player_by_seed(3).unwrap().name, "C");
        assert!(roster.player_by_seed(2).is_none());
    }
}
