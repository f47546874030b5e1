//! Secret role assignment.

use crate::types::{GameSettings, Player, PlayerId, Role, WordPair};
use rand::Rng;

/// Deal roles and words for a new game.
///
/// Trusts `settings` to be valid; an undercover count above the table size
/// is capped at the table size.
pub fn assign(settings: &GameSettings, pair: &WordPair) -> Vec<Player> {
    assign_with_rng(settings, pair, &mut rand::rng())
}

pub fn assign_with_rng<R: Rng + ?Sized>(
    settings: &GameSettings,
    pair: &WordPair,
    rng: &mut R,
) -> Vec<Player> {
    let total = settings.total_players as usize;
    let undercover = (settings.undercover_count as usize).min(total);

    let mut players: Vec<Player> = (1..=settings.total_players)
        .map(|id: PlayerId| Player {
            id,
            role: Role::Civilian,
            word: pair.civilian_word.clone(),
            is_alive: true,
            is_revealed: false,
        })
        .collect();

    for index in rand::seq::index::sample(rng, total, undercover) {
        let player = &mut players[index];
        player.role = Role::Undercover;
        player.word = pair.undercover_word.clone();
    }

    players
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn settings(total_players: u32, undercover_count: u32) -> GameSettings {
        GameSettings {
            total_players,
            undercover_count,
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_six_players_two_undercover() {
        let pair = WordPair::new("Coffee", "Tea");
        let players = assign(&settings(6, 2), &pair);

        assert_eq!(players.len(), 6);
        let (spies, civilians): (Vec<_>, Vec<_>) =
            players.iter().partition(|p| p.role == Role::Undercover);
        assert_eq!(spies.len(), 2);
        assert!(spies.iter().all(|p| p.word == "Tea"));
        assert_eq!(civilians.len(), 4);
        assert!(civilians.iter().all(|p| p.word == "Coffee"));
    }

    #[test]
    fn test_ids_and_flags() {
        let players = assign(&settings(12, 4), &WordPair::new("Cat", "Dog"));

        let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=12).collect::<Vec<_>>());
        assert!(players.iter().all(|p| p.is_alive && !p.is_revealed));
    }

    #[test]
    fn test_every_seat_can_be_undercover() {
        let pair = WordPair::new("Train", "Bus");
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            for player in assign_with_rng(&settings(3, 1), &pair, &mut rng) {
                if player.role == Role::Undercover {
                    seen.insert(player.id);
                }
            }
        }

        assert_eq!(seen, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_oversized_count_is_capped() {
        let players = assign(&settings(3, 5), &WordPair::new("Guitar", "Violin"));
        assert!(players.iter().all(|p| p.role == Role::Undercover));
    }
}
