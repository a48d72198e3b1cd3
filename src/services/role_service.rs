use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashMap;

use crate::models::{participant::ParticipantKey, role::Role};
use crate::services::session_service::GameError;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 5;

/// 役職デッキを作ってシャッフルし、ロスターと中央3枚に順番に配る。
/// デッキは人狼2・占い師1・怪盗1・いたずら者1に村人を足した人数+3枚
pub fn assign_roles(roster: &[String]) -> Result<HashMap<ParticipantKey, Role>, GameError> {
    let player_count = roster.len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(GameError::InvalidRosterSize(player_count));
    }

    let mut deck = vec![
        Role::Werewolf,
        Role::Werewolf,
        Role::Seer,
        Role::Robber,
        Role::Troublemaker,
    ];
    deck.extend(std::iter::repeat(Role::Villager).take(player_count - 2));
    deck.shuffle(&mut thread_rng());

    let keys = roster
        .iter()
        .map(|id| ParticipantKey::Player(id.clone()))
        .chain((0..3).map(ParticipantKey::Center));
    Ok(keys.zip(deck).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_band_is_enforced() {
        let roster: Vec<String> = (0..6).map(|i| format!("U{}", i)).collect();
        assert!(matches!(
            assign_roles(&roster[..2]),
            Err(GameError::InvalidRosterSize(2))
        ));
        assert!(matches!(
            assign_roles(&roster),
            Err(GameError::InvalidRosterSize(6))
        ));
    }

    #[test]
    fn test_deck_size_matches_roster_plus_center() {
        let roster: Vec<String> = (0..4).map(|i| format!("U{}", i)).collect();
        let assignment = assign_roles(&roster).unwrap();
        assert_eq!(assignment.len(), roster.len() + 3);
    }
}
