use std::collections::HashMap;

use onenight_server::models::{participant::ParticipantKey, role::Role};
use onenight_server::services::role_service::{assign_roles, MAX_PLAYERS, MIN_PLAYERS};
use onenight_server::services::session_service::GameError;

fn roster(size: usize) -> Vec<String> {
    (1..=size).map(|i| format!("U{}", i)).collect()
}

fn count_role(assignment: &HashMap<ParticipantKey, Role>, role: Role) -> usize {
    assignment.values().filter(|r| **r == role).count()
}

#[test]
fn test_deck_composition_for_every_roster_size() {
    for size in MIN_PLAYERS..=MAX_PLAYERS {
        println!("Testing deck for {} players", size);
        let assignment = assign_roles(&roster(size)).unwrap();

        // 配られるカードは常に人数+3枚
        assert_eq!(assignment.len(), size + 3);
        assert_eq!(count_role(&assignment, Role::Werewolf), 2);
        assert_eq!(count_role(&assignment, Role::Seer), 1);
        assert_eq!(count_role(&assignment, Role::Robber), 1);
        assert_eq!(count_role(&assignment, Role::Troublemaker), 1);
        assert_eq!(count_role(&assignment, Role::Villager), size - 2);
    }
}

#[test]
fn test_every_participant_gets_exactly_one_card() {
    let players = roster(5);
    let assignment = assign_roles(&players).unwrap();

    for id in &players {
        assert!(
            assignment.contains_key(&ParticipantKey::Player(id.clone())),
            "player {} should hold a card",
            id
        );
    }
    for slot in 0..3 {
        assert!(assignment.contains_key(&ParticipantKey::Center(slot)));
    }
}

#[test]
fn test_out_of_band_roster_is_rejected() {
    for size in [0, 1, 2, 6, 9] {
        let result = assign_roles(&roster(size));
        assert!(
            matches!(result, Err(GameError::InvalidRosterSize(found)) if found == size),
            "roster of {} should be rejected",
            size
        );
    }
}
