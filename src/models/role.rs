use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Werewolf,     // 人狼
    Seer,         // 占い師
    Robber,       // 怪盗
    Troublemaker, // いたずら者
    Villager,     // 村人
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Werewolf => write!(f, "werewolf"),
            Role::Seer => write!(f, "seer"),
            Role::Robber => write!(f, "robber"),
            Role::Troublemaker => write!(f, "troublemaker"),
            Role::Villager => write!(f, "villager"),
        }
    }
}
