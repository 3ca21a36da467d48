//! Participant (a registered team) and the Slot a participant occupies in a match.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (stable across the tournament).
pub type ParticipantId = Uuid;

/// A team entered in the bracket.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    /// Create a new participant with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// One side of a match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "participant", rename_all = "snake_case")]
pub enum Slot {
    /// A seated team.
    Team(Participant),
    /// Placeholder for a seat that a future winner will fill.
    Tbd,
    /// No opponent: the other side advances on a bye.
    #[default]
    Empty,
}

impl Slot {
    /// The seated participant, if any.
    pub fn participant(&self) -> Option<&Participant> {
        match self {
            Slot::Team(p) => Some(p),
            Slot::Tbd | Slot::Empty => None,
        }
    }

    /// Label used in exports and logs.
    pub fn label(&self) -> &str {
        match self {
            Slot::Team(p) => &p.name,
            Slot::Tbd => "TBD",
            Slot::Empty => "BYE",
        }
    }
}

impl From<Participant> for Slot {
    fn from(p: Participant) -> Self {
        Slot::Team(p)
    }
}

impl From<Option<Participant>> for Slot {
    fn from(p: Option<Participant>) -> Self {
        p.map_or(Slot::Empty, Slot::Team)
    }
}
