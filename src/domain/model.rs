use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Shown in place of a recipient's wish list when they never registered one.
pub const NO_WISH_LIST: &str = "No wish list item registered";

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(ParticipantId);
id_type!(GroupId);
id_type!(DrawId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wish_list: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawState {
    #[default]
    NotDrawn,
    Drawn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub owner: ParticipantId,
    /// Membership in insertion order.
    pub participants: Vec<ParticipantId>,
    #[serde(default)]
    pub state: DrawState,
}

impl Group {
    pub fn is_member(&self, participant: ParticipantId) -> bool {
        self.participants.contains(&participant)
    }

    pub fn is_drawn(&self) -> bool {
        self.state == DrawState::Drawn
    }
}

/// Giver to recipient.
pub type Assignments = HashMap<ParticipantId, ParticipantId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub id: DrawId,
    pub group_id: GroupId,
    pub pairs: Assignments,
    pub created_at: DateTime<Utc>,
}

impl Draw {
    pub fn new(group_id: GroupId, pairs: Assignments) -> Self {
        Self {
            id: DrawId::new(),
            group_id,
            pairs,
            created_at: Utc::now(),
        }
    }

    pub fn recipient_of(&self, giver: ParticipantId) -> Option<ParticipantId> {
        self.pairs.get(&giver).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub id: ParticipantId,
    pub name: String,
}

impl From<&Participant> for ParticipantRef {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPair {
    pub giver: ParticipantRef,
    pub recipient: ParticipantRef,
}

/// Full pairing with display names. Privileged view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSummary {
    pub id: DrawId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub pairs: Vec<ResolvedPair>,
}

impl DrawSummary {
    pub fn recipient_of(&self, giver: ParticipantId) -> Option<&ParticipantRef> {
        self.pairs
            .iter()
            .find(|pair| pair.giver.id == giver)
            .map(|pair| &pair.recipient)
    }
}

/// What a single participant is allowed to learn about a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientView {
    pub recipient_id: ParticipantId,
    pub recipient_name: String,
    pub wish_list: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The group was no longer `NotDrawn` when the commit landed.
    Conflict,
}
