use crate::domain::model::{
    CommitOutcome, Draw, DrawId, DrawState, Group, GroupId, Participant, ParticipantId,
};
use crate::domain::ports::{DrawRepository, GroupDirectory, ParticipantDirectory};
use crate::utils::error::{DrawError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct StoreState {
    participants: HashMap<ParticipantId, Participant>,
    groups: HashMap<GroupId, Group>,
    draws: HashMap<DrawId, Draw>,
    draws_by_group: HashMap<GroupId, DrawId>,
}

/// Directory and draw storage held in process memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_participant(&self, participant: Participant) {
        let mut state = self.state.write().await;
        state.participants.insert(participant.id, participant);
    }

    pub async fn add_participant(
        &self,
        name: impl Into<String>,
        wish_list: Option<String>,
    ) -> ParticipantId {
        let participant = Participant {
            id: ParticipantId::new(),
            name: name.into(),
            wish_list,
        };
        let id = participant.id;
        self.insert_participant(participant).await;
        id
    }

    /// Drops a participant from the directory. Group memberships are left alone.
    pub async fn remove_participant(&self, id: ParticipantId) -> Option<Participant> {
        self.state.write().await.participants.remove(&id)
    }

    pub async fn insert_group(&self, group: Group) -> Result<()> {
        let mut state = self.state.write().await;
        for (i, member) in group.participants.iter().enumerate() {
            if group.participants[..i].contains(member) {
                return Err(DrawError::DuplicateParticipant {
                    participant_id: member.to_string(),
                });
            }
        }
        state.groups.insert(group.id, group);
        Ok(())
    }

    /// Creates an undrawn group with its owner as first member.
    pub async fn create_group(
        &self,
        name: impl Into<String>,
        owner: ParticipantId,
    ) -> Result<GroupId> {
        let mut state = self.state.write().await;
        if !state.participants.contains_key(&owner) {
            return Err(DrawError::NotFound);
        }
        let group = Group {
            id: GroupId::new(),
            name: name.into(),
            owner,
            participants: vec![owner],
            state: DrawState::NotDrawn,
        };
        let id = group.id;
        state.groups.insert(id, group);
        Ok(id)
    }

    /// Adds an existing participant to a group. An existing draw is not touched.
    pub async fn invite(&self, group_id: GroupId, participant_id: ParticipantId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.participants.contains_key(&participant_id) {
            return Err(DrawError::NotFound);
        }
        let group = state.groups.get_mut(&group_id).ok_or(DrawError::NotFound)?;
        if group.is_member(participant_id) {
            return Err(DrawError::AlreadyMember {
                participant_id: participant_id.to_string(),
                group_id: group_id.to_string(),
            });
        }
        group.participants.push(participant_id);
        Ok(())
    }

    pub async fn remove_member(&self, group_id: GroupId, participant_id: ParticipantId) -> Result<()> {
        let mut state = self.state.write().await;
        let group = state.groups.get_mut(&group_id).ok_or(DrawError::NotFound)?;
        let before = group.participants.len();
        group.participants.retain(|id| *id != participant_id);
        if group.participants.len() == before {
            return Err(DrawError::NotFound);
        }
        Ok(())
    }

    pub async fn draw_count(&self) -> usize {
        self.state.read().await.draws.len()
    }

    pub async fn draws(&self) -> Vec<Draw> {
        self.state.read().await.draws.values().cloned().collect()
    }

    /// Puts back a draw loaded from durable storage and marks its group drawn.
    pub(crate) async fn restore_draw(&self, draw: Draw) {
        let mut state = self.state.write().await;
        if let Some(group) = state.groups.get_mut(&draw.group_id) {
            group.state = DrawState::Drawn;
        }
        state.draws_by_group.insert(draw.group_id, draw.id);
        state.draws.insert(draw.id, draw);
    }

    /// Compare-and-set commit. `persist` runs under the write lock once the
    /// in-memory check passes and may still report a conflict of its own; the
    /// draw is only applied when it answers `Committed`.
    pub(crate) async fn commit_with<F, Fut>(&self, draw: Draw, persist: F) -> Result<CommitOutcome>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<CommitOutcome>> + Send,
    {
        let mut state = self.state.write().await;

        let group = state.groups.get(&draw.group_id).ok_or(DrawError::NotFound)?;
        if group.is_drawn() || state.draws_by_group.contains_key(&draw.group_id) {
            return Ok(CommitOutcome::Conflict);
        }

        if persist().await? == CommitOutcome::Conflict {
            return Ok(CommitOutcome::Conflict);
        }

        if let Some(group) = state.groups.get_mut(&draw.group_id) {
            group.state = DrawState::Drawn;
        }
        state.draws_by_group.insert(draw.group_id, draw.id);
        state.draws.insert(draw.id, draw);
        Ok(CommitOutcome::Committed)
    }
}

#[async_trait]
impl GroupDirectory for InMemoryStore {
    async fn find_group(&self, id: GroupId) -> Result<Option<Group>> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryStore {
    async fn find_participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        Ok(self.state.read().await.participants.get(&id).cloned())
    }
}

#[async_trait]
impl DrawRepository for InMemoryStore {
    async fn find_draw(&self, id: DrawId) -> Result<Option<Draw>> {
        Ok(self.state.read().await.draws.get(&id).cloned())
    }

    async fn find_draw_by_group(&self, group_id: GroupId) -> Result<Option<Draw>> {
        let state = self.state.read().await;
        Ok(state
            .draws_by_group
            .get(&group_id)
            .and_then(|id| state.draws.get(id))
            .cloned())
    }

    async fn commit_draw(&self, draw: Draw) -> Result<CommitOutcome> {
        self.commit_with(draw, || async { Ok::<_, DrawError>(CommitOutcome::Committed) })
            .await
    }
}
