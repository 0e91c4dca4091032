use crate::domain::model::{CommitOutcome, Draw, DrawId, Group, GroupId, Participant, ParticipantId};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn find_group(&self, id: GroupId) -> Result<Option<Group>>;
}

#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    async fn find_participant(&self, id: ParticipantId) -> Result<Option<Participant>>;
}

#[async_trait]
pub trait DrawRepository: Send + Sync {
    async fn find_draw(&self, id: DrawId) -> Result<Option<Draw>>;

    async fn find_draw_by_group(&self, group_id: GroupId) -> Result<Option<Draw>>;

    /// Stores `draw` and marks its group `Drawn` as one unit. Returns
    /// `Conflict` without storing anything if the group is already drawn.
    async fn commit_draw(&self, draw: Draw) -> Result<CommitOutcome>;
}

pub trait PolicyProvider: Send + Sync {
    fn min_participants(&self) -> usize;
    fn require_even_count(&self) -> bool;
}

/// Everything the draw manager needs from the surrounding system.
pub trait DrawStore: GroupDirectory + ParticipantDirectory + DrawRepository {}

impl<T> DrawStore for T where T: GroupDirectory + ParticipantDirectory + DrawRepository {}
