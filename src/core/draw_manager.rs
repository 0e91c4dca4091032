use crate::core::generator;
use crate::core::visibility;
use crate::domain::model::{
    CommitOutcome, Draw, DrawId, DrawSummary, GroupId, Participant, ParticipantId, ParticipantRef,
    RecipientView, ResolvedPair,
};
use crate::domain::ports::{DrawStore, PolicyProvider};
use crate::utils::error::{DrawError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the one-draw-per-group rule.
///
/// `create_draw` runs under a per-group lock so two callers sharing this
/// manager never generate for the same group at once. Callers on other
/// managers are only stopped by the store's compare-and-set commit, so a store
/// shared across processes must decide that commit against its durable state
/// (see [`crate::adapters::file::FileStore`]).
pub struct DrawManager<S, P> {
    store: S,
    policy: P,
    group_locks: Mutex<HashMap<GroupId, Arc<Mutex<()>>>>,
}

impl<S: DrawStore, P: PolicyProvider> DrawManager<S, P> {
    pub fn new(store: S, policy: P) -> Self {
        Self {
            store,
            policy,
            group_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub async fn create_draw(
        &self,
        group_id: GroupId,
        requester: ParticipantId,
    ) -> Result<DrawSummary> {
        let lock = self.group_lock(group_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.create_draw_locked(group_id, requester).await
        };
        self.release_group_lock(group_id, lock).await;
        result
    }

    async fn create_draw_locked(
        &self,
        group_id: GroupId,
        requester: ParticipantId,
    ) -> Result<DrawSummary> {
        let group = self
            .store
            .find_group(group_id)
            .await?
            .ok_or(DrawError::NotFound)?;

        if group.owner != requester {
            tracing::warn!(%group_id, %requester, "draw rejected: requester is not the owner");
            return Err(DrawError::Forbidden);
        }

        if group.is_drawn() {
            tracing::warn!(%group_id, "draw rejected: group already drawn");
            return Err(DrawError::AlreadyDrawn {
                group_id: group_id.to_string(),
            });
        }

        self.check_participant_count(group.participants.len())?;

        let roster = self.load_participants(&group.participants).await?;
        let pairs = generator::generate(&group.participants)?;
        let draw = Draw::new(group_id, pairs);

        match self.store.commit_draw(draw.clone()).await? {
            CommitOutcome::Committed => {
                tracing::info!(
                    %group_id,
                    draw_id = %draw.id,
                    participants = group.participants.len(),
                    "draw created"
                );
                summarize(&draw, &group.participants, &roster)
            }
            CommitOutcome::Conflict => {
                tracing::warn!(%group_id, "draw commit lost the race, group already drawn");
                Err(DrawError::AlreadyDrawn {
                    group_id: group_id.to_string(),
                })
            }
        }
    }

    /// Full pairing of a draw. Only for privileged callers; participants use
    /// [`DrawManager::my_recipient`].
    pub async fn get_draw(&self, draw_id: DrawId) -> Result<DrawSummary> {
        let draw = self
            .store
            .find_draw(draw_id)
            .await?
            .ok_or(DrawError::NotFound)?;

        let membership = self
            .store
            .find_group(draw.group_id)
            .await?
            .map(|group| group.participants)
            .unwrap_or_default();

        let givers = ordered_givers(&draw, &membership);
        let roster = self.load_participants(&givers).await?;
        summarize(&draw, &givers, &roster)
    }

    pub async fn my_recipient(
        &self,
        group_id: GroupId,
        requester: ParticipantId,
    ) -> Result<RecipientView> {
        visibility::recipient_for(&self.store, group_id, requester).await
    }

    fn check_participant_count(&self, count: usize) -> Result<()> {
        let min = self.policy.min_participants().max(2);
        if count < min {
            return Err(DrawError::InvalidParticipantCount {
                count,
                reason: format!("at least {} participants are needed", min),
            });
        }
        if self.policy.require_even_count() && count % 2 != 0 {
            return Err(DrawError::InvalidParticipantCount {
                count,
                reason: "the number of participants must be even".to_string(),
            });
        }
        Ok(())
    }

    async fn load_participants(
        &self,
        ids: &[ParticipantId],
    ) -> Result<HashMap<ParticipantId, Participant>> {
        let mut roster = HashMap::with_capacity(ids.len());
        for id in ids {
            match self.store.find_participant(*id).await? {
                Some(participant) => {
                    roster.insert(*id, participant);
                }
                None => {
                    tracing::debug!(participant_id = %id, "participant missing from directory");
                    return Err(DrawError::NotFound);
                }
            }
        }
        Ok(roster)
    }

    async fn group_lock(&self, group_id: GroupId) -> Arc<Mutex<()>> {
        let mut locks = self.group_locks.lock().await;
        locks.entry(group_id).or_default().clone()
    }

    /// Drops the map entry once no other caller holds or waits on it.
    async fn release_group_lock(&self, group_id: GroupId, lock: Arc<Mutex<()>>) {
        let mut locks = self.group_locks.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&group_id);
        }
    }

    #[cfg(test)]
    async fn held_group_locks(&self) -> usize {
        self.group_locks.lock().await.len()
    }
}

/// Givers in group order, then any givers no longer in the group.
fn ordered_givers(draw: &Draw, membership: &[ParticipantId]) -> Vec<ParticipantId> {
    let mut givers: Vec<ParticipantId> = membership
        .iter()
        .filter(|id| draw.pairs.contains_key(id))
        .copied()
        .collect();

    let mut departed: Vec<ParticipantId> = draw
        .pairs
        .keys()
        .filter(|id| !membership.contains(id))
        .copied()
        .collect();
    departed.sort();
    givers.extend(departed);
    givers
}

fn summarize(
    draw: &Draw,
    givers: &[ParticipantId],
    roster: &HashMap<ParticipantId, Participant>,
) -> Result<DrawSummary> {
    let resolve = |id: &ParticipantId| -> Result<ParticipantRef> {
        roster
            .get(id)
            .map(ParticipantRef::from)
            .ok_or(DrawError::NotFound)
    };

    let mut pairs = Vec::with_capacity(givers.len());
    for giver in givers {
        let recipient = draw.recipient_of(*giver).ok_or(DrawError::NotFound)?;
        pairs.push(ResolvedPair {
            giver: resolve(giver)?,
            recipient: resolve(&recipient)?,
        });
    }

    Ok(DrawSummary {
        id: draw.id,
        group_id: draw.group_id,
        created_at: draw.created_at,
        pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::config::DrawPolicy;
    use crate::domain::model::DrawState;
    use crate::domain::ports::GroupDirectory;

    async fn seeded(n: usize) -> (InMemoryStore, GroupId, Vec<ParticipantId>) {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let id = store.add_participant(format!("P{}", i), None).await;
            ids.push(id);
        }
        let group = store.create_group("office", ids[0]).await.unwrap();
        for id in &ids[1..] {
            store.invite(group, *id).await.unwrap();
        }
        (store, group, ids)
    }

    #[tokio::test]
    async fn test_minimum_policy_is_respected() {
        let (store, group, ids) = seeded(4).await;
        let policy = DrawPolicy {
            min_participants: 6,
            require_even_count: true,
        };
        let manager = DrawManager::new(store, policy);

        let err = manager.create_draw(group, ids[0]).await.unwrap_err();
        assert!(matches!(
            err,
            DrawError::InvalidParticipantCount { count: 4, .. }
        ));
    }

    #[tokio::test]
    async fn test_odd_count_allowed_when_policy_off() {
        let (store, group, ids) = seeded(3).await;
        let manager = DrawManager::new(store, DrawPolicy::allow_any_count());

        let summary = manager.create_draw(group, ids[0]).await.unwrap();
        assert_eq!(summary.pairs.len(), 3);
    }

    #[tokio::test]
    async fn test_summary_follows_group_order() {
        let (store, group, ids) = seeded(4).await;
        let manager = DrawManager::new(store, DrawPolicy::default());

        let summary = manager.create_draw(group, ids[0]).await.unwrap();
        let givers: Vec<_> = summary.pairs.iter().map(|p| p.giver.id).collect();
        assert_eq!(givers, ids);
    }

    #[tokio::test]
    async fn test_missing_participant_record_leaves_group_undrawn() {
        let (store, group, ids) = seeded(4).await;
        store.remove_participant(ids[2]).await;
        let manager = DrawManager::new(store, DrawPolicy::default());

        let err = manager.create_draw(group, ids[0]).await.unwrap_err();
        assert!(matches!(err, DrawError::NotFound));

        let group = manager.store().find_group(group).await.unwrap().unwrap();
        assert_eq!(group.state, DrawState::NotDrawn);
    }

    #[tokio::test]
    async fn test_group_locks_are_released_after_each_call() {
        let (store, group, ids) = seeded(4).await;
        let manager = DrawManager::new(store, DrawPolicy::default());

        manager.create_draw(group, ids[0]).await.unwrap();
        assert_eq!(manager.held_group_locks().await, 0);

        manager.create_draw(group, ids[0]).await.unwrap_err();
        manager.create_draw(GroupId::new(), ids[0]).await.unwrap_err();
        assert_eq!(manager.held_group_locks().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_group_locks_released_after_concurrent_calls() {
        let (store, group, ids) = seeded(4).await;
        let manager = Arc::new(DrawManager::new(store, DrawPolicy::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let owner = ids[0];
                tokio::spawn(async move { manager.create_draw(group, owner).await })
            })
            .collect();
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(manager.held_group_locks().await, 0);
    }

    #[test]
    fn test_ordered_givers_appends_departed_members() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        let pairs = [(a, b), (b, a)].into_iter().collect();
        let draw = Draw::new(GroupId::new(), pairs);

        let givers = ordered_givers(&draw, &[b]);
        assert_eq!(givers, vec![b, a]);
    }
}
