use crate::domain::model::{GroupId, ParticipantId, RecipientView, NO_WISH_LIST};
use crate::domain::ports::DrawStore;
use crate::utils::error::{DrawError, Result};

/// Looks up the one recipient assigned to `requester` in `group_id`.
///
/// A missing group, a group not yet drawn and a requester outside the group
/// all produce the same bare `NotFound`, so the response cannot be used to
/// find out which groups exist or who belongs to them.
pub async fn recipient_for<S: DrawStore + ?Sized>(
    store: &S,
    group_id: GroupId,
    requester: ParticipantId,
) -> Result<RecipientView> {
    let Some(group) = store.find_group(group_id).await? else {
        tracing::debug!(%group_id, "recipient lookup: no such group");
        return Err(DrawError::NotFound);
    };

    if !group.is_drawn() || !group.is_member(requester) {
        tracing::debug!(%group_id, %requester, "recipient lookup: not visible to requester");
        return Err(DrawError::NotFound);
    }

    let Some(draw) = store.find_draw_by_group(group_id).await? else {
        tracing::warn!(%group_id, "group marked drawn but no draw stored");
        return Err(DrawError::NotFound);
    };

    // Members who joined after the draw have no recipient.
    let recipient_id = draw.recipient_of(requester).ok_or(DrawError::NotFound)?;

    let recipient = store
        .find_participant(recipient_id)
        .await?
        .ok_or(DrawError::NotFound)?;

    Ok(RecipientView {
        recipient_id: recipient.id,
        recipient_name: recipient.name,
        wish_list: recipient
            .wish_list
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| NO_WISH_LIST.to_string()),
    })
}
