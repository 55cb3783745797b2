use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    trimmed, Conversation, MessageRow, MessageWithParticipants, SendMessageRequest,
};

const MESSAGE_SELECT: &str = "SELECT m.id, m.content, m.is_read, m.sender_id, m.receiver_id, m.created_at,
            s.full_name AS sender_full_name, s.image AS sender_image, s.role AS sender_role,
            r.full_name AS receiver_full_name, r.image AS receiver_image, r.role AS receiver_role
     FROM messages m
     JOIN users s ON s.id = m.sender_id
     JOIN users r ON r.id = m.receiver_id";

#[derive(Clone)]
pub struct MessageService {
    db: PgPool,
}

impl MessageService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn conversations(&self, session: &UserSession) -> ApiResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "{MESSAGE_SELECT}
             WHERE m.sender_id = $1 OR m.receiver_id = $1
             ORDER BY m.created_at DESC"
        ))
        .bind(session.user_id)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des messages")?;

        let messages = rows.into_iter().map(MessageWithParticipants::from).collect();
        Ok(group_conversations(session.user_id, messages))
    }

    pub async fn send(
        &self,
        session: &UserSession,
        request: SendMessageRequest,
    ) -> ApiResult<MessageWithParticipants> {
        let content = trimmed(request.content.as_deref());
        let (Some(receiver_id), Some(content)) = (request.receiver_id, content) else {
            return Err(ApiError::bad_request("Destinataire et contenu requis"));
        };

        let row = sqlx::query_as::<_, MessageRow>(
            "WITH m AS (
                INSERT INTO messages (content, sender_id, receiver_id)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT m.id, m.content, m.is_read, m.sender_id, m.receiver_id, m.created_at,
                    s.full_name AS sender_full_name, s.image AS sender_image, s.role AS sender_role,
                    r.full_name AS receiver_full_name, r.image AS receiver_image, r.role AS receiver_role
             FROM m
             JOIN users s ON s.id = m.sender_id
             JOIN users r ON r.id = m.receiver_id",
        )
        .bind(&content)
        .bind(session.user_id)
        .bind(receiver_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, "Destinataire non trouvé", "Erreur lors de l'envoi du message")
        })?;

        tracing::debug!(message_id = %row.message.id, %receiver_id, "message sent");
        Ok(row.into())
    }

    /// Both directions of a conversation, oldest first. Messages the other
    /// user sent are marked read once loaded.
    pub async fn thread(
        &self,
        session: &UserSession,
        other_user_id: Uuid,
    ) -> ApiResult<Vec<MessageWithParticipants>> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "{MESSAGE_SELECT}
             WHERE (m.sender_id = $1 AND m.receiver_id = $2)
                OR (m.sender_id = $2 AND m.receiver_id = $1)
             ORDER BY m.created_at ASC"
        ))
        .bind(session.user_id)
        .bind(other_user_id)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des messages")?;

        sqlx::query(
            "UPDATE messages SET is_read = TRUE
             WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE",
        )
        .bind(other_user_id)
        .bind(session.user_id)
        .execute(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des messages")?;

        Ok(rows.into_iter().map(MessageWithParticipants::from).collect())
    }
}

/// Groups messages (newest first) by the counterpart of `me`. The first
/// message seen per counterpart becomes `last_message`; unread counts only
/// include messages addressed to `me`.
pub fn group_conversations(me: Uuid, messages: Vec<MessageWithParticipants>) -> Vec<Conversation> {
    let mut conversations: Vec<Conversation> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for message in messages {
        let unread = message.message.receiver_id == me && !message.message.is_read;
        let other = if message.message.sender_id == me {
            message.receiver.clone()
        } else {
            message.sender.clone()
        };

        match index.get(&other.id) {
            Some(&position) => {
                if unread {
                    conversations[position].unread_count += 1;
                }
            }
            None => {
                index.insert(other.id, conversations.len());
                conversations.push(Conversation {
                    other_user: other,
                    last_message: message,
                    unread_count: i64::from(unread),
                });
            }
        }
    }

    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::{Message, Participant};
    use chrono::{Duration, Utc};

    fn participant(id: Uuid, name: &str, role: Role) -> Participant {
        Participant {
            id,
            full_name: Some(name.to_string()),
            image: None,
            role,
        }
    }

    fn message(
        sender: &Participant,
        receiver: &Participant,
        minutes_ago: i64,
        is_read: bool,
    ) -> MessageWithParticipants {
        MessageWithParticipants {
            message: Message {
                id: Uuid::new_v4(),
                content: format!("il y a {} minutes", minutes_ago),
                is_read,
                sender_id: sender.id,
                receiver_id: receiver.id,
                created_at: Utc::now() - Duration::minutes(minutes_ago),
            },
            sender: sender.clone(),
            receiver: receiver.clone(),
        }
    }

    #[test]
    fn test_group_conversations_by_counterpart() {
        let me = participant(Uuid::new_v4(), "Marie", Role::Apprenant);
        let john = participant(Uuid::new_v4(), "John", Role::FormateurAdmin);
        let jean = participant(Uuid::new_v4(), "Jean", Role::Apprenant);

        let newest_first = vec![
            message(&john, &me, 1, false),
            message(&me, &jean, 2, true),
            message(&john, &me, 3, false),
            message(&me, &john, 4, true),
            message(&jean, &me, 5, true),
        ];
        let latest_from_john = newest_first[0].message.id;

        let conversations = group_conversations(me.id, newest_first);

        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].other_user.id, john.id);
        assert_eq!(conversations[0].last_message.message.id, latest_from_john);
        assert_eq!(conversations[0].unread_count, 2);
        assert_eq!(conversations[1].other_user.id, jean.id);
        assert_eq!(conversations[1].unread_count, 0);
    }

    #[test]
    fn test_own_unread_messages_do_not_count() {
        let me = participant(Uuid::new_v4(), "John", Role::FormateurAdmin);
        let learner = participant(Uuid::new_v4(), "Marie", Role::Apprenant);

        let conversations =
            group_conversations(me.id, vec![message(&me, &learner, 1, false)]);

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].other_user.id, learner.id);
        assert_eq!(conversations[0].unread_count, 0);
    }

    #[test]
    fn test_conversation_json_shape() {
        let me = participant(Uuid::new_v4(), "Marie", Role::Apprenant);
        let john = participant(Uuid::new_v4(), "John", Role::FormateurAdmin);

        let conversations = group_conversations(me.id, vec![message(&john, &me, 1, false)]);
        let json = serde_json::to_value(&conversations).unwrap();

        assert_eq!(json[0]["otherUser"]["fullName"], "John");
        assert_eq!(json[0]["lastMessage"]["isRead"], false);
        assert_eq!(json[0]["lastMessage"]["sender"]["role"], "FORMATEUR_ADMIN");
        assert_eq!(json[0]["unreadCount"], 1);
    }

    #[test]
    fn test_no_messages_no_conversations() {
        assert!(group_conversations(Uuid::new_v4(), Vec::new()).is_empty());
    }
}
