use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::{CommunityRecipe, SavedRecipe};

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full list of a user's saved recipes, newest first
    SavedRecipes {
        uid: String,
        recipes: Vec<SavedRecipe>,
        timestamp: DateTime<Utc>,
    },
    /// Full community feed, newest first
    CommunityRecipes {
        recipes: Vec<CommunityRecipe>,
        timestamp: DateTime<Utc>,
    },
    /// Subscription confirmation
    Subscribed {
        channel: Channel,
    },
    /// Unsubscription confirmation
    Unsubscribed {
        channel: Channel,
    },
    /// Error message
    Error {
        message: String,
    },
    /// Heartbeat/Ping
    Ping {
        timestamp: DateTime<Utc>,
    },
    /// Pong response
    Pong {
        timestamp: DateTime<Utc>,
    },
}

impl WsMessage {
    pub fn saved(uid: &str, recipes: Vec<SavedRecipe>) -> Self {
        WsMessage::SavedRecipes {
            uid: uid.to_string(),
            recipes,
            timestamp: Utc::now(),
        }
    }

    pub fn community(recipes: Vec<CommunityRecipe>) -> Self {
        WsMessage::CommunityRecipes {
            recipes,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        WsMessage::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// The caller's saved recipes; requires a session token
    Saved,
    Community,
}

/// Client subscription request
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        channel: Channel,
        #[serde(default)]
        token: Option<String>,
    },
    Unsubscribe {
        channel: Channel,
    },
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_messages_parse() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "action": "subscribe", "channel": "saved", "token": "abc"
        }))
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Subscribe { channel: Channel::Saved, token: Some(ref t) } if t == "abc"
        ));

        let msg: ClientMessage =
            serde_json::from_value(json!({"action": "subscribe", "channel": "community"})).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Subscribe { channel: Channel::Community, token: None }
        ));

        let msg: ClientMessage = serde_json::from_value(json!({"action": "ping"})).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));

        assert!(serde_json::from_value::<ClientMessage>(json!({"action": "subscribe", "channel": "orders"})).is_err());
    }

    #[test]
    fn test_server_message_tags() {
        let value = serde_json::to_value(WsMessage::community(vec![])).unwrap();
        assert_eq!(value["type"], "community_recipes");

        let value = serde_json::to_value(WsMessage::Subscribed { channel: Channel::Saved }).unwrap();
        assert_eq!(value, json!({"type": "subscribed", "channel": "saved"}));
    }
}
