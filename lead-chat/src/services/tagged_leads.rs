use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::ChatMessage;

/// A lead referenced somewhere in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedLead {
    pub lead_id: u64,
    /// Name from the most recent mention
    pub lead_name: String,
    pub mention_count: usize,
    pub last_mentioned_at: DateTime<Utc>,
}

/// Distinct leads mentioned across `messages`, ordered by first mention.
pub fn tagged_leads<'a, I>(messages: I) -> Vec<TaggedLead>
where
    I: IntoIterator<Item = &'a ChatMessage>,
{
    let mut summary: Vec<TaggedLead> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for message in messages {
        for token in message.mentions() {
            match index.get(&token.lead_id()) {
                Some(&pos) => {
                    let entry = &mut summary[pos];
                    entry.mention_count += 1;
                    if message.created_at >= entry.last_mentioned_at {
                        entry.last_mentioned_at = message.created_at;
                        entry.lead_name = token.lead_name().to_string();
                    }
                }
                None => {
                    index.insert(token.lead_id(), summary.len());
                    summary.push(TaggedLead {
                        lead_id: token.lead_id(),
                        lead_name: token.lead_name().to_string(),
                        mention_count: 1,
                        last_mentioned_at: message.created_at,
                    });
                }
            }
        }
    }

    summary
}
