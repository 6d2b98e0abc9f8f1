//! Inbox notifications from the remote document store.
//!
//! The remote store is an external collaborator; this module only fixes the
//! shape of the documents it reads and writes and the consistency it expects:
//! an ordered live subscription that delivers the full result set on every
//! change. [`MemoryCollection`] implements the same contract in-process.
//!
//! Documents carry a `type` field selecting the notification variant:
//!
//! ```json
//! { "type": "message", "senderName": "Coach", "message": "Hi", "unreadCount": 1, "timestamp": 1718000000000 }
//! { "type": "progress", "title": "Weekly goal", "progressInfo": "3 of 4 done" }
//! ```

use crate::subscription::{Publisher, Subscription};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Remote collection holding inbox notifications
pub const NOTIFICATIONS_COLLECTION: &str = "notifications";

/// A raw document: remote id plus its fields
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// Notification payload, selected by the document's `type` field
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NotificationKind {
    Message {
        #[serde(default)]
        sender_name: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        avatar_res: Option<i64>,
        #[serde(default)]
        unread_count: Option<u32>,
    },
    Progress {
        #[serde(default)]
        title: String,
        #[serde(default)]
        progress_info: String,
    },
}

/// A decoded inbox entry
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: NotificationKind,
}

impl Notification {
    /// Heading shown in the list and detail dialog
    pub fn headline(&self) -> &str {
        match &self.kind {
            NotificationKind::Message { sender_name, .. } => sender_name,
            NotificationKind::Progress { title, .. } => title,
        }
    }

    /// Body text shown under the heading
    pub fn body(&self) -> &str {
        match &self.kind {
            NotificationKind::Message { message, .. } => message,
            NotificationKind::Progress { progress_info, .. } => progress_info,
        }
    }

    pub fn unread_count(&self) -> u32 {
        match &self.kind {
            NotificationKind::Message { unread_count, .. } => unread_count.unwrap_or(0),
            NotificationKind::Progress { .. } => 0,
        }
    }
}

/// Decode one document; unknown or malformed documents yield `None`
pub fn decode_document(doc: &Document) -> Option<Notification> {
    match serde_json::from_value::<NotificationKind>(doc.fields.clone()) {
        Ok(kind) => Some(Notification {
            id: doc.id.clone(),
            timestamp: doc.fields.get("timestamp").and_then(parse_timestamp),
            kind,
        }),
        Err(e) => {
            tracing::warn!("Skipping notification document {}: {}", doc.id, e);
            None
        }
    }
}

/// Decode a full snapshot, preserving its order
pub fn decode_snapshot(docs: &[Document]) -> Vec<Notification> {
    docs.iter().filter_map(decode_document).collect()
}

/// Total unread messages across a snapshot
pub fn unread_total(notifications: &[Notification]) -> u32 {
    notifications.iter().map(Notification::unread_count).sum()
}

/// Fields written when a user sends a message to a trainer
pub fn new_message_document(
    sender_name: &str,
    message: &str,
    avatar_res: Option<i64>,
    now: DateTime<Utc>,
) -> Value {
    json!({
        "senderName": sender_name,
        "message": message,
        "avatarRes": avatar_res,
        "unreadCount": 1,
        "type": "message",
        "timestamp": now.timestamp_millis(),
    })
}

/// Timestamps are either epoch milliseconds or RFC 3339 strings
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

/// Remote document collection contract
pub trait DocumentCollection {
    /// Add a document, returning its generated id
    fn create(&self, fields: Value) -> Result<String>;

    /// Delete one document; absent ids are not an error
    fn delete(&self, id: &str) -> Result<bool>;

    /// Delete every document whose `field` equals `value`
    fn delete_where(&self, field: &str, value: &Value) -> Result<usize>;

    /// Live result set ordered by `order_by`
    ///
    /// Documents lacking the field are excluded. Every change delivers the
    /// full ordered set.
    fn subscribe_ordered(&self, order_by: &str, descending: bool) -> Result<Subscription<Document>>;
}

/// Live inbox: notifications newest first
pub fn subscribe_inbox(collection: &dyn DocumentCollection) -> Result<Subscription<Document>> {
    collection.subscribe_ordered("timestamp", true)
}

struct OrderedView {
    field: String,
    descending: bool,
    publisher: Publisher<Document>,
}

#[derive(Default)]
struct CollectionState {
    docs: Vec<Document>,
    views: Vec<OrderedView>,
}

/// In-process document collection
#[derive(Default)]
pub struct MemoryCollection {
    state: Mutex<CollectionState>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(state: &mut CollectionState) {
        let CollectionState { docs, views } = state;
        for view in views.iter() {
            let snapshot = ordered(docs, &view.field, view.descending);
            view.publisher.publish(&snapshot);
        }
        views.retain(|view| view.publisher.subscriber_count() > 0);
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn ordered(docs: &[Document], field: &str, descending: bool) -> Vec<Document> {
    let mut result: Vec<Document> = docs
        .iter()
        .filter(|doc| doc.fields.get(field).is_some_and(|v| !v.is_null()))
        .cloned()
        .collect();

    // Stable sort keeps insertion order among equal keys
    result.sort_by(|a, b| {
        let ordering = compare_values(&a.fields[field], &b.fields[field]);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    result
}

impl DocumentCollection for MemoryCollection {
    fn create(&self, fields: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut state = self.lock();
        state.docs.push(Document {
            id: id.clone(),
            fields,
        });
        Self::notify(&mut state);
        tracing::debug!("Created document {}", id);
        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.lock();
        let before = state.docs.len();
        state.docs.retain(|doc| doc.id != id);
        let removed = state.docs.len() != before;
        if removed {
            Self::notify(&mut state);
        }
        Ok(removed)
    }

    fn delete_where(&self, field: &str, value: &Value) -> Result<usize> {
        let mut state = self.lock();
        let before = state.docs.len();
        state.docs.retain(|doc| doc.fields.get(field) != Some(value));
        let removed = before - state.docs.len();
        if removed > 0 {
            Self::notify(&mut state);
        }
        tracing::debug!("Deleted {} documents where {} = {}", removed, field, value);
        Ok(removed)
    }

    fn subscribe_ordered(&self, order_by: &str, descending: bool) -> Result<Subscription<Document>> {
        let mut state = self.lock();
        let initial = ordered(&state.docs, order_by, descending);

        let existing = state
            .views
            .iter()
            .position(|view| view.field == order_by && view.descending == descending);
        let index = match existing {
            Some(index) => index,
            None => {
                state.views.push(OrderedView {
                    field: order_by.to_string(),
                    descending,
                    publisher: Publisher::new(),
                });
                state.views.len() - 1
            }
        };

        Ok(state.views[index].publisher.subscribe(initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: id.into(),
            fields,
        }
    }

    #[test]
    fn test_decode_message() {
        let n = decode_document(&doc(
            "a",
            json!({
                "type": "message",
                "senderName": "Coach Anna",
                "message": "Great session!",
                "avatarRes": 7,
                "unreadCount": 2,
                "timestamp": 1_718_000_000_000_i64,
            }),
        ))
        .unwrap();

        assert_eq!(n.headline(), "Coach Anna");
        assert_eq!(n.body(), "Great session!");
        assert_eq!(n.unread_count(), 2);
        assert_eq!(n.timestamp.unwrap().timestamp_millis(), 1_718_000_000_000);
        assert!(matches!(
            n.kind,
            NotificationKind::Message { avatar_res: Some(7), .. }
        ));
    }

    #[test]
    fn test_decode_progress_with_missing_fields() {
        let n = decode_document(&doc("p", json!({ "type": "progress", "title": "Week 3" }))).unwrap();
        assert_eq!(
            n.kind,
            NotificationKind::Progress {
                title: "Week 3".into(),
                progress_info: String::new(),
            }
        );
        assert_eq!(n.unread_count(), 0);
        assert!(n.timestamp.is_none());
    }

    #[test]
    fn test_unknown_and_untyped_documents_are_skipped() {
        let docs = vec![
            doc("1", json!({ "type": "promo", "title": "Sale" })),
            doc("2", json!({ "title": "No type" })),
            doc("3", json!({ "type": "progress", "title": "Kept" })),
        ];
        let decoded = decode_snapshot(&docs);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, "3");
    }

    #[test]
    fn test_rfc3339_timestamp() {
        let n = decode_document(&doc(
            "t",
            json!({ "type": "progress", "timestamp": "2025-03-10T08:00:00Z" }),
        ))
        .unwrap();
        assert_eq!(n.timestamp.unwrap().to_rfc3339(), "2025-03-10T08:00:00+00:00");
    }

    #[test]
    fn test_new_message_document_decodes() {
        let now = Utc::now();
        let fields = new_message_document("Coach Ben", "See you Monday", None, now);
        let n = decode_document(&doc("m", fields)).unwrap();
        assert_eq!(n.headline(), "Coach Ben");
        assert_eq!(n.unread_count(), 1);
        assert_eq!(n.timestamp.unwrap().timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_inbox_subscription_newest_first() {
        let collection = MemoryCollection::new();
        let now = Utc::now();

        let sub = subscribe_inbox(&collection).unwrap();
        assert_eq!(sub.try_recv(), Some(vec![]));

        collection
            .create(new_message_document("Old", "first", None, now - Duration::minutes(5)))
            .unwrap();
        collection
            .create(new_message_document("New", "second", None, now))
            .unwrap();
        // Excluded from the ordered view: no timestamp
        collection
            .create(json!({ "type": "progress", "title": "untimed" }))
            .unwrap();

        let snapshot = sub.latest().unwrap();
        let inbox = decode_snapshot(&snapshot);
        let names: Vec<_> = inbox.iter().map(|n| n.headline().to_string()).collect();
        assert_eq!(names, vec!["New", "Old"]);
        assert_eq!(unread_total(&inbox), 2);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_delete_by_id_and_query() {
        let collection = MemoryCollection::new();
        let now = Utc::now();
        let a = collection.create(new_message_document("A", "x", None, now)).unwrap();
        collection.create(new_message_document("B", "y", None, now)).unwrap();
        collection.create(new_message_document("B", "z", None, now)).unwrap();

        let sub = subscribe_inbox(&collection).unwrap();
        assert_eq!(sub.try_recv().map(|s| s.len()), Some(3));

        assert!(collection.delete(&a).unwrap());
        assert!(!collection.delete(&a).unwrap());
        assert_eq!(sub.try_recv().map(|s| s.len()), Some(2));

        let removed = collection.delete_where("senderName", &json!("B")).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(sub.try_recv(), Some(vec![]));
        assert!(collection.is_empty());
    }
}
