//! Live lists over Server-Sent Events
//!
//! Database triggers publish `<table>` or `<table>:<group id>` on the
//! `petloc_changes` channel. One listener task forwards those into a
//! broadcast hub; every open stream re-runs its query when a matching change
//! arrives and sends the whole list again. Handlers also publish after their
//! own writes, so a process without the listener still updates its streams.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use sqlx::{PgPool, postgres::PgListener};
use std::{convert::Infallible, future::Future, time::Duration};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const CHANNEL: &str = "petloc_changes";
const HUB_CAPACITY: usize = 256;

/// Tables that publish changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Pets,
    Missing,
    Products,
    Blog,
    ChatGroups,
    ChatMembers,
    Messages,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Pets => "pets",
            Table::Missing => "desaparecidos",
            Table::Products => "produtos_loja",
            Table::Blog => "blog_posts",
            Table::ChatGroups => "chat_grupos",
            Table::ChatMembers => "chat_grupos_membros",
            Table::Messages => "mensagens",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "pets" => Table::Pets,
            "desaparecidos" => Table::Missing,
            "produtos_loja" => Table::Products,
            "blog_posts" => Table::Blog,
            "chat_grupos" => Table::ChatGroups,
            "chat_grupos_membros" => Table::ChatMembers,
            "mensagens" => Table::Messages,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub table: Table,
    pub group_id: Option<Uuid>,
}

impl Change {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            group_id: None,
        }
    }

    pub fn group(table: Table, group_id: Uuid) -> Self {
        Self {
            table,
            group_id: Some(group_id),
        }
    }

    /// Parse a notification payload; unknown tables are ignored
    pub fn parse(payload: &str) -> Option<Self> {
        match payload.split_once(':') {
            Some((table, group)) => Some(Self::group(
                Table::from_name(table)?,
                Uuid::parse_str(group).ok()?,
            )),
            None => Table::from_name(payload).map(Self::table),
        }
    }

    /// Collection-wide match
    pub fn touches(&self, table: Table) -> bool {
        self.table == table
    }

    /// Anything shown on the group list, membership included
    pub fn touches_group_list(&self) -> bool {
        matches!(self.table, Table::ChatGroups | Table::ChatMembers)
    }

    /// Match a group-scoped table for one group
    pub fn touches_group(&self, table: Table, group_id: Uuid) -> bool {
        self.table == table && self.group_id == Some(group_id)
    }
}

/// In-process fan-out of change notifications
#[derive(Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<Change>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, change: Change) {
        // No open streams is not an error
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Forward database notifications into the hub until the process exits
pub fn spawn_listener(pool: PgPool, hub: ChangeHub) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut listener = match PgListener::connect_with(&pool).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Change listener could not connect: {}", e);
                return;
            }
        };

        if let Err(e) = listener.listen(CHANNEL).await {
            error!("Change listener could not LISTEN on {}: {}", CHANNEL, e);
            return;
        }

        info!("Listening for changes on {}", CHANNEL);

        loop {
            match listener.recv().await {
                Ok(notification) => match Change::parse(notification.payload()) {
                    Some(change) => hub.publish(change),
                    None => debug!("Ignoring change payload {:?}", notification.payload()),
                },
                Err(e) => {
                    // recv reconnects on the next call
                    warn!("Change listener error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    })
}

/// What a live stream emits
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent<T> {
    Snapshot(T),
    Error(String),
}

enum Phase {
    Initial,
    Waiting,
    Done,
}

/// Full snapshots: one now, then one after each matching change
///
/// Subscribes before the first query so no change is missed. A lagged
/// receiver just produces a fresh snapshot. A failed query yields one
/// `Error` and ends the stream.
pub fn snapshots<T, M, L, Fut>(
    hub: &ChangeHub,
    matches: M,
    load: L,
) -> impl Stream<Item = LiveEvent<T>> + Send + use<T, M, L, Fut>
where
    T: Send + 'static,
    M: Fn(&Change) -> bool + Send + 'static,
    L: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let receiver = hub.subscribe();

    stream::unfold(
        (receiver, Phase::Initial, matches, load),
        |(mut receiver, phase, matches, load)| async move {
            match phase {
                Phase::Done => return None,
                Phase::Initial => {}
                Phase::Waiting => loop {
                    match receiver.recv().await {
                        Ok(change) if matches(&change) => break,
                        Ok(_) => continue,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("Live stream lagged by {} changes, resending", skipped);
                            break;
                        }
                        Err(RecvError::Closed) => return None,
                    }
                },
            }

            let (event, next) = match load().await {
                Ok(items) => (LiveEvent::Snapshot(items), Phase::Waiting),
                Err(e) => {
                    error!("Live query failed: {}", e);
                    (LiveEvent::Error(e.to_string()), Phase::Done)
                }
            };

            Some((event, (receiver, next, matches, load)))
        },
    )
}

fn to_sse<T: Serialize>(event: LiveEvent<T>) -> Event {
    match event {
        LiveEvent::Snapshot(items) => match Event::default().event("snapshot").json_data(&items) {
            Ok(event) => event,
            Err(e) => Event::default().event("error").data(e.to_string()),
        },
        LiveEvent::Error(message) => Event::default().event("error").data(message),
    }
}

/// SSE response over [`snapshots`]; dropping the connection drops the subscription
pub fn sse_snapshots<T, M, L, Fut>(
    hub: &ChangeHub,
    matches: M,
    load: L,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<T, M, L, Fut>>
where
    T: Serialize + Send + 'static,
    M: Fn(&Change) -> bool + Send + 'static,
    L: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let events = snapshots(hub, matches, load).map(|event| Ok(to_sse(event)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tokio::time::timeout;

    #[test]
    fn test_parse_payloads() {
        assert_eq!(Change::parse("pets"), Some(Change::table(Table::Pets)));

        let group = Uuid::new_v4();
        assert_eq!(
            Change::parse(&format!("mensagens:{}", group)),
            Some(Change::group(Table::Messages, group))
        );

        assert_eq!(Change::parse("accounts"), None);
        assert_eq!(Change::parse("users"), None);
        assert_eq!(Change::parse("mensagens:not-a-uuid"), None);
    }

    #[test]
    fn test_group_matching() {
        let group = Uuid::new_v4();
        let change = Change::group(Table::Messages, group);

        assert!(change.touches_group(Table::Messages, group));
        assert!(!change.touches_group(Table::Messages, Uuid::new_v4()));
        assert!(!change.touches_group(Table::ChatMembers, group));
    }

    #[test]
    fn test_membership_changes_touch_group_list() {
        let group = Uuid::new_v4();

        assert!(Change::table(Table::ChatGroups).touches_group_list());
        assert!(Change::parse(&format!("chat_grupos_membros:{}", group))
            .unwrap()
            .touches_group_list());
        assert!(!Change::group(Table::Messages, group).touches_group_list());
        assert!(!Change::table(Table::Pets).touches_group_list());
    }

    fn counting_loader(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn() -> futures::future::Ready<anyhow::Result<usize>> + Send + 'static {
        move || futures::future::ready(Ok(counter.fetch_add(1, Ordering::SeqCst)))
    }

    #[tokio::test]
    async fn test_snapshot_then_refresh_on_matching_change() {
        let hub = ChangeHub::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let stream = snapshots(&hub, |c| c.touches(Table::Pets), counting_loader(counter));
        tokio::pin!(stream);

        assert_eq!(stream.next().await, Some(LiveEvent::Snapshot(0)));

        hub.publish(Change::table(Table::Products));
        hub.publish(Change::table(Table::Pets));
        assert_eq!(stream.next().await, Some(LiveEvent::Snapshot(1)));

        hub.publish(Change::table(Table::Blog));
        assert!(
            timeout(Duration::from_millis(50), stream.next())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_query_error_ends_stream() {
        let hub = ChangeHub::new();
        let stream = snapshots(
            &hub,
            |_| true,
            || async { Err::<Vec<u8>, _>(anyhow::anyhow!("relation does not exist")) },
        );
        tokio::pin!(stream);

        assert_eq!(
            stream.next().await,
            Some(LiveEvent::Error("relation does not exist".to_string()))
        );
        hub.publish(Change::table(Table::Pets));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let hub = ChangeHub::new();
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let stream = snapshots(&hub, |_| true, counting_loader(counter));
            assert_eq!(hub.subscriber_count(), 1);
            drop(stream);
        }
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_gets_fresh_snapshot() {
        let hub = ChangeHub::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let stream = snapshots(&hub, |c| c.touches(Table::Pets), counting_loader(counter));
        tokio::pin!(stream);

        assert_eq!(stream.next().await, Some(LiveEvent::Snapshot(0)));

        // Overflow with non-matching changes; the lag itself triggers a reload
        for _ in 0..(HUB_CAPACITY + 10) {
            hub.publish(Change::table(Table::Blog));
        }
        assert_eq!(stream.next().await, Some(LiveEvent::Snapshot(1)));
    }
}
