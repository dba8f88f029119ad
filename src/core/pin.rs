//! Pin handling - record a Discord message in D1, mirror it to the log
//! channel, then acknowledge the interaction.
//!
//! Kept free of poise types so the flow can be exercised with fakes; the bot
//! layer adapts a poise context to [`PinSurface`].

use crate::cloudflare::{CloudflareApi, StatementRequest};
use crate::core::statement;
use crate::entities::{Message, message};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, DbBackend, EntityTrait, QueryTrait};
use tracing::{info, instrument};

/// Fixed-width layout used for every timestamp written to the message table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// The parts of a Discord message that get recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMessage {
    /// Discord message snowflake
    pub message_id: String,
    /// Author's user snowflake
    pub author_id: String,
    /// Author's display name, used in the log channel copy
    pub author_name: String,
    /// Message text
    pub content: String,
    /// URLs of the message's attachments
    pub attachment_urls: Vec<String>,
    /// When the message was posted
    pub created_at: DateTime<Utc>,
}

impl PinnedMessage {
    /// Attachment URLs as stored in the `Attachments` column.
    #[must_use]
    pub fn attachment_list(&self) -> String {
        self.attachment_urls.join(",")
    }

    /// Text mirrored to the log channel.
    #[must_use]
    pub fn log_entry(&self) -> String {
        truncate_for_discord(&format!(
            "from:{}\n{}\n{}",
            self.author_name,
            self.content,
            self.attachment_urls.join("\n")
        ))
    }

    /// Reply sent to the user who invoked the command.
    #[must_use]
    pub fn acknowledgement(&self) -> String {
        truncate_for_discord(&format!("Pinned: {}", self.content))
    }
}

/// Cuts `text` to [`DISCORD_MESSAGE_LIMIT`] characters, marking the cut with `…`.
#[must_use]
pub fn truncate_for_discord(text: &str) -> String {
    if text.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(DISCORD_MESSAGE_LIMIT - 1).collect();
    cut.push('…');
    cut
}

/// Builds the parameterized INSERT for `message`, stamped with `now`.
///
/// # Errors
/// Fails only if sea-orm produces a non-text parameter.
pub fn insert_statement(message: &PinnedMessage, now: DateTime<Utc>) -> Result<StatementRequest> {
    let now = now.format(TIMESTAMP_FORMAT).to_string();
    let row = message::ActiveModel {
        message_id: Set(message.message_id.clone()),
        message_content: Set(message.content.clone()),
        attachments: Set(message.attachment_list()),
        author_id: Set(message.author_id.clone()),
        message_created_at: Set(message.created_at.format(TIMESTAMP_FORMAT).to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    StatementRequest::try_from(Message::insert(row).build(DbBackend::Sqlite))
}

/// Inserts one row for `message` into the message table.
///
/// # Errors
/// Returns [`Error::Record`] wrapping the statement failure. The message is
/// not durably recorded in that case.
#[instrument(skip(api, message), fields(message_id = %message.message_id))]
pub async fn record_pin<A>(
    api: &A,
    database_id: &str,
    message: &PinnedMessage,
    now: DateTime<Utc>,
) -> Result<()>
where
    A: CloudflareApi + ?Sized,
{
    let wrap = |source: Error| Error::Record {
        message_id: message.message_id.clone(),
        source: Box::new(source),
    };
    let statement = insert_statement(message, now).map_err(wrap)?;
    statement::execute(api, database_id, &statement)
        .await
        .map_err(wrap)
}

/// The chat-side operations a pin needs.
#[async_trait]
pub trait PinSurface: Send + Sync {
    /// Posts `content` to the configured log channel.
    async fn send_log(&self, content: &str) -> Result<()>;

    /// Replies to the interaction that triggered the pin.
    async fn acknowledge(&self, content: &str) -> Result<()>;
}

/// Records `message`, then mirrors it to the log channel, then acknowledges.
///
/// Nothing is sent to chat unless the row was recorded, so a success reply
/// always means the pin is stored.
#[instrument(skip_all, fields(message_id = %message.message_id, author = %message.author_id))]
pub async fn handle_pin<A, S>(
    api: &A,
    surface: &S,
    database_id: &str,
    message: &PinnedMessage,
) -> Result<()>
where
    A: CloudflareApi + ?Sized,
    S: PinSurface + ?Sized,
{
    record_pin(api, database_id, message, Utc::now()).await?;
    surface.send_log(&message.log_entry()).await?;
    surface.acknowledge(&message.acknowledgement()).await?;
    info!("Message pinned");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{
        ApiCall, FakeCloudflareApi, RecordingSurface, SurfaceEvent, failed, pinned_message,
    };
    use chrono::{NaiveDateTime, TimeZone};

    fn at(text: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).unwrap())
    }

    #[test]
    fn test_insert_statement_is_parameterized() {
        let mut message = pinned_message();
        message.content = "it's'); DROP TABLE MESSAGE; --".to_string();
        message.attachment_urls = vec![
            "https://cdn.example.test/a.png".to_string(),
            "https://cdn.example.test/b.png".to_string(),
        ];

        let statement = insert_statement(&message, at("2024-06-01 12:30:00")).unwrap();

        assert!(statement.sql.starts_with("INSERT INTO \"MESSAGE\""));
        assert!(!statement.sql.contains("DROP TABLE"));
        assert_eq!(
            statement.params,
            vec![
                "555".to_string(),
                "it's'); DROP TABLE MESSAGE; --".to_string(),
                "https://cdn.example.test/a.png,https://cdn.example.test/b.png".to_string(),
                "42".to_string(),
                "2024-01-01 00:00:00".to_string(),
                "2024-06-01 12:30:00".to_string(),
                "2024-06-01 12:30:00".to_string(),
            ]
        );
    }

    #[test]
    fn test_insert_statement_omits_generated_key() {
        let statement = insert_statement(&pinned_message(), Utc::now()).unwrap();
        assert!(!statement.sql.contains("\"ID\","));
        assert_eq!(statement.params.len(), 7);
        assert_eq!(statement.sql.matches('?').count(), 7);
    }

    #[tokio::test]
    async fn test_record_failure_is_wrapped() {
        let api = FakeCloudflareApi::default();
        api.push_query(failed(7500, "no such table: MESSAGE"));

        let err = record_pin(&api, "abc-123", &pinned_message(), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Record { ref message_id, .. } if message_id == "555"));
    }

    #[tokio::test]
    async fn test_pin_records_then_logs_then_acknowledges() {
        let api = FakeCloudflareApi::default();
        let surface = RecordingSurface::default();
        let before = Utc::now();

        handle_pin(&api, &surface, "abc-123", &pinned_message())
            .await
            .unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        let ApiCall::Query {
            database_id,
            statement,
        } = &calls[0]
        else {
            panic!("expected a query, got {calls:?}");
        };
        assert_eq!(database_id, "abc-123");
        assert!(statement.sql.starts_with("INSERT"));
        assert_eq!(&statement.params[..5], &[
            "555".to_string(),
            "hello".to_string(),
            String::new(),
            "42".to_string(),
            "2024-01-01 00:00:00".to_string(),
        ]);
        for stamp in &statement.params[5..] {
            let stamp = at(stamp);
            assert!(stamp >= before - chrono::Duration::seconds(1));
            assert!(stamp <= Utc::now());
        }

        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::Log("from:tester\nhello\n".to_string()),
                SurfaceEvent::Acknowledge("Pinned: hello".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_record_failure_sends_nothing_to_chat() {
        let api = FakeCloudflareApi::default();
        api.push_query(failed(7500, "boom"));
        let surface = RecordingSurface::default();

        let err = handle_pin(&api, &surface, "abc-123", &pinned_message())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Record { .. }));
        assert!(surface.events().is_empty());
    }

    #[tokio::test]
    async fn test_log_failure_skips_acknowledgement() {
        let api = FakeCloudflareApi::default();
        let surface = RecordingSurface::failing_log();

        assert!(
            handle_pin(&api, &surface, "abc-123", &pinned_message())
                .await
                .is_err()
        );
        assert!(surface.events().is_empty());
    }

    #[test]
    fn test_truncate_for_discord() {
        assert_eq!(truncate_for_discord("short"), "short");
        let long = "あ".repeat(DISCORD_MESSAGE_LIMIT + 10);
        let cut = truncate_for_discord(&long);
        assert_eq!(cut.chars().count(), DISCORD_MESSAGE_LIMIT);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_log_entry_lists_attachments_on_lines() {
        let mut message = pinned_message();
        message.attachment_urls = vec!["u1".to_string(), "u2".to_string()];
        assert_eq!(message.log_entry(), "from:tester\nhello\nu1\nu2");
        assert_eq!(message.attachment_list(), "u1,u2");
    }
}
