//! Message entity - one row per pinned Discord message.
//!
//! The table lives in the remote D1 database; the entity only exists so the
//! `CREATE TABLE` and `INSERT` statements are generated from a single
//! definition. Every column except the key is stored as text, timestamps
//! included.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pinned message row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "MESSAGE")]
pub struct Model {
    /// Row id assigned by the database
    #[sea_orm(primary_key, column_name = "ID")]
    pub id: i64,
    /// Discord message id (snowflake, as text)
    #[sea_orm(column_name = "MessageID", column_type = "Text")]
    pub message_id: String,
    /// Message body at the time it was pinned
    #[sea_orm(column_name = "MessageContent", column_type = "Text")]
    pub message_content: String,
    /// Attachment URLs joined by `,`
    #[sea_orm(column_name = "Attachments", column_type = "Text")]
    pub attachments: String,
    /// Discord user id of the message author
    #[sea_orm(column_name = "AuthorID", column_type = "Text")]
    pub author_id: String,
    /// When the message was posted on Discord
    #[sea_orm(column_name = "MessageCreatedAT", column_type = "Text")]
    pub message_created_at: String,
    #[sea_orm(column_name = "CreatedAT", column_type = "Text")]
    pub created_at: String,
    #[sea_orm(column_name = "UpdatedAT", column_type = "Text")]
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
