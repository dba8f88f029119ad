//! Entity module - sea-orm definitions for the remote D1 tables.

pub mod message;

pub use message::{Column as MessageColumn, Entity as Message, Model as MessageModel};
