//! Core logic - framework-agnostic provisioning, statement execution and pin
//! handling. Everything here talks to Cloudflare through
//! [`crate::cloudflare::CloudflareApi`] and to Discord through
//! [`pin::PinSurface`].

/// Pin recording and the record → log → acknowledge flow
pub mod pin;
/// Idempotent startup provisioning of the D1 database and R2 bucket
pub mod provision;
/// Single-statement execution against D1
pub mod statement;
