//! Audit vocabulary shared by the services and the audit sink clients.
//!
//! This module lives in `core` (zero internal deps) so both the API layer and
//! the `events` crate can speak the same record format.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities and actions
// ---------------------------------------------------------------------------

/// Kind of record an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntity {
    User,
    Book,
}

/// What happened to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Register,
    Login,
    Create,
    Update,
    Get,
    Delete,
}

impl AuditEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEntity::User => "USER",
            AuditEntity::Book => "BOOK",
        }
    }
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Register => "REGISTER",
            AuditAction::Login => "LOGIN",
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Get => "GET",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Log record
// ---------------------------------------------------------------------------

/// A single audit record as delivered to the audit sink.
///
/// `entity_id` is `0` for operations that do not target a single row
/// (e.g. listing all books).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogItem {
    pub entity: AuditEntity,
    pub action: AuditAction,
    pub entity_id: DbId,
    pub timestamp: Timestamp,
}

impl LogItem {
    /// Build a record stamped with the current time.
    pub fn now(entity: AuditEntity, action: AuditAction, entity_id: DbId) -> Self {
        Self {
            entity,
            action,
            entity_id,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
