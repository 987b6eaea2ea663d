//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tenant, linked to an organisation at the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Organisation id at the identity provider (unique).
    pub external_org_id: String,
    /// Flipped only by relay session events.
    pub whatsapp_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to create a company.
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub location: String,
    pub external_org_id: String,
}

/// Short agent description embedded in company listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// A tenant's end customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub company_id: String,
    pub name: String,
    /// Local number without the country code.
    pub phone: String,
    /// Country code, usually with a leading `+` (e.g. "+1").
    pub country_code: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to create or replace a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub company_id: String,
    pub name: String,
    pub phone: String,
    pub country_code: String,
    pub status: String,
}

/// A reusable system prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    /// Unique display name.
    pub name: String,
    /// Prompt template; `{context}` is replaced with the followup context.
    pub system_prompt: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Identity-provider user id of the creator, if known.
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to create an agent.
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub name: String,
    pub system_prompt: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

/// Partial agent update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Lifecycle state of a followup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FollowupStatus {
    Pending,
    InProgress,
    Completed,
}

impl FollowupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowupStatus::Pending => "pending",
            FollowupStatus::InProgress => "in_progress",
            FollowupStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for FollowupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowupStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FollowupStatus::Pending),
            "in_progress" => Ok(FollowupStatus::InProgress),
            "completed" => Ok(FollowupStatus::Completed),
            other => Err(format!("unknown followup status: {}", other)),
        }
    }
}

/// A scheduled or ongoing conversation between one client and one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Followup {
    pub id: String,
    pub client_id: String,
    pub company_id: String,
    pub agent_id: String,
    /// Scheduled date/time as supplied by the caller (RFC 3339).
    pub followup_datetime: String,
    pub context: String,
    pub is_auto_mode: bool,
    pub status: FollowupStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to create a followup. New followups are always `pending`.
#[derive(Debug, Clone)]
pub struct NewFollowup {
    pub client_id: String,
    pub company_id: String,
    pub agent_id: String,
    pub followup_datetime: String,
    pub context: String,
    pub is_auto_mode: bool,
}

/// Editable followup fields. Status is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct FollowupUpdate {
    pub client_id: Option<String>,
    pub agent_id: Option<String>,
    pub followup_datetime: Option<String>,
    pub context: Option<String>,
    pub is_auto_mode: Option<bool>,
}

/// A followup joined with the names of its client and agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FollowupOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub followup: Followup,
    pub client_name: String,
    pub client_phone: String,
    pub client_country_code: String,
    /// `None` when the agent has since been deleted.
    pub agent_name: Option<String>,
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a followup transcript. Never updated after insert, except
/// for the read flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FollowupMessage {
    pub id: String,
    pub followup_id: String,
    pub client_id: String,
    /// Always "WHATSAPP".
    pub channel: String,
    /// Always "TEXT".
    pub content_type: String,
    pub role: MessageRole,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

/// Fields required to append a transcript entry.
#[derive(Debug, Clone)]
pub struct NewFollowupMessage {
    pub followup_id: String,
    pub client_id: String,
    pub role: MessageRole,
    pub content: String,
}

/// A knowledge-base entry owned by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Knowledge {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A dashboard user belonging to a company. Credentials live at the
/// identity provider only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub external_user_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub company_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub external_user_id: Option<String>,
}
