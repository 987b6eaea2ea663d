//! Followup state machine: create, start, restart, complete.

use chrono::{DateTime, NaiveDateTime};
use database::validation::validate_required;
use database::{
    agent, client, company, followup, followup_message, Followup, FollowupMessage,
    FollowupStatus, FollowupUpdate, NewFollowup,
};
use tracing::info;

use crate::engine::FollowupEngine;
use crate::error::{EngineError, Result};
use crate::prompt::{greeting, render_system_prompt};

/// Request to schedule a followup for a company.
#[derive(Debug, Clone, Default)]
pub struct CreateFollowup {
    pub client_id: String,
    pub agent_id: String,
    pub followup_datetime: String,
    pub context: String,
    pub is_auto_mode: bool,
}

/// Accept RFC 3339 or a local `YYYY-MM-DDTHH:MM[:SS]` timestamp.
fn validate_datetime(value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EngineError::Validation("followupDateTime is required".to_string()));
    }

    let parsed = DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok();

    if !parsed {
        return Err(EngineError::Validation(format!(
            "followupDateTime '{}' is not a valid date",
            value
        )));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> Result<()> {
    validate_required(field, value, usize::MAX)
        .map_err(|e| EngineError::Validation(e.to_string()))
}

impl FollowupEngine {
    /// Create a pending followup and its system turn.
    ///
    /// The client must belong to `company_id`.
    pub async fn create_followup(
        &self,
        company_id: &str,
        request: CreateFollowup,
    ) -> Result<Followup> {
        required("clientId", &request.client_id)?;
        required("agentId", &request.agent_id)?;
        required("context", &request.context)?;
        required("companyId", company_id)?;
        validate_datetime(&request.followup_datetime)?;

        let pool = self.db.pool();

        company::get_company(pool, company_id).await?;
        let owner = client::get_client(pool, &request.client_id).await?;
        if owner.company_id != company_id {
            return Err(EngineError::NotFound {
                entity: "Client",
                id: request.client_id,
            });
        }
        let agent = agent::get_agent(pool, &request.agent_id).await?;

        let created = followup::create_with_system_turn(
            pool,
            &NewFollowup {
                client_id: request.client_id,
                company_id: company_id.to_string(),
                agent_id: request.agent_id,
                followup_datetime: request.followup_datetime.trim().to_string(),
                context: request.context,
                is_auto_mode: request.is_auto_mode,
            },
            |created| render_system_prompt(&agent, created),
        )
        .await?;

        info!(followup_id = %created.id, "Created followup for client {}", created.client_id);
        Ok(created)
    }

    /// Edit a followup's client, agent, schedule, context or auto mode.
    /// The status is never touched here.
    pub async fn update_followup(
        &self,
        company_id: &str,
        followup_id: &str,
        update: FollowupUpdate,
    ) -> Result<Followup> {
        if let Some(datetime) = &update.followup_datetime {
            validate_datetime(datetime)?;
        }

        let _guard = self.locks.lock(followup_id).await;
        let pool = self.db.pool();
        self.followup_for_company(company_id, followup_id).await?;

        if let Some(client_id) = &update.client_id {
            let owner = client::get_client(pool, client_id).await?;
            if owner.company_id != company_id {
                return Err(EngineError::NotFound {
                    entity: "Client",
                    id: client_id.clone(),
                });
            }
        }
        if let Some(agent_id) = &update.agent_id {
            agent::get_agent(pool, agent_id).await?;
        }

        Ok(followup::update_followup(pool, followup_id, &update).await?)
    }

    /// Delete a followup with its transcript.
    pub async fn delete_followup(&self, company_id: &str, followup_id: &str) -> Result<()> {
        let _guard = self.locks.lock(followup_id).await;
        self.followup_for_company(company_id, followup_id).await?;
        followup::delete_followup(self.db.pool(), followup_id).await?;
        info!(followup_id = %followup_id, "Deleted followup");
        Ok(())
    }

    /// Start a followup: move it to `in_progress` and greet the client.
    ///
    /// Fails with `InvalidTransition` when the followup is already in
    /// progress.
    pub async fn start(&self, followup_id: &str) -> Result<Followup> {
        let _guard = self.locks.lock(followup_id).await;
        let pool = self.db.pool();

        let current = followup::get_followup(pool, followup_id).await?;
        if current.status == FollowupStatus::InProgress {
            return Err(EngineError::InvalidTransition {
                id: followup_id.to_string(),
                status: current.status,
                action: "start",
            });
        }
        let client = client::get_client(pool, &current.client_id).await?;

        let moved = followup::compare_and_set_status(
            pool,
            followup_id,
            &[FollowupStatus::Pending, FollowupStatus::Completed],
            FollowupStatus::InProgress,
        )
        .await?;
        if !moved {
            let latest = followup::get_followup(pool, followup_id).await?;
            return Err(EngineError::InvalidTransition {
                id: followup_id.to_string(),
                status: latest.status,
                action: "start",
            });
        }

        let started = followup::get_followup(pool, followup_id).await?;
        self.deliver_assistant(&started, &client, &greeting(&client.name))
            .await?;

        info!(followup_id = %followup_id, "Started followup");
        Ok(started)
    }

    /// Restart a followup from any state: drop the conversation, keep the
    /// system turn, move to `in_progress` and greet again.
    pub async fn restart(&self, followup_id: &str) -> Result<Followup> {
        let _guard = self.locks.lock(followup_id).await;
        let pool = self.db.pool();

        let current = followup::get_followup(pool, followup_id).await?;
        let client = client::get_client(pool, &current.client_id).await?;

        let removed = followup_message::delete_conversation_turns(pool, followup_id).await?;
        followup::set_status(pool, followup_id, FollowupStatus::InProgress).await?;

        let restarted = followup::get_followup(pool, followup_id).await?;
        self.deliver_assistant(&restarted, &client, &greeting(&client.name))
            .await?;

        info!(followup_id = %followup_id, "Restarted followup ({} turns removed)", removed);
        Ok(restarted)
    }

    /// Close an in-progress followup. Inbound messages are ignored afterwards.
    pub async fn complete(&self, followup_id: &str) -> Result<Followup> {
        let _guard = self.locks.lock(followup_id).await;
        let pool = self.db.pool();

        let moved = followup::compare_and_set_status(
            pool,
            followup_id,
            &[FollowupStatus::InProgress],
            FollowupStatus::Completed,
        )
        .await?;

        let latest = followup::get_followup(pool, followup_id).await?;
        if !moved {
            return Err(EngineError::InvalidTransition {
                id: followup_id.to_string(),
                status: latest.status,
                action: "complete",
            });
        }

        info!(followup_id = %followup_id, "Completed followup");
        Ok(latest)
    }

    /// Send a message written by an operator. The status is left alone.
    pub async fn send_operator_message(
        &self,
        company_id: &str,
        followup_id: &str,
        content: &str,
    ) -> Result<FollowupMessage> {
        required("message", content)?;

        let _guard = self.locks.lock(followup_id).await;
        let current = self.followup_for_company(company_id, followup_id).await?;
        let client = client::get_client(self.db.pool(), &current.client_id).await?;

        self.deliver_assistant(&current, &client, content).await
    }
}
