//! Route handlers for the REST API.

pub mod agent;
pub mod clients;
pub mod company;
pub mod followups;
pub mod health;
pub mod knowledge;
pub mod playground;
pub mod users;

use axum::routing::{get, post, put};
use axum::Router;

use crate::realtime::ws_handler;
use crate::state::AppState;

/// Build the router with all routes. REST endpoints live under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes())
        // Dashboard realtime channel
        .route("/ws", get(ws_handler))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Companies
        .route("/company", get(company::list_companies))
        .route("/company/create", post(company::create_company))
        .route("/company/org/:org_id", get(company::get_company_by_org))
        .route(
            "/company/:company_id",
            get(company::get_company).put(company::update_company),
        )
        // Clients
        .route(
            "/company/:company_id/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/company/:company_id/clients/:client_id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        // Followups
        .route(
            "/company/:company_id/followups",
            get(followups::list_followups).post(followups::create_followup),
        )
        .route(
            "/company/:company_id/followups/:followup_id",
            get(followups::get_followup)
                .put(followups::update_followup)
                .delete(followups::delete_followup),
        )
        .route(
            "/company/:company_id/followups/:followup_id/start-conversation",
            post(followups::start_conversation),
        )
        .route(
            "/company/:company_id/followups/:followup_id/restart-conversation",
            post(followups::restart_conversation),
        )
        .route(
            "/company/:company_id/followups/:followup_id/complete-conversation",
            post(followups::complete_conversation),
        )
        .route(
            "/company/:company_id/followups/:followup_id/messages",
            get(followups::list_messages).post(followups::send_message),
        )
        .route(
            "/company/:company_id/followups/:followup_id/messages/read",
            put(followups::mark_read),
        )
        // Knowledge
        .route(
            "/company/:company_id/knowledge",
            get(knowledge::list_knowledge).post(knowledge::create_knowledge),
        )
        .route(
            "/company/:company_id/knowledge/:knowledge_id",
            get(knowledge::get_knowledge)
                .put(knowledge::update_knowledge)
                .delete(knowledge::delete_knowledge),
        )
        // Users
        .route(
            "/company/:company_id/users",
            get(users::list_users).post(users::create_user),
        )
        // Playground
        .route("/playground/chat", post(playground::chat))
        .route("/playground/agents", get(playground::list_agents))
        // Agents
        .route("/agent", get(agent::list_agents).post(agent::create_agent))
        .route(
            "/agent/:agent_id",
            get(agent::get_agent)
                .put(agent::update_agent)
                .delete(agent::delete_agent),
        )
}
