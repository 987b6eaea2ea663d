#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use brain_core::{Brain, ContextWindow};
use database::{
    agent, client, company, Agent, Client, Company, Database, NewAgent, NewClient, NewCompany,
};
use followup_engine::{CreateFollowup, EngineConfig, FollowupEngine, RecordingNotifier};
use mock_brain::ScriptedBrain;
use relay_bridge::{channels, MemoryBus, Relay, SendMessage};

pub struct Harness {
    pub engine: Arc<FollowupEngine>,
    pub db: Database,
    pub bus: Arc<MemoryBus>,
    pub notifier: Arc<RecordingNotifier>,
    pub company: Company,
    pub client: Client,
    pub agent: Agent,
}

pub struct HarnessBuilder {
    brain: Arc<dyn Brain>,
    config: EngineConfig,
}

impl HarnessBuilder {
    pub fn brain(mut self, brain: Arc<dyn Brain>) -> Self {
        self.brain = brain;
        self
    }

    pub fn context_window(mut self, max_turns: usize) -> Self {
        self.config.context_window = ContextWindow::sliding(max_turns);
        self
    }

    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.config.reply_timeout = timeout;
        self
    }

    pub async fn build(self) -> Harness {
        let db = Database::in_memory().await.unwrap();
        let bus = Arc::new(MemoryBus::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let engine = Arc::new(FollowupEngine::new(
            db.clone(),
            self.brain,
            Relay::new(bus.clone()),
            notifier.clone(),
            self.config,
        ));

        let company = company::create_company(
            db.pool(),
            &NewCompany {
                name: "Acme Staffing".to_string(),
                location: "Lisbon".to_string(),
                external_org_id: "org_acme".to_string(),
            },
        )
        .await
        .unwrap();

        let client = client::create_client(
            db.pool(),
            &NewClient {
                company_id: company.id.clone(),
                name: "Amir".to_string(),
                phone: "5550100".to_string(),
                country_code: "+1".to_string(),
                status: "active".to_string(),
            },
        )
        .await
        .unwrap();

        let agent = agent::create_agent(
            db.pool(),
            &NewAgent {
                name: "Shift Confirmer".to_string(),
                system_prompt: "You are a polite assistant. Goal: {context}".to_string(),
                description: None,
                created_by: None,
            },
        )
        .await
        .unwrap();

        Harness {
            engine,
            db,
            bus,
            notifier,
            company,
            client,
            agent,
        }
    }
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        brain: Arc::new(ScriptedBrain::new()),
        config: EngineConfig::default(),
    }
}

impl Harness {
    pub fn request(&self, auto_mode: bool) -> CreateFollowup {
        CreateFollowup {
            client_id: self.client.id.clone(),
            agent_id: self.agent.id.clone(),
            followup_datetime: "2025-06-26T11:24:00Z".to_string(),
            context: "confirm tomorrow's shift".to_string(),
            is_auto_mode: auto_mode,
        }
    }

    pub async fn followup(&self, auto_mode: bool) -> database::Followup {
        self.engine
            .create_followup(&self.company.id, self.request(auto_mode))
            .await
            .unwrap()
    }

    /// Send commands published so far.
    pub fn sent(&self) -> Vec<SendMessage> {
        self.bus
            .published_on(channels::SEND_MESSAGE)
            .into_iter()
            .map(|m| serde_json::from_str(&m.payload).unwrap())
            .collect()
    }
}

pub fn chat_payload(from: &str, body: &str) -> String {
    serde_json::json!({
        "type": "chat",
        "body": body,
        "fromMe": false,
        "from": from,
    })
    .to_string()
}
