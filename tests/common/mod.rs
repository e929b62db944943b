#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use liceum::modules::auth::AuthService;
use liceum::modules::events::repository::BLOCK_WINDOW_MESSAGE;
use liceum::modules::events::{EventRepository, EventService};
use liceum::router::init_router;
use liceum::state::AppState;
use liceum::utils::email::Mailer;
use liceum_auth::{Clock, ManualClock};
use liceum_config::{AuthCodeConfig, CorsConfig, JwtConfig};
use liceum_core::StorageError;
use liceum_models::{Event, EventBlock, JoinedEventRow, NewBlockDto, UpdateBlockDto, UpdateEventDto};

pub const ADMIN_EMAIL: &str = "head@school.org";
pub const TEST_SECRET: &str = "integration-test-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records messages instead of sending them; can be told to fail.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl MockMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// The code from the most recent message to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .iter()
            .rev()
            .find(|email| email.to == to)
            .and_then(|email| extract_code(&email.body))
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("smtp relay unavailable");
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn extract_code(body: &str) -> Option<String> {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 6)
        .map(str::to_string)
}

/// Event storage held in memory, with the same not-found and cleanup rules
/// as the database provider.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: Mutex<Vec<Event>>,
    next_event_id: AtomicUsize,
    next_block_id: AtomicUsize,
    clean_calls: AtomicUsize,
    failing_cleanup: AtomicBool,
}

impl InMemoryEventRepository {
    pub fn clean_calls(&self) -> usize {
        self.clean_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing_cleanup(&self, failing: bool) {
        self.failing_cleanup.store(failing, Ordering::SeqCst);
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn next_event_id(&self) -> i32 {
        (self.next_event_id.fetch_add(1, Ordering::SeqCst) + 1) as i32
    }

    fn next_block_id(&self) -> i32 {
        (self.next_block_id.fetch_add(1, Ordering::SeqCst) + 1) as i32
    }

    fn to_block(&self, event_id: i32, dto: &NewBlockDto) -> EventBlock {
        EventBlock {
            id: self.next_block_id(),
            event_id,
            name: dto.name.clone(),
            description: dto.description.clone(),
            start_date: dto.start_date,
            end_date: dto.end_date,
            link: dto.link.clone(),
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create_event(
        &self,
        name: &str,
        description: &str,
        blocks: &[NewBlockDto],
    ) -> Result<i32, StorageError> {
        let id = self.next_event_id();
        let blocks = blocks.iter().map(|b| self.to_block(id, b)).collect();
        self.events.lock().unwrap().push(Event {
            id,
            name: name.to_string(),
            description: description.to_string(),
            blocks,
        });
        Ok(id)
    }

    async fn create_blocks(&self, event_id: i32, blocks: &[NewBlockDto]) -> Result<(), StorageError> {
        let new_blocks: Vec<EventBlock> = blocks.iter().map(|b| self.to_block(event_id, b)).collect();
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(StorageError::NotFound("event"))?;
        event.blocks.extend(new_blocks);
        Ok(())
    }

    async fn delete_event(&self, event_id: i32) -> Result<(), StorageError> {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(StorageError::NotFound("event"));
        }
        Ok(())
    }

    async fn delete_block(&self, block_id: i32) -> Result<(), StorageError> {
        let mut events = self.events.lock().unwrap();
        for event in events.iter_mut() {
            if let Some(pos) = event.blocks.iter().position(|b| b.id == block_id) {
                event.blocks.remove(pos);
                return Ok(());
            }
        }
        Err(StorageError::NotFound("block"))
    }

    async fn edit_event(&self, event_id: i32, dto: &UpdateEventDto) -> Result<(), StorageError> {
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(StorageError::NotFound("event"))?;
        event.name = dto.name.clone();
        event.description = dto.description.clone();
        Ok(())
    }

    async fn edit_block(&self, block_id: i32, dto: &UpdateBlockDto) -> Result<(), StorageError> {
        let mut events = self.events.lock().unwrap();
        let block = events
            .iter_mut()
            .flat_map(|e| e.blocks.iter_mut())
            .find(|b| b.id == block_id)
            .ok_or(StorageError::NotFound("block"))?;
        let start_date = dto.start_date.unwrap_or(block.start_date);
        let end_date = dto.end_date.unwrap_or(block.end_date);
        if end_date < start_date {
            return Err(StorageError::Invalid(BLOCK_WINDOW_MESSAGE));
        }
        block.name = dto.name.clone();
        block.description = dto.description.clone();
        block.link = dto.link.clone();
        block.start_date = start_date;
        block.end_date = end_date;
        Ok(())
    }

    async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StorageError> {
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|e| e.blocks.iter().any(|b| b.start_date <= now && b.end_date >= now))
            .map(|e| Event {
                blocks: vec![],
                ..e.clone()
            })
            .collect())
    }

    async fn list_all_joined(&self) -> Result<Vec<JoinedEventRow>, StorageError> {
        let events = self.events.lock().unwrap();
        let mut rows = Vec::new();
        for event in events.iter() {
            let base = JoinedEventRow {
                event_id: event.id,
                event_name: event.name.clone(),
                event_description: event.description.clone(),
                ..Default::default()
            };
            if event.blocks.is_empty() {
                rows.push(base);
                continue;
            }
            for block in &event.blocks {
                rows.push(JoinedEventRow {
                    block_id: Some(block.id),
                    block_name: Some(block.name.clone()),
                    block_description: Some(block.description.clone()),
                    block_start_date: Some(block.start_date),
                    block_end_date: Some(block.end_date),
                    block_link: Some(block.link.clone()),
                    ..base.clone()
                });
            }
        }
        Ok(rows)
    }

    async fn get_event(&self, event_id: i32) -> Result<Event, StorageError> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or(StorageError::NotFound("event"))
    }

    async fn get_block(&self, block_id: i32) -> Result<EventBlock, StorageError> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .flat_map(|e| e.blocks.iter())
            .find(|b| b.id == block_id)
            .cloned()
            .ok_or(StorageError::NotFound("block"))
    }

    async fn clean_events(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        self.clean_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_cleanup.load(Ordering::SeqCst) {
            return Err(StorageError::Backend(anyhow::anyhow!("connection reset")));
        }
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.blocks.is_empty() || e.blocks.iter().any(|b| b.end_date >= now));
        Ok((before - events.len()) as u64)
    }
}

pub struct TestApp {
    pub router: Router,
    pub auth: Arc<AuthService>,
    pub events: Arc<EventService>,
    pub mailer: Arc<MockMailer>,
    pub repo: Arc<InMemoryEventRepository>,
    pub clock: ManualClock,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        ..JwtConfig::default()
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(AuthCodeConfig::with_admins([ADMIN_EMAIL]), 20)
}

pub fn setup_test_app_with(auth_config: AuthCodeConfig, cleanup_every: u64) -> TestApp {
    let clock = ManualClock::starting_now();
    let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let mailer = Arc::new(MockMailer::default());
    let repo = Arc::new(InMemoryEventRepository::default());

    let auth = Arc::new(AuthService::from_config(
        auth_config,
        &jwt_config(),
        mailer.clone(),
        shared_clock.clone(),
    ));
    let events = Arc::new(EventService::new(repo.clone(), shared_clock, cleanup_every));

    let state = AppState::new(auth.clone(), events.clone(), CorsConfig::default());

    TestApp {
        router: init_router(state),
        auth,
        events,
        mailer,
        repo,
        clock,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Signs in `ADMIN_EMAIL` through the service and returns its access token.
pub async fn admin_access_token(app: &TestApp) -> String {
    app.auth.send_auth_code(ADMIN_EMAIL).await.unwrap();
    let code = app.mailer.last_code_for(ADMIN_EMAIL).unwrap();
    app.auth.verify_code(ADMIN_EMAIL, &code).await.unwrap().access
}

/// Waits for background cleanups to reach `expected` calls.
pub async fn wait_for_clean_calls(repo: &InMemoryEventRepository, expected: usize) {
    for _ in 0..100 {
        if repo.clean_calls() >= expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
