//! Shared world for user directory behaviour tests.
//!
//! The world owns a current-thread Tokio runtime plus a `LocalSet` because
//! Actix test services are not `Send`. Each request builds a fresh app over
//! the same in-memory state and session key, so records persist across
//! steps.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use actix_web::test::{self, TestRequest};
use actix_web::web;
use async_trait::async_trait;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;

use user_directory::domain::ports::{NotificationError, NotificationSink};
use user_directory::domain::{
    ConditionalUpdateCoordinator, TokenSigner, UserCreatedEvent, UserRecordService,
};
use user_directory::inbound::http::health::HealthState;
use user_directory::inbound::http::state::HttpState;
use user_directory::outbound::memory::InMemoryUserStore;
use user_directory::server::{AppDependencies, build_app};

/// A captured HTTP response.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) body: Value,
}

impl Reply {
    pub(crate) fn token(&self) -> Option<String> {
        self.body
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    pub(crate) fn error_code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }
}

/// Notification sink recording delivered emails, optionally failing.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    delivered: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingSink {
    pub(crate) fn failing() -> Self {
        Self {
            delivered: Arc::default(),
            fail: true,
        }
    }

    pub(crate) fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish_user_created(
        &self,
        event: &UserCreatedEvent,
    ) -> Result<(), NotificationError> {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(event.email.to_string());
        }
        if self.fail {
            Err(NotificationError::transport("connection refused"))
        } else {
            Ok(())
        }
    }
}

pub(crate) struct DirectoryWorld {
    runtime: Runtime,
    local: LocalSet,
    key: Key,
    sink: RefCell<RecordingSink>,
    state: RefCell<Option<web::Data<HttpState>>>,
    pub(crate) fetched_token: RefCell<Option<String>>,
    pub(crate) reread_token: RefCell<Option<String>>,
    pub(crate) last: RefCell<Option<Reply>>,
    pub(crate) concurrent: RefCell<Vec<Reply>>,
}

impl DirectoryWorld {
    pub(crate) fn new() -> Self {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        Self {
            runtime,
            local: LocalSet::new(),
            key: Key::generate(),
            sink: RefCell::new(RecordingSink::default()),
            state: RefCell::new(None),
            fetched_token: RefCell::new(None),
            reread_token: RefCell::new(None),
            last: RefCell::new(None),
            concurrent: RefCell::new(Vec::new()),
        }
    }

    /// Replace the notification sink; must run before the first request.
    pub(crate) fn use_sink(&self, sink: RecordingSink) {
        assert!(self.state.borrow().is_none(), "sink must be set before requests");
        *self.sink.borrow_mut() = sink;
    }

    pub(crate) fn sink(&self) -> RecordingSink {
        self.sink.borrow().clone()
    }

    fn deps(&self) -> AppDependencies {
        let http_state = self
            .state
            .borrow_mut()
            .get_or_insert_with(|| {
                let records = UserRecordService::new(
                    Arc::new(InMemoryUserStore::new()),
                    Arc::new(self.sink.borrow().clone()),
                );
                let signer = Arc::new(TokenSigner::derive_from(b"behaviour test secret"));
                let directory = ConditionalUpdateCoordinator::new(records.clone(), signer);
                web::Data::new(HttpState::new(Arc::new(directory), Arc::new(records)))
            })
            .clone();
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state,
            key: self.key.clone(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Send one request and record it as the latest reply.
    pub(crate) fn send(&self, request: TestRequest) -> Reply {
        let deps = self.deps();
        let reply = self.local.block_on(&self.runtime, async move {
            let app = test::init_service(build_app(deps)).await;
            let res = test::call_service(&app, request.to_request()).await;
            read_reply(res).await
        });
        *self.last.borrow_mut() = Some(reply.clone());
        reply
    }

    /// Send two requests concurrently against the same app.
    pub(crate) fn send_pair(&self, first: TestRequest, second: TestRequest) -> (Reply, Reply) {
        let deps = self.deps();
        self.local.block_on(&self.runtime, async move {
            let app = test::init_service(build_app(deps)).await;
            let (a, b) = futures_util::future::join(
                test::call_service(&app, first.to_request()),
                test::call_service(&app, second.to_request()),
            )
            .await;
            (read_reply(a).await, read_reply(b).await)
        })
    }

    /// Drive spawned notification tasks until `done` holds or a second
    /// passes.
    pub(crate) fn settle(&self, done: impl Fn() -> bool) {
        self.local.block_on(&self.runtime, async {
            for _ in 0..100 {
                if done() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
    }

    pub(crate) fn last(&self) -> Reply {
        self.last.borrow().clone().expect("a request was sent")
    }
}

async fn read_reply(res: actix_web::dev::ServiceResponse) -> Reply {
    let status = res.status().as_u16();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply { status, body }
}

// Steps shared by every directory feature.

#[rstest_bdd_macros::then("the response status is {status}")]
fn the_response_status_is(world: &DirectoryWorld, status: u16) {
    let reply = world.last();
    assert_eq!(reply.status, status, "unexpected reply: {:?}", reply.body);
}

#[rstest_bdd_macros::then("the error code is {code}")]
fn the_error_code_is(world: &DirectoryWorld, code: String) {
    assert_eq!(world.last().error_code(), Some(code.as_str()));
}
