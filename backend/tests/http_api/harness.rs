//! Live server harness and shared world for the HTTP API behaviour suite.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The `WorldFixture` stops the server
//! even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use rstest::fixture;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use geodata::Trace;
use geodata::inbound::http::configure_api;
use geodata::inbound::http::cors::Cors;
use geodata::inbound::http::json::{DEFAULT_MAX_BODY_BYTES, json_config};
use geodata::test_support::{InMemoryHarness, MutableClock};

pub(crate) const ALLOWED_ORIGIN: &str = "https://maps.example.com";

pub(crate) struct ApiWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) clock: Arc<MutableClock>,
    pub(crate) tokens: HashMap<String, String>,
    pub(crate) shape_id: Option<i64>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) last_headers: HashMap<String, String>,
}

pub(crate) type SharedWorld = Rc<RefCell<ApiWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(&self.world);
    }
}

fn shutdown(world: &SharedWorld) {
    // The LocalSet must be driven on its owning thread, so the world stays
    // borrowed for the duration of `block_on`.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

/// Run `operation` against the live server's base URL.
pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

fn spawn_api_server(harness: &InMemoryHarness) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_data = web::Data::new(harness.state.clone());
    let cors = Cors::new(ALLOWED_ORIGIN).map_err(|err| err.to_string())?;

    let server = HttpServer::new(move || {
        let sessions = http_data.sessions.clone();
        App::new()
            .app_data(http_data.clone())
            .app_data(json_config(DEFAULT_MAX_BODY_BYTES))
            .wrap(Trace)
            .wrap(cors.clone())
            .configure(configure_api(sessions))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let harness = InMemoryHarness::new();

    let (base_url, server) = local
        .block_on(&runtime, async { spawn_api_server(&harness) })
        .expect("server should start");

    let world = Rc::new(RefCell::new(ApiWorld {
        runtime,
        local,
        base_url,
        server,
        clock: harness.clock.clone(),
        tokens: HashMap::new(),
        shape_id: None,
        last_status: None,
        last_body: None,
        last_trace_id: None,
        last_headers: HashMap::new(),
    }));

    WorldFixture { world }
}
