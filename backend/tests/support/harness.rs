//! Live-server world for behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix spawns the server with `spawn_local`. Dropping the fixture stops the
//! server even if a step panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;

use actix_web::dev::ServerHandle;
use actix_web::{HttpServer, web};
use agriscope_backend::domain::TRACE_ID_HEADER;
use agriscope_backend::inbound::http::health::HealthState;
use reqwest::{Client, Method};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use super::app::{PortDoubles, test_app};

pub(crate) struct ApiWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    pub(crate) doubles: PortDoubles,
    pub(crate) health: web::Data<HealthState>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
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
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

async fn spawn_server(
    doubles: &PortDoubles,
    health: web::Data<HealthState>,
) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let http_state = web::Data::new(doubles.http_state());

    let server = HttpServer::new(move || test_app(http_state.clone(), health.clone()))
        .disable_signals()
        .workers(1)
        .listen(listener)
        .map_err(|err| err.to_string())?
        .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

/// Start a server over fresh doubles; readiness starts unset.
pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let doubles = PortDoubles::default();
    let health = web::Data::new(HealthState::new());

    let (base_url, server) = local
        .block_on(&runtime, spawn_server(&doubles, health.clone()))
        .expect("server should start");

    WorldFixture {
        world: Rc::new(RefCell::new(ApiWorld {
            runtime,
            local,
            base_url,
            server,
            doubles,
            health,
            last_status: None,
            last_body: None,
            last_trace_id: None,
        })),
    }
}

/// Send a request and store status, trace id, and JSON body in the world.
pub(crate) fn send(world: &SharedWorld, method: Method, path: &str, body: Option<Value>) {
    let (status, trace_id, body) = {
        let ctx = world.borrow();
        let url = format!("{}{path}", ctx.base_url);
        ctx.local.block_on(&ctx.runtime, async move {
            let mut request = Client::new().request(method, url);
            if let Some(body) = body {
                request = request.json(&body);
            } else {
                request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
            }
            let response = request.send().await.expect("request should complete");
            let status = response.status().as_u16();
            let trace_id = response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let bytes = response.bytes().await.expect("response body");
            (status, trace_id, serde_json::from_slice(&bytes).ok())
        })
    };

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_trace_id = trace_id;
    ctx.last_body = body;
}
