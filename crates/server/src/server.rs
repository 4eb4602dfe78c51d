use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{balance, categories, entries, ledger, reports};
use engine::Engine;

static ACTOR_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-actor-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Authenticated actor of the request, stamped on every record it writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor(pub String);

/// `TypedHeader` for the actor reference.
///
/// Authentication happens upstream; requests must carry the resulting actor
/// id in the "x-actor-id" header.
#[derive(Debug)]
struct ActorHeader(String);

impl Header for ActorHeader {
    fn name() -> &'static axum::http::HeaderName {
        &ACTOR_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(ActorHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-actor-id header"),
        }
    }
}

async fn actor(
    actor_header: Option<TypedHeader<ActorHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(ActorHeader(actor))) = actor_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(Actor(actor));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/domains/{domain}/balance", get(balance::get))
        .route("/domains/{domain}/funds/in", post(entries::fund_in))
        .route("/domains/{domain}/funds/out", post(entries::fund_out))
        .route("/domains/{domain}/expenses", post(entries::expense_new))
        .route("/domains/{domain}/income", post(entries::income_new))
        .route("/domains/{domain}/ledger", post(ledger::ledger))
        .route("/domains/{domain}/transactions", post(ledger::list))
        .route("/domains/{domain}/reports/monthly", get(reports::monthly))
        .route("/domains/{domain}/reports/categories", get(reports::categories))
        .route("/domains/{domain}/reports/trend", get(reports::trend))
        .route("/domains/{domain}/reports/daily", get(reports::daily))
        .route(
            "/domains/{domain}/reports/balance-sheet",
            get(reports::balance_sheet),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/{id}/active", post(categories::set_active))
        .route_layer(middleware::from_fn(actor))
        .with_state(state)
}

/// The complete HTTP application around `engine`.
pub fn app(engine: Arc<Engine>) -> Router {
    router(ServerState { engine })
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
