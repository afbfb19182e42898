//! Minimal satchel example: enveloped user endpoints plus health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/1      # 200 {"status":"OK","data":{...}}
//!   curl -i http://localhost:3000/users/2      # 404 {"status":"ERROR","error":"NOT_FOUND",...}
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"bob"}'
//!   curl -i -X DELETE http://localhost:3000/users/1   # 200 {"status":"OK","data":{}}
//!   curl -i http://localhost:3000/boom         # 500 INTERNAL_SERVER_ERROR
//!   curl -i http://localhost:3000/healthz      # plain "ok", not enveloped

use anyhow::Context;
use satchel::middleware::{envelope::Envelope, trace::Trace};
use satchel::{ApplicationError, ControllerError, Method, Request, Router, Server, health};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct NewUser {
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = Router::new()
        .controller(Method::Get,    "/users/{id}", get_user)
        .controller(Method::Post,   "/users",      create_user)
        .controller(Method::Delete, "/users/{id}", delete_user)
        .controller(Method::Get,    "/boom",       boom)
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz",  health::readiness)
        .wrap(Envelope::default())
        .wrap(Trace);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

async fn get_user(req: Request) -> Result<User, ControllerError> {
    match req.param("id") {
        Some("1") => Ok(User { id: 1, name: "alice".to_owned() }),
        _ => Err(ApplicationError::not_found("user missing").into()),
    }
}

async fn create_user(req: Request) -> Result<User, ControllerError> {
    let input: NewUser = serde_json::from_slice(req.body())
        .map_err(|e| ApplicationError::bad_request(e.to_string()))?;
    Ok(User { id: 99, name: input.name })
}

async fn delete_user(_req: Request) -> Result<(), ControllerError> {
    Ok(())
}

async fn boom(_req: Request) -> Result<User, ControllerError> {
    let port: u16 = "not a port".parse().context("reading port from config")?;
    Ok(User { id: u64::from(port), name: String::new() })
}
