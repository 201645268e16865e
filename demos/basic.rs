//! arbor example — routes, parameters, groups and middleware.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:9999/
//!   curl 'http://localhost:9999/hello?name=kunder'
//!   curl http://localhost:9999/hello/kunder
//!   curl http://localhost:9999/assets/css/site.css
//!   curl -X POST http://localhost:9999/login -d 'username=kunder&password=114514'
//!   curl http://localhost:9999/v2/hello/kunder       # 500 from the v2 middleware
//!   curl http://localhost:9999/panic                 # 500 from recovery

use std::time::Instant;

use arbor::{Context, Engine, Server, ServerConfig, StatusCode, logging};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), arbor::Error> {
    let config = ServerConfig::from_env();
    logging::init(&config.log_filter);

    let mut app = Engine::with_defaults();

    app.get("/", |c: &mut Context| c.html(StatusCode::OK, "<h1>Hello There</h1>"));

    // GET /hello?name=kunder
    app.get("/hello", |c: &mut Context| {
        let body = format!("hello {}, you are at {}\n", c.query("name"), c.path());
        c.string(StatusCode::OK, body);
    });

    app.get("/hello/:name", hello);

    // /assets/css/site.css → {"filepath":"css/site.css"}
    app.get("/assets/*filepath", |c: &mut Context| {
        let body = json!({ "filepath": c.param("filepath") });
        c.json(StatusCode::OK, &body);
    });

    app.post("/login", login);

    app.get("/panic", |c: &mut Context| {
        let names = ["kunder"];
        let idx = c.query("i").parse::<usize>().unwrap_or(100);
        c.string(StatusCode::OK, names[idx]);
    });

    let mut v2 = app.group("/v2");
    v2.use_middleware(only_for_v2);
    v2.get("/hello/:name", hello);
    v2.post("/login", login);

    Server::from_config(&config)?.serve(app).await
}

fn hello(c: &mut Context) {
    let body = format!("hello {}, you're at {}\n", c.param("name"), c.path());
    c.string(StatusCode::OK, body);
}

fn login(c: &mut Context) {
    let body = json!({
        "username": c.post_form("username"),
        "password": c.post_form("password"),
    });
    c.json(StatusCode::OK, &body);
}

// Fails every request under /v2 without calling next(), so the route
// handler never runs.
fn only_for_v2(c: &mut Context) {
    let start = Instant::now();
    c.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    info!(status = c.status_code().as_u16(), path = c.path(), latency = ?start.elapsed(), "group v2");
}
