use std::{collections::BTreeMap, net::Ipv6Addr, time::Duration};

use axum::{routing::get, Router};
use hrpc::{BoxError, Context, Error, ErrorCode, Manager, Payload, Reply, Request};
use serde::Deserialize;
use tracing::info;

#[derive(Default, Deserialize)]
struct GetUser {
    id: String,
}

hrpc::input!(GetUser);

// $ curl -X POST -d '{"id":"123"}' http://localhost:3000/user.get
// {"user_id":"123","user_name":"User 123"}
async fn get_user(
    _: Context,
    Payload(req): Payload<GetUser>,
) -> Result<Reply<BTreeMap<&'static str, String>>, BoxError> {
    Ok(Reply(BTreeMap::from([
        ("user_id", req.id.clone()),
        ("user_name", format!("User {}", req.id)),
    ])))
}

// $ echo "test data" | curl -X POST -d "@-" http://localhost:3000/upload
async fn upload(req: Request) -> Result<(), Error> {
    let data = std::str::from_utf8(req.body())
        .map_err(|err| Error::with_cause(ErrorCode::BadRequest, "upload must be utf-8", err))?;
    info!("upload data: {data}");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let manager = Manager::new(hrpc::json::config());

    let app = Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .route(
            "/user.get",
            hrpc_axum::Endpoint::builder(manager.handler(get_user).unwrap())
                .with_timeout(Duration::from_secs(10))
                .build(),
        )
        .route(
            "/upload",
            hrpc_axum::Endpoint::builder(manager.handler(upload).unwrap())
                .with_body_limit(1024 * 1024)
                .build(),
        );

    info!("Listening on http://[::1]:3000");
    let listener = tokio::net::TcpListener::bind((Ipv6Addr::UNSPECIFIED, 3000))
        .await
        .unwrap();
    axum::serve(listener, app).await.unwrap();
}
