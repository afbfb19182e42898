use satchel::middleware::envelope::Envelope;
use satchel::{ControllerError, Method, Request, Router, Server};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn get_user(_req: Request) -> Result<Value, ControllerError> {
    Ok(json!({"id": 1}))
}

#[tokio::test]
async fn serves_enveloped_request_then_shuts_down_on_signal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .controller(Method::Get, "/users/{id}", get_user)
        .wrap(Envelope::new(tracing::Dispatch::none()));

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(Server::serve_on(listener, app, async {
        let _ = stopped.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /users/1 HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "{raw}");
    let (_, body) = raw.split_once("\r\n\r\n").unwrap();
    let v: Value = serde_json::from_str(body).unwrap();
    assert_eq!(v["status"], "OK");
    assert_eq!(v["data"], json!({"id": 1}));

    stop.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server did not stop after the signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn bind_failure_is_reported_not_panicked() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap().to_string();

    let err = Server::bind(&addr)
        .serve_with_shutdown(Router::new(), std::future::ready(()))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("io: "), "{err}");
}
