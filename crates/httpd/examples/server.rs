//! Echoes back what the server parsed out of each request.
//!
//! ```text
//! cargo run -p micro-httpd --example server
//! curl -v -b 'foo1=bar1; foo2=bar2' 'http://127.0.0.1:10086/echo?name=alice&token=abc' -d 'hello'
//! ```

use std::fmt::Write as _;

use async_trait::async_trait;
use micro_httpd::handler::Handler;
use micro_httpd::protocol::{Request, ResponseSink};
use micro_httpd::server::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn serve(&self, sink: &mut ResponseSink<'_>, request: &mut Request<'_>) {
        let mut body = String::new();
        if let Err(e) = request.body_mut().read_to_string(&mut body).await {
            error!(cause = %e, "can't read request body");
            let _ = sink.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n").await;
            return;
        }
        info!(path = request.path(), body_len = body.len(), "receiving request");

        let mut content = String::new();
        let _ = writeln!(content, "[query]name={}", request.query("name"));
        let _ = writeln!(content, "[query]token={}", request.query("token"));
        let _ = writeln!(content, "[cookie]foo1={}", request.cookie("foo1"));
        let _ = writeln!(content, "[cookie]foo2={}", request.cookie("foo2"));
        let _ = writeln!(content, "[header]User-Agent={}", request.headers().get("User-Agent"));
        let _ = writeln!(content, "[header]Proto={}", request.proto());
        let _ = writeln!(content, "[header]Method={}", request.method());
        let _ = writeln!(content, "[addr]Addr={}", request.remote_addr());
        let _ = writeln!(content, "[body]{body}");

        let response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{content}", content.len());
        if let Err(e) = sink.write_all(response.as_bytes()).await {
            error!(cause = %e, "can't write response");
        }
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = match Server::builder().address("127.0.0.1:10086").handler(EchoHandler).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server configuration");
            return;
        }
    };

    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped");
    }
}
