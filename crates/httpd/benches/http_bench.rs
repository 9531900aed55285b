use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use futures::executor::block_on;
use micro_httpd::codec::{Body, ChunkedDecoder, RequestDecoder};
use micro_httpd::connection::HttpConnection;
use micro_httpd::handler::Handler;
use micro_httpd::protocol::{Request, ResponseSink};
use std::{
    io,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};

// Mock IO for testing
#[derive(Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

// Test handler
struct HelloWorld;

#[async_trait::async_trait]
impl Handler for HelloWorld {
    async fn serve(&self, sink: &mut ResponseSink<'_>, request: &mut Request<'_>) {
        let _ = request.body_mut().discard().await;
        let _ = sink.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\n\r\nHello World!").await;
    }
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET /index.html?name=alice HTTP/1.1\r\nHost: localhost\r\nUser-Agent: curl/7.79.1\r\nAccept: */*\r\nCookie: uuid=123456; HOME=1\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let decoder = RequestDecoder::default();
            let output = Mutex::new(Vec::<u8>::new());
            let mut reader = BufReader::new(&request[..]);
            let request = block_on(decoder.decode(&mut reader, &output, "127.0.0.1:1")).unwrap();
            black_box(request.is_some());
        });
    });
}

fn bench_chunked_decoder(c: &mut Criterion) {
    let mut wire = Vec::new();
    for _ in 0..64 {
        wire.extend_from_slice(b"400\r\n");
        wire.extend(std::iter::repeat_n(b'x', 0x400));
        wire.extend_from_slice(b"\r\n");
    }
    wire.extend_from_slice(b"0\r\n\r\n");

    c.bench_function("decode_chunked_body", |b| {
        b.iter(|| {
            let mut reader = BufReader::new(&wire[..]);
            let mut body = Body::from(ChunkedDecoder::new(&mut reader));
            let mut content = Vec::with_capacity(64 * 0x400);
            block_on(body.read_to_end(&mut content)).unwrap();
            black_box(content.len());
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let request = b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let handler = Arc::new(HelloWorld);

    c.bench_function("process_simple_request", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(request.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            black_box(block_on(connection.process(handler.clone())).unwrap());
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_chunked_decoder, bench_http_connection);
criterion_main!(benches);
