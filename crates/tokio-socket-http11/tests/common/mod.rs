//! テスト用のモックサーバー

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 受信したリクエスト
#[derive(Debug, Clone)]
pub struct Received {
    /// 何本目の接続か
    pub connection: usize,
    /// リクエスト全体 (ヘッダーとボディ)
    pub text: String,
}

impl Received {
    /// リクエスト行
    pub fn request_line(&self) -> &str {
        self.text.split("\r\n").next().unwrap_or("")
    }

    /// ヘッダー値 (大文字小文字を区別しない)
    pub fn header(&self, name: &str) -> Option<String> {
        let head = self.text.split("\r\n\r\n").next().unwrap_or("");
        head.split("\r\n").skip(1).find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }

    /// ボディ
    pub fn body(&self) -> &str {
        self.text.split_once("\r\n\r\n").map_or("", |(_, b)| b)
    }
}

/// サーバーの応答
pub enum Reply {
    /// バイト列を書いて接続を維持する
    Send(Vec<u8>),
    /// バイト列を書いて接続を閉じる
    SendAndClose(Vec<u8>),
    /// 指定バイトずつ間を空けて書いて接続を閉じる
    Fragmented(Vec<u8>, usize),
    /// 何も返さない
    Hang,
}

pub type Log = Arc<Mutex<Vec<Received>>>;

/// モックサーバーを起動してポートと受信ログを返す
///
/// `handler` には 0 から数えたリクエスト番号とリクエストが渡される。
pub async fn start<F>(handler: F) -> (u16, Log)
where
    F: Fn(usize, &Received) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);
    let connections = Arc::new(AtomicUsize::new(0));

    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let connection = connections.fetch_add(1, Ordering::SeqCst);
            let handler = handler.clone();
            let log = server_log.clone();
            tokio::spawn(async move {
                serve_connection(socket, connection, handler, log).await;
            });
        }
    });
    (port, log)
}

async fn serve_connection<F>(mut socket: TcpStream, connection: usize, handler: Arc<F>, log: Log)
where
    F: Fn(usize, &Received) -> Reply + Send + Sync + 'static,
{
    loop {
        let Some(text) = read_request(&mut socket).await else {
            return;
        };
        let received = Received { connection, text };
        let index = {
            let mut log = log.lock().unwrap();
            log.push(received.clone());
            log.len() - 1
        };
        match handler(index, &received) {
            Reply::Send(bytes) => {
                if socket.write_all(&bytes).await.is_err() {
                    return;
                }
            }
            Reply::SendAndClose(bytes) => {
                let _ = socket.write_all(&bytes).await;
                let _ = socket.shutdown().await;
                return;
            }
            Reply::Fragmented(bytes, size) => {
                for piece in bytes.chunks(size) {
                    if socket.write_all(piece).await.is_err() {
                        return;
                    }
                    let _ = socket.flush().await;
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                let _ = socket.shutdown().await;
                return;
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return;
            }
        }
    }
}

/// リクエストを 1 つ読む (Content-Length 分のボディを含む)
async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let content_length = head
                .split("\r\n")
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            let total = pos + 4 + content_length;
            while buf.len() < total {
                let n = socket.read(&mut tmp).await.ok()?;
                if n == 0 {
                    return None;
                }
                buf.extend_from_slice(&tmp[..n]);
            }
            return Some(String::from_utf8_lossy(&buf[..total]).to_string());
        }
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
}

/// Content-Length 付きのレスポンス
pub fn response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
    let mut out = out.into_bytes();
    out.extend_from_slice(body);
    out
}

/// 受信ログのスナップショット
pub fn received(log: &Log) -> Vec<Received> {
    log.lock().unwrap().clone()
}
