//! リクエストの駆動
//!
//! [`SocketRequest`] が 1 つのリクエスト記述子を最後まで処理する。
//! ホスト書き換え、接続、送信、受信、認証のやり直し、リダイレクトの追従と Cookie の引き継ぎを
//! 1 本のソケットずつ順に行う。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_socket_http11::{RequestDescriptor, SocketRequest};
//!
//! let request = SocketRequest::new(RequestDescriptor::get("http://example.com/"));
//! let abort = request.abort_handle();
//! let result = request.send().await?;
//! println!("{} {}", result.response.status, result.response.text());
//! ```

use std::future::Future;
use std::time::Instant as StdInstant;

use chrono::Utc;
use rand::RngCore;
use socket_http11::auth::ntlm::windows_timestamp;
use socket_http11::cookie::merge_cookie_header;
use socket_http11::{
    AuthDecision, AuthEngine, AuthEntropy, LoadResult, MAX_REDIRECTS, MessageBuilder,
    ParsedResponse, ParserLimits, ParserState, Payload, RedirectSet, RequestDescriptor,
    RequestStats, Response, ResponseParser, TargetForm, Url, host_rules, redirect,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::abort::AbortHandle;
use crate::connection::{Connection, ProxyTarget, TlsSettings};
use crate::error::{Error, Result};
use crate::observer::{ChannelObserver, LoadEvent, NoopObserver, RequestObserver};

const READ_BUFFER_SIZE: usize = 16 * 1024;

/// 1 リクエスト分のドライバー
///
/// 記述子は作成時に所有権ごと受け取るので、呼び出し側が後から変更しても影響しない。
#[derive(Debug)]
pub struct SocketRequest {
    descriptor: RequestDescriptor,
    abort: AbortHandle,
    limits: ParserLimits,
    max_redirects: usize,
}

impl SocketRequest {
    /// 新しいリクエストを作成
    pub fn new(descriptor: RequestDescriptor) -> Self {
        Self {
            descriptor,
            abort: AbortHandle::new(),
            limits: ParserLimits::default(),
            max_redirects: MAX_REDIRECTS,
        }
    }

    /// パーサーの制限を設定
    pub fn limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// リダイレクト回数の上限を設定
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// 記述子
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// 中断ハンドルを取得
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// リクエストを実行
    pub async fn send(self) -> Result<LoadResult> {
        self.send_with(&mut NoopObserver).await
    }

    /// オブザーバーに通知しながらリクエストを実行
    ///
    /// `load` と `error` はどちらか一方が 1 回だけ呼ばれる。
    pub async fn send_with(self, observer: &mut dyn RequestObserver) -> Result<LoadResult> {
        observer.load_start(&self.descriptor.url);
        let result = if self.abort.is_aborted() {
            Err(Error::Aborted)
        } else {
            let mut driver = Driver {
                request: &self,
                observer: &mut *observer,
                deadline: None,
                first_byte_seen: false,
            };
            driver.load().await
        };
        observer.load_end();
        match &result {
            Ok(result) => observer.load(result),
            Err(e) => {
                tracing::debug!(url = %self.descriptor.url, error = %e, code = e.code(), "request failed");
                observer.error(e);
            }
        }
        result
    }

    /// タスクとして実行し、イベントをチャネルで受け取る
    pub fn spawn(
        self,
    ) -> (
        AbortHandle,
        mpsc::UnboundedReceiver<LoadEvent>,
        JoinHandle<Result<LoadResult>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let abort = self.abort_handle();
        let handle = tokio::spawn(async move {
            let mut observer = ChannelObserver::new(tx);
            self.send_with(&mut observer).await
        });
        (abort, rx, handle)
    }
}

/// 記述子を 1 回実行する
pub async fn load(descriptor: RequestDescriptor) -> Result<LoadResult> {
    SocketRequest::new(descriptor).send().await
}

struct Driver<'a> {
    request: &'a SocketRequest,
    observer: &'a mut dyn RequestObserver,
    /// 最初の接続が確立した時点で決まる
    deadline: Option<Instant>,
    first_byte_seen: bool,
}

impl Driver<'_> {
    async fn load(&mut self) -> Result<LoadResult> {
        let request = self.request;
        let descriptor = &request.descriptor;
        let mut url = descriptor.parsed_url()?;
        let mut method = descriptor.method.clone();
        let mut payload = descriptor.payload.clone();
        let mut cookie = descriptor.headers.get("Cookie").map(str::to_string);
        let mut redirects = RedirectSet::new();

        loop {
            let response = self.hop(&url, &method, &payload, cookie.as_deref()).await?;

            if !descriptor.config.follow_redirects {
                return Ok(LoadResult {
                    response,
                    redirects,
                });
            }
            let Some(next) = redirect::decide(response.status, &method, response.location(), &url)?
            else {
                return Ok(LoadResult {
                    response,
                    redirects,
                });
            };
            if redirects.len() >= request.max_redirects {
                return Err(socket_http11::Error::TooManyRedirects {
                    limit: request.max_redirects,
                }
                .into());
            }

            let location = next.url.to_string();
            cookie = merge_cookie_header(cookie.as_deref(), &response.set_cookies(), Utc::now());
            // ループならオブザーバーに通知せずに失敗させる
            let recorded = redirects.record(&url.to_string(), response, &location)?;
            if !self.observer.before_redirect(recorded, &location) {
                return Err(Error::Aborted);
            }
            tracing::debug!(status = recorded.status, from = %url, to = %location, "following redirect");

            url = next.url;
            method = next.method;
            if next.drop_payload {
                payload = Payload::None;
            }
        }
    }

    /// 1 ホップ (認証のやり直しを含む)
    async fn hop(
        &mut self,
        url: &Url,
        method: &str,
        payload: &Payload,
        cookie: Option<&str>,
    ) -> Result<Response> {
        let request = self.request;
        let descriptor = &request.descriptor;
        let config = &descriptor.config;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        let target = host_rules::resolve(&config.hosts, url)?;
        let proxy = config
            .proxy
            .as_ref()
            .map(ProxyTarget::from_config)
            .transpose()?;
        let tls = target.is_secure().then(|| TlsSettings {
            validate_certificates: config.validate_certificates,
            client_certificate: descriptor.client_certificate.clone(),
        });
        let target_form = if proxy.is_some() && tls.is_none() {
            TargetForm::Absolute
        } else {
            TargetForm::Origin
        };
        let proxy_authorization = match (&proxy, target_form) {
            (Some(proxy), TargetForm::Absolute) => proxy.authorization.clone(),
            _ => None,
        };

        // 送信用のヘッダーは記述子の複製から作る
        let mut headers = descriptor.headers.clone();
        match cookie {
            Some(cookie) => headers.set("Cookie", cookie),
            None => headers.remove("Cookie"),
        }

        let request_target = url.request_target();
        let mut auth = descriptor.auth.clone().map(AuthEngine::new);
        let mut pending_authorization: Option<String> = None;
        let mut reusable: Option<Connection> = None;

        loop {
            let mut connection = match reusable.take() {
                Some(mut connection) => {
                    connection.pause();
                    connection
                }
                None => self.connect(&target, proxy.as_ref(), tls.as_ref()).await?,
            };
            let mut stats = connection.take_stats();

            let builder = MessageBuilder::new(method, url, &headers, payload).target_form(target_form);
            let body = builder.body();
            let authorization = pending_authorization.take().or_else(|| {
                auth.as_mut()
                    .and_then(|engine| engine.authorization(method, &request_target, &body))
            });
            let bytes = builder
                .header_opt("Authorization", authorization.as_deref())
                .header_opt("Proxy-Authorization", proxy_authorization.as_deref())
                .encode();

            tracing::debug!(%method, %url, connect_to = %target.authority(), "sending request");
            stats.send = Some(guard(&request.abort, self.deadline, connection.send(&bytes)).await?);
            let (parsed, keep_alive) = self.receive(&mut connection, method, &mut stats).await?;
            let response = Response::from_parsed(parsed, &url.to_string(), stats)?;

            if response.status == 401
                && let Some(engine) = auth.as_mut()
            {
                let entropy = auth_entropy();
                let decision = engine.on_challenge(
                    &response.www_authenticate(),
                    method,
                    &request_target,
                    &body,
                    &entropy,
                )?;
                if let AuthDecision::Retry(header) = decision {
                    tracing::debug!(method = ?engine.method(), keep_alive, "retrying with credentials");
                    pending_authorization = Some(header);
                    if keep_alive {
                        reusable = Some(connection);
                    } else {
                        connection.shutdown().await;
                    }
                    continue;
                }
            }
            return Ok(response);
        }
    }

    async fn connect(
        &mut self,
        target: &Url,
        proxy: Option<&ProxyTarget>,
        tls: Option<&TlsSettings>,
    ) -> Result<Connection> {
        let host = target.host();
        let port = target.port_or_default();
        let connecting = async {
            match proxy {
                Some(proxy) => Connection::connect_via_proxy(proxy, host, port, tls).await,
                None => Connection::connect(host, port, tls).await,
            }
        };
        let request = self.request;
        let connection = guard(&request.abort, self.deadline, connecting).await?;

        // タイマーは最初の接続が確立してから動かす
        if self.deadline.is_none()
            && let Some(timeout) = request.descriptor.config.timeout
        {
            self.deadline = Some(Instant::now() + timeout);
        }
        Ok(connection)
    }

    async fn receive(
        &mut self,
        connection: &mut Connection,
        method: &str,
        stats: &mut RequestStats,
    ) -> Result<(ParsedResponse, bool)> {
        let request = self.request;
        let mut parser = ResponseParser::with_limits(request.limits.clone());
        parser.set_head_request(method.eq_ignore_ascii_case("HEAD"));
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let sent_at = StdInstant::now();
        let mut first_byte_at = None;
        let mut headers_notified = false;

        loop {
            let n = guard(&request.abort, self.deadline, connection.read(&mut buf)).await?;
            if n == 0 {
                if parser.finish() == ParserState::Done {
                    break;
                }
                return Err(Error::ConnectionClosed);
            }
            if first_byte_at.is_none() {
                first_byte_at = Some(StdInstant::now());
                stats.wait = Some(sent_at.elapsed());
                if !self.first_byte_seen {
                    self.first_byte_seen = true;
                    self.observer.first_byte();
                }
            }

            let state = parser.feed(&buf[..n])?;
            if !headers_notified && parser.has_head() {
                headers_notified = true;
                if !self
                    .observer
                    .headers_received(parser.status(), parser.headers())
                {
                    return Err(Error::Aborted);
                }
            }
            if state == ParserState::Done {
                break;
            }
        }

        stats.receive = first_byte_at.map(|at| at.elapsed());
        let keep_alive = parser.is_keep_alive();
        Ok((parser.take_response(), keep_alive))
    }
}

/// 中断とタイムアウトを監視しながら待つ
async fn guard<T>(
    abort: &AbortHandle,
    deadline: Option<Instant>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = abort.aborted() => Err(Error::Aborted),
        _ = sleep_until(deadline) => Err(Error::Timeout),
        result = fut => result,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// 認証用の乱数と時刻
fn auth_entropy() -> AuthEntropy {
    let mut rng = rand::thread_rng();
    let cnonce = format!("{:016x}", rng.next_u64());
    let mut client_challenge = [0u8; 8];
    rng.fill_bytes(&mut client_challenge);
    let now = Utc::now();
    AuthEntropy::new(
        cnonce,
        client_challenge,
        windows_timestamp(now.timestamp(), now.timestamp_subsec_nanos()),
    )
}
