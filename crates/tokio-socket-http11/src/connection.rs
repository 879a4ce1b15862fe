//! ソケット接続
//!
//! 1 リクエストにつき 1 本の TCP (必要なら TLS) 接続を張り、名前解決・TCP 接続・
//! TLS ハンドシェイクの時間を記録する。
//!
//! 接続直後は一時停止状態で、リクエストを書き終えるまで読み取りを受け付けない。

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use socket_http11::auth::basic_header;
use socket_http11::{
    ClientCertificate, Headers, ProxyConfig, RequestMessage, RequestStats, ResponseParser, Url,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::error::{Error, Result};

/// TLS 設定
#[derive(Debug, Clone)]
pub struct TlsSettings {
    /// サーバー証明書を検証するか
    pub validate_certificates: bool,
    /// クライアント証明書
    pub client_certificate: Option<ClientCertificate>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            validate_certificates: true,
            client_certificate: None,
        }
    }
}

impl TlsSettings {
    /// rustls のクライアント設定を組み立てる
    ///
    /// 検証する場合は OS のルート証明書ストアを使う。
    pub fn client_config(&self) -> Result<Arc<ClientConfig>> {
        let verifier: Arc<dyn ServerCertVerifier> = if self.validate_certificates {
            Arc::new(rustls_platform_verifier::Verifier::new())
        } else {
            Arc::new(NoVerifier::new())
        };
        let builder = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(verifier);

        let config = match &self.client_certificate {
            Some(certificate) => {
                let certs: Vec<CertificateDer<'static>> =
                    CertificateDer::pem_slice_iter(&certificate.cert_pem)
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                if certs.is_empty() {
                    return Err(Error::Tls(
                        "client certificate PEM has no certificates".to_string(),
                    ));
                }
                let key = PrivateKeyDer::from_pem_slice(&certificate.key_pem)?;
                builder.with_client_auth_cert(certs, key)?
            }
            None => builder.with_no_client_auth(),
        };
        Ok(Arc::new(config))
    }
}

/// 証明書を検証しない検証器
///
/// 署名の検証だけは行う。
#[derive(Debug)]
struct NoVerifier {
    provider: Arc<CryptoProvider>,
}

impl NoVerifier {
    fn new() -> Self {
        Self {
            provider: Arc::new(rustls::crypto::aws_lc_rs::default_provider()),
        }
    }
}

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// 接続先のプロキシ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    /// プロキシのホスト
    pub host: String,
    /// プロキシのポート
    pub port: u16,
    /// Proxy-Authorization ヘッダー値
    pub authorization: Option<String>,
}

impl ProxyTarget {
    /// プロキシ設定から作成
    ///
    /// スキームのない `host:port` は `http://` とみなす。
    /// 資格情報は設定のものを優先し、なければ URL の userinfo を使う。
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let url = if config.url.contains("://") {
            Url::parse(&config.url)?
        } else {
            Url::parse(&format!("http://{}", config.url))?
        };
        let authorization = match (&config.username, url.username()) {
            (Some(username), _) => Some(basic_header(
                username,
                config.password.as_deref().unwrap_or(""),
            )),
            (None, Some(username)) if !username.is_empty() => Some(basic_header(
                username,
                url.password().unwrap_or(""),
            )),
            _ => None,
        };
        Ok(Self {
            host: url.host().to_string(),
            port: url.port_or_default(),
            authorization,
        })
    }
}

enum ConnectionStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

/// 1 リクエスト分の接続
pub struct Connection {
    stream: ConnectionStream,
    host: String,
    port: u16,
    stats: RequestStats,
    paused: bool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.is_tls())
            .field("paused", &self.paused)
            .finish()
    }
}

impl Connection {
    /// 接続する
    ///
    /// `tls` を指定すると TCP 接続の後に TLS ハンドシェイクを行う。
    pub async fn connect(host: &str, port: u16, tls: Option<&TlsSettings>) -> Result<Self> {
        let mut stats = RequestStats::default();
        let tcp = open_tcp(host, port, &mut stats).await?;
        Self::establish(tcp, host, port, tls, stats).await
    }

    /// プロキシ経由で接続する
    ///
    /// TLS の場合は CONNECT でトンネルを張ってからハンドシェイクする。
    /// 平文の場合はプロキシへの接続をそのまま返すので、呼び出し側は absolute-form で送る。
    pub async fn connect_via_proxy(
        proxy: &ProxyTarget,
        host: &str,
        port: u16,
        tls: Option<&TlsSettings>,
    ) -> Result<Self> {
        let mut stats = RequestStats::default();
        let mut tcp = open_tcp(&proxy.host, proxy.port, &mut stats).await?;
        if tls.is_some() {
            open_tunnel(&mut tcp, host, port, proxy.authorization.as_deref()).await?;
        }
        Self::establish(tcp, host, port, tls, stats).await
    }

    async fn establish(
        tcp: TcpStream,
        host: &str,
        port: u16,
        tls: Option<&TlsSettings>,
        mut stats: RequestStats,
    ) -> Result<Self> {
        let stream = match tls {
            Some(settings) => {
                let connector = TlsConnector::from(settings.client_config()?);
                let server_name = ServerName::try_from(host.to_string())?;
                let started = Instant::now();
                let tls_stream = connector
                    .connect(server_name, tcp)
                    .await
                    .map_err(|e| Error::Tls(e.to_string()))?;
                stats.tls = Some(started.elapsed());
                tracing::debug!(host, tls = ?stats.tls, "tls handshake complete");
                ConnectionStream::Tls(Box::new(tls_stream))
            }
            None => ConnectionStream::Plain(tcp),
        };
        Ok(Self {
            stream,
            host: host.to_string(),
            port,
            stats,
            paused: true,
        })
    }

    /// 接続先ホスト
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 接続先ポート
    pub fn port(&self) -> u16 {
        self.port
    }

    /// TLS 接続かどうか
    pub fn is_tls(&self) -> bool {
        matches!(self.stream, ConnectionStream::Tls(_))
    }

    /// 一時停止中か (リクエストを書き終えるまで読み取らない)
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 一時停止する
    ///
    /// 同じ接続で次のリクエストを送る前に呼ぶ。
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// 接続時のタイミング (dns, connect, tls) を取り出す
    ///
    /// 2 回目以降は空になる。再利用した接続のホップには接続時間を計上しない。
    pub fn take_stats(&mut self) -> RequestStats {
        std::mem::take(&mut self.stats)
    }

    /// リクエストを書き込み、読み取りを再開する
    ///
    /// 書き込みにかかった時間を返す。
    pub async fn send(&mut self, bytes: &[u8]) -> Result<Duration> {
        let started = Instant::now();
        match &mut self.stream {
            ConnectionStream::Plain(stream) => {
                stream.write_all(bytes).await?;
                stream.flush().await?;
            }
            ConnectionStream::Tls(stream) => {
                stream.write_all(bytes).await?;
                stream.flush().await?;
            }
        }
        self.paused = false;
        Ok(started.elapsed())
    }

    /// 受信する
    ///
    /// 接続が閉じられたら 0 を返す。
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.paused {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::WouldBlock,
                "connection is paused until the request is written",
            )));
        }
        match &mut self.stream {
            ConnectionStream::Plain(stream) => Ok(stream.read(buf).await?),
            ConnectionStream::Tls(stream) => match stream.read(buf).await {
                Ok(n) => Ok(n),
                // close_notify なしで閉じるサーバーは多いので、接続終了として扱う
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// 接続を閉じる
    pub async fn shutdown(mut self) {
        self.paused = true;
        let result = match &mut self.stream {
            ConnectionStream::Plain(stream) => stream.shutdown().await,
            ConnectionStream::Tls(stream) => stream.shutdown().await,
        };
        if let Err(e) = result {
            tracing::trace!(error = %e, "shutdown failed");
        }
    }
}

/// 名前解決して TCP 接続する
async fn open_tcp(host: &str, port: u16, stats: &mut RequestStats) -> Result<TcpStream> {
    let started = Instant::now();
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::DnsResolution(format!("{}: {}", host, e)))?
        .collect();
    stats.dns = Some(started.elapsed());
    if addrs.is_empty() {
        return Err(Error::DnsResolution(format!("{}: no addresses", host)));
    }

    let started = Instant::now();
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                stats.connect = Some(started.elapsed());
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::trace!(error = %e, "set_nodelay failed");
                }
                tracing::debug!(%addr, dns = ?stats.dns, connect = ?stats.connect, "connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(%addr, error = %e, "connect failed");
                last_error = Some(e);
            }
        }
    }
    Err(Error::Io(last_error.unwrap_or_else(|| {
        io::Error::from(io::ErrorKind::AddrNotAvailable)
    })))
}

/// CONNECT でトンネルを張る
async fn open_tunnel(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    authorization: Option<&str>,
) -> Result<()> {
    let authority = if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };
    let mut headers = Headers::new();
    headers.append("Host", &authority);
    if let Some(authorization) = authorization {
        headers.append("Proxy-Authorization", authorization);
    }
    let message = RequestMessage {
        method: "CONNECT".to_string(),
        target: authority.clone(),
        headers,
        body: Vec::new(),
    };
    stream.write_all(&message.encode()).await?;

    // CONNECT の応答にはボディがない
    let mut parser = ResponseParser::new();
    parser.set_head_request(true);
    let mut buf = [0u8; 4096];
    while !parser.is_done() {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(Error::Proxy(
                "proxy closed the connection during CONNECT".to_string(),
            ));
        }
        parser
            .feed(&buf[..n])
            .map_err(|e| Error::Proxy(e.to_string()))?;
    }
    let status = parser.status();
    if !(200..300).contains(&status) {
        return Err(Error::Proxy(format!(
            "CONNECT {} returned {}",
            authority, status
        )));
    }
    tracing::debug!(%authority, "proxy tunnel established");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_target_from_config() {
        let target = ProxyTarget::from_config(
            &ProxyConfig::new("proxy.local:3128").credentials("u", "p"),
        )
        .unwrap();
        assert_eq!(target.host, "proxy.local");
        assert_eq!(target.port, 3128);
        assert_eq!(target.authorization.as_deref(), Some("Basic dTpw"));

        let target = ProxyTarget::from_config(&ProxyConfig::new("http://a:b@proxy.local")).unwrap();
        assert_eq!(target.port, 80);
        assert_eq!(target.authorization.as_deref(), Some("Basic YTpi"));
    }

    #[test]
    fn test_no_verifier_config() {
        let settings = TlsSettings {
            validate_certificates: false,
            client_certificate: None,
        };
        assert!(settings.client_config().is_ok());
    }

    #[test]
    fn test_invalid_client_certificate() {
        let settings = TlsSettings {
            validate_certificates: false,
            client_certificate: Some(ClientCertificate {
                cert_pem: b"not a pem".to_vec(),
                key_pem: b"not a pem".to_vec(),
            }),
        };
        assert!(matches!(settings.client_config(), Err(Error::Tls(_))));
    }

    #[tokio::test]
    async fn test_connect_records_timing_and_pauses() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(b"pong").await.unwrap();
        });

        let mut connection = Connection::connect("127.0.0.1", port, None).await.unwrap();
        assert!(connection.is_paused());
        assert!(!connection.is_tls());
        let mut buf = [0u8; 16];
        assert!(connection.read(&mut buf).await.is_err());

        connection.send(b"ping!").await.unwrap();
        assert!(!connection.is_paused());
        let mut received = Vec::new();
        while received.len() < 4 {
            let n = connection.read(&mut buf).await.unwrap();
            assert_ne!(n, 0);
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(received, b"pong");

        let stats = connection.take_stats();
        assert!(stats.dns.is_some());
        assert!(stats.connect.is_some());
        assert!(stats.tls.is_none());
        assert_eq!(connection.take_stats(), RequestStats::default());
        server.await.unwrap();
    }
}
