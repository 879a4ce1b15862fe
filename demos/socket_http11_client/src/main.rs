//! socket_http11 を使った HTTP/HTTPS クライアントの例
//!
//! 使い方:
//!   cargo run -p socket_http11_client -- https://example.com/
//!   cargo run -p socket_http11_client -- --host-rule example.com=127.0.0.1:8080 http://example.com/
//!   RUST_LOG=debug cargo run -p socket_http11_client -- --method POST --data 'a=1' http://httpbin.org/post

use std::time::Duration;

use tokio_socket_http11::{
    AuthConfig, AuthMethod, HostRule, LoadEvent, LoadResult, ProxyConfig, RequestConfig,
    RequestDescriptor, SocketRequest,
};

struct ClientOptions {
    url: String,
    method: String,
    header: Option<String>,
    data: Option<String>,
    user: Option<String>,
    password: String,
    auth_method: String,
    timeout_ms: Option<u64>,
    host_rule: Option<String>,
    proxy: Option<String>,
    no_redirect: bool,
    insecure: bool,
    verbose: bool,
}

fn parse_args() -> Result<ClientOptions, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "socket_http11_client";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let method: String = noargs::opt("method")
        .short('X')
        .doc("Request method")
        .default("GET")
        .take(&mut args)
        .then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let header: Option<String> = noargs::opt("header")
        .short('H')
        .doc("Extra request header (e.g., 'Accept: text/html')")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let data: Option<String> = noargs::opt("data")
        .short('d')
        .doc("Text payload")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let user: Option<String> = noargs::opt("user")
        .short('u')
        .doc("User name for authentication")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let password: String = noargs::opt("password")
        .doc("Password for authentication")
        .default("")
        .take(&mut args)
        .then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let auth_method: String = noargs::opt("auth")
        .doc("Authentication method (basic, digest, ntlm)")
        .default("basic")
        .take(&mut args)
        .then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let timeout_ms: Option<u64> = noargs::opt("timeout")
        .short('t')
        .doc("Timeout in milliseconds (0 disables)")
        .take(&mut args)
        .present_and_then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let host_rule: Option<String> = noargs::opt("host-rule")
        .doc("Host rewrite rule (e.g., 'domain.com=127.0.0.1:8123')")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let proxy: Option<String> = noargs::opt("proxy")
        .doc("HTTP proxy URL")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let no_redirect: bool = noargs::flag("no-redirect")
        .doc("Do not follow redirects")
        .take(&mut args)
        .is_present();

    let insecure: bool = noargs::flag("insecure")
        .short('k')
        .doc("Skip TLS certificate validation")
        .take(&mut args)
        .is_present();

    let verbose: bool = noargs::flag("verbose")
        .short('v')
        .doc("Print lifecycle events")
        .take(&mut args)
        .is_present();

    // 位置引数: URL
    let url: String = noargs::arg("<URL>")
        .doc("URL to fetch (e.g., https://example.com/)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(ClientOptions {
        url,
        method,
        header,
        data,
        user,
        password,
        auth_method,
        timeout_ms,
        host_rule,
        proxy,
        no_redirect,
        insecure,
        verbose,
    })
}

fn build_descriptor(options: &ClientOptions) -> Result<RequestDescriptor, Box<dyn std::error::Error>> {
    let mut config = RequestConfig::new()
        .follow_redirects(!options.no_redirect)
        .validate_certificates(!options.insecure);
    if let Some(ms) = options.timeout_ms {
        config = config.timeout_ms(ms);
    }
    if let Some(rule) = &options.host_rule {
        let (from, to) = rule
            .split_once('=')
            .ok_or("host rule must be 'from=to'")?;
        config = config.host_rule(HostRule::new(from, to));
    }
    if let Some(proxy) = &options.proxy {
        config = config.proxy(ProxyConfig::new(proxy.as_str()));
    }

    let mut descriptor = RequestDescriptor::new(&options.method, &options.url)
        .header("User-Agent", concat!("socket_http11_client/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "*/*")
        .config(config);
    if let Some(header) = &options.header {
        descriptor = descriptor.headers_text(header);
    }
    if let Some(data) = &options.data {
        descriptor = descriptor.text(data);
    }
    if let Some(user) = &options.user {
        let method = AuthMethod::from_name(&options.auth_method)
            .ok_or_else(|| format!("unknown auth method: {}", options.auth_method))?;
        descriptor = descriptor.auth(AuthConfig::new(method, user.as_str(), options.password.as_str()));
    }
    Ok(descriptor)
}

fn print_result(result: &LoadResult) {
    for (url, response) in result.redirects.iter() {
        println!("[redirect] {} {} <- {}", response.status, response.status_text, url);
    }

    let response = &result.response;
    println!("\n--- Response ({}) ---", response.url);
    println!("{} {} {}", response.version, response.status, response.status_text);
    for (name, value) in &response.raw_headers {
        println!("{}: {}", name, value);
    }
    println!();

    // ボディを表示 (テキストの場合)
    if let Ok(body) = std::str::from_utf8(&response.body) {
        if let Some((end, _)) = body.char_indices().nth(1000) {
            println!("{}...", &body[..end]);
            println!("\n[Body truncated, {} bytes total]", response.body.len());
        } else {
            println!("{}", body);
        }
    } else {
        println!("[Binary body, {} bytes]", response.body.len());
    }

    let ms = response.stats.as_millis();
    println!(
        "\n[dns {:.1}ms, connect {:.1}ms, tls {:.1}ms, send {:.1}ms, wait {:.1}ms, receive {:.1}ms, total {:?}]",
        ms[0],
        ms[1],
        ms[2],
        ms[3],
        ms[4],
        ms[5],
        response.stats.total()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let options = parse_args()?;
    let descriptor = build_descriptor(&options)?;

    let (abort, mut events, handle) = SocketRequest::new(descriptor).spawn();

    // Ctrl-C で中断する
    let ctrl_c = {
        let abort = abort.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                abort.abort();
            }
        })
    };

    while let Some(event) = events.recv().await {
        if options.verbose {
            eprintln!("[event] {:?}", event);
        }
        if let LoadEvent::Error { code, message } = &event {
            eprintln!("error: {} ({})", message, code);
        }
    }
    ctrl_c.abort();

    match handle.await? {
        Ok(result) => {
            print_result(&result);
            Ok(())
        }
        Err(e) => {
            eprintln!("request failed: {} [{} {}]", e, e.code(), e.net_message());
            std::process::exit(1);
        }
    }
}
