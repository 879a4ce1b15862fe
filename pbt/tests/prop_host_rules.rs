//! ホスト書き換えルールのプロパティテスト

use pbt::{hostname, url_path};
use proptest::prelude::*;
use socket_http11::host_rules::{resolve, rewrite};
use socket_http11::{Headers, HostRule, MessageBuilder, Payload, Url};

proptest! {
    /// 完全一致のルールはホスト部分だけを置き換え、パスは保つ
    #[test]
    fn prop_exact_rule_keeps_path(
        host in hostname(),
        port in 1024u16..=65535,
        path in url_path(),
    ) {
        // スキームの文字列に誤ってマッチしないよう `//` から書く
        let rules = vec![HostRule::new(format!("//{}", host), format!("//127.0.0.1:{}", port))];
        let rewritten = rewrite(&rules, &format!("http://{}{}", host, path));
        prop_assert_eq!(rewritten, Some(format!("http://127.0.0.1:{}{}", port, path)));
    }

    /// パターンが現れない URL は書き換えない
    #[test]
    fn prop_unmatched_rule_is_none(host in hostname(), path in url_path()) {
        let rules = vec![HostRule::new("zz-no-such-host", "127.0.0.1:1")];
        let url = format!("http://{}{}", host, path);
        prop_assert_eq!(rewrite(&rules, &url), None);

        let parsed = Url::parse(&url).unwrap();
        prop_assert_eq!(resolve(&rules, &parsed).unwrap(), parsed);
    }

    /// 大文字小文字を区別せずにマッチする
    #[test]
    fn prop_case_insensitive(host in hostname(), path in url_path()) {
        let rules = vec![HostRule::new(format!("//{}", host.to_uppercase()), "//127.0.0.1:8123")];
        let rewritten = rewrite(&rules, &format!("http://{}{}", host, path));
        prop_assert_eq!(rewritten, Some(format!("http://127.0.0.1:8123{}", path)));
    }

    /// ワイルドカードのキャプチャを `$1` で参照できる
    #[test]
    fn prop_wildcard_capture(label in "[a-z]{1,10}", path in url_path()) {
        let rules = vec![HostRule::new("*.example.com", "$1.internal:8080")];
        let rewritten = rewrite(&rules, &format!("http://{}.example.com{}", label, path));
        prop_assert_eq!(rewritten, Some(format!("http://{}.internal:8080{}", label, path)));
    }

    /// 接続先が書き換わっても Host ヘッダーは論理 URL のまま
    #[test]
    fn prop_host_header_preserved(
        host in hostname(),
        port in 1024u16..=65535,
        path in url_path(),
    ) {
        let logical = Url::parse(&format!("http://{}{}", host, path)).unwrap();
        let rules = vec![HostRule::new(format!("//{}", host), format!("//127.0.0.1:{}", port))];
        let target = resolve(&rules, &logical).unwrap();
        prop_assert_eq!(target.host(), "127.0.0.1");
        prop_assert_eq!(target.port_or_default(), port);

        let headers = Headers::new();
        let payload = Payload::None;
        let message = MessageBuilder::new("GET", &logical, &headers, &payload).build();
        prop_assert_eq!(message.headers.get("Host"), Some(host.as_str()));
    }
}
