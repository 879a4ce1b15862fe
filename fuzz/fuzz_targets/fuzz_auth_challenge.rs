#![no_main]

use libfuzzer_sys::fuzz_target;
use socket_http11::auth::{DigestChallenge, NtlmChallenge};
use socket_http11::{AuthConfig, AuthEngine, AuthEntropy, AuthMethod};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        // バイナリは NTLM メッセージとしてだけ試す
        let _ = NtlmChallenge::decode(data);
        return;
    };

    let _ = DigestChallenge::parse(text);
    let _ = NtlmChallenge::from_header(text);

    let entropy = AuthEntropy::new("0a4f113b", [1, 2, 3, 4, 5, 6, 7, 8], 0);
    for method in [AuthMethod::Basic, AuthMethod::Digest, AuthMethod::Ntlm] {
        let mut engine = AuthEngine::new(AuthConfig::new(method, "user", "pass"));
        let _ = engine.authorization("GET", "/", b"");
        let _ = engine.on_challenge(&[text], "GET", "/", b"", &entropy);
        let _ = engine.authorization("GET", "/", b"");
    }
});
