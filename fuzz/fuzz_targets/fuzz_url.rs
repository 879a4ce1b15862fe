#![no_main]

use libfuzzer_sys::fuzz_target;
use socket_http11::Url;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (base, reference) = text.split_once(' ').unwrap_or((text, ""));
    let Ok(url) = Url::parse(base) else {
        return;
    };

    if let Ok(reparsed) = Url::parse(&url.to_string()) {
        assert_eq!(reparsed.scheme(), url.scheme());
    }

    let _ = url.host_header_value();
    let _ = url.origin();
    let _ = url.authority();
    if let Ok(joined) = url.join(reference) {
        let _ = joined.request_target();
    }
});
