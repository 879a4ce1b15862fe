#![no_main]

use arbitrary::Arbitrary;
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use socket_http11::cookie::{Cookie, SetCookie, merge_cookie_header, parse_cookie_date};

#[derive(Arbitrary, Debug)]
struct FuzzCookie {
    existing: Option<String>,
    set_cookies: Vec<String>,
}

fuzz_target!(|input: FuzzCookie| {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    for value in &input.set_cookies {
        if let Some(set_cookie) = SetCookie::parse(value) {
            let _ = set_cookie.is_expired(now);
            let _ = set_cookie.expiry(now);
        }
        let _ = parse_cookie_date(value);
    }

    let refs: Vec<&str> = input.set_cookies.iter().map(String::as_str).collect();
    if let Some(merged) = merge_cookie_header(input.existing.as_deref(), &refs, now) {
        assert!(!merged.is_empty());
        let _ = Cookie::parse_header(&merged);
    }
});
