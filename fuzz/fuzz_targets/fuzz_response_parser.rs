#![no_main]

use libfuzzer_sys::fuzz_target;
use socket_http11::{ParserLimits, ParserState, ResponseParser};

const MAX_BODY: usize = 64 * 1024;

fn run(data: &[u8], split: usize, head: bool) -> Option<(ParserState, Vec<u8>)> {
    let mut parser = ResponseParser::with_limits(ParserLimits::default().max_body_size(MAX_BODY));
    parser.set_head_request(head);
    for part in data.chunks(split) {
        if parser.feed(part).is_err() {
            return None;
        }
    }
    let state = parser.finish();
    Some((state, parser.take_response().body))
}

fuzz_target!(|data: &[u8]| {
    // 一括投入
    if let Some((_, body)) = run(data, data.len().max(1), false) {
        assert!(body.len() <= MAX_BODY);
    }

    // 分割投入 (ストリーミングシナリオ)
    if let Some((_, body)) = run(data, 23, false) {
        assert!(body.len() <= MAX_BODY);
    }

    // HEAD リクエストへのレスポンスとしてパース
    if let Some((state, body)) = run(data, data.len().max(1), true)
        && state == ParserState::Done
    {
        assert!(body.is_empty());
    }
});
