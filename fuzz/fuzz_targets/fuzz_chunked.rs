#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use socket_http11::parser::ChunkedDecoder;

#[derive(Arbitrary, Debug)]
struct FuzzChunked {
    chunks: Vec<Vec<u8>>,
    split_hint: u8,
    garbage: Vec<u8>,
}

fn normalize_chunks(mut chunks: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    chunks.retain(|chunk| !chunk.is_empty());
    if chunks.len() > 64 {
        chunks.truncate(64);
    }
    chunks
}

fn encode(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

fuzz_target!(|input: FuzzChunked| {
    let chunks = normalize_chunks(input.chunks);
    let expected = chunks.concat();
    let split_size = (input.split_hint as usize % 32) + 1;

    // 正しいエンコードはどの分割でも同じ結果になる
    let encoded = encode(&chunks);
    let mut decoder = ChunkedDecoder::default();
    let mut out = Vec::new();
    let mut done = false;
    for part in encoded.chunks(split_size) {
        done = decoder.decode(part, &mut out).expect("valid chunked data");
    }
    assert!(done);
    assert_eq!(out, expected);

    // 不正なデータでもパニックしない
    let mut decoder = ChunkedDecoder::new(64);
    let mut out = Vec::new();
    for part in input.garbage.chunks(split_size) {
        let _ = decoder.decode(part, &mut out);
    }
    let _ = decoder.finish();
});
