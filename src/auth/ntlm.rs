//! NTLM 認証 (NTLMv2)
//!
//! 3 ステップのハンドシェイクを扱う。
//!
//! 1. クライアントが NEGOTIATE (タイプ 1) を送る
//! 2. サーバーが 401 と CHALLENGE (タイプ 2) を返す
//! 3. クライアントが AUTHENTICATE (タイプ 3) を同じ接続で送る

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use md4::{Digest, Md4};
use md5::Md5;

use super::AuthError;

type HmacMd5 = Hmac<Md5>;

const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const NEGOTIATE_UNICODE: u32 = 0x0000_0001;
const NEGOTIATE_OEM: u32 = 0x0000_0002;
const REQUEST_TARGET: u32 = 0x0000_0004;
const NEGOTIATE_NTLM: u32 = 0x0000_0200;
const NEGOTIATE_ALWAYS_SIGN: u32 = 0x0000_8000;
const NEGOTIATE_EXTENDED_SESSIONSECURITY: u32 = 0x0008_0000;
const NEGOTIATE_128: u32 = 0x2000_0000;
const NEGOTIATE_56: u32 = 0x8000_0000;

const NEGOTIATE_FLAGS: u32 = NEGOTIATE_UNICODE
    | NEGOTIATE_OEM
    | REQUEST_TARGET
    | NEGOTIATE_NTLM
    | NEGOTIATE_ALWAYS_SIGN
    | NEGOTIATE_EXTENDED_SESSIONSECURITY
    | NEGOTIATE_128
    | NEGOTIATE_56;

const AUTHENTICATE_FLAGS: u32 = NEGOTIATE_FLAGS & !NEGOTIATE_OEM;

/// ハンドシェイクの進行状態
///
/// 状態は新しい 401 チャレンジを受け取ったときだけ前に進む。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NtlmState {
    /// NEGOTIATE 送信前後、チャレンジ未受信
    Initial,
    /// CHALLENGE を受信した
    ChallengeReceived,
    /// AUTHENTICATE を送信した
    ResponseSent,
}

/// サーバーから受け取った CHALLENGE メッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtlmChallenge {
    /// サーバーチャレンジ
    pub server_challenge: [u8; 8],
    /// ネゴシエートフラグ
    pub flags: u32,
    /// ターゲット名 (UTF-16LE をデコードしたもの)
    pub target_name: String,
    /// ターゲット情報 (AV_PAIR 列)
    pub target_info: Vec<u8>,
}

impl NtlmChallenge {
    /// `WWW-Authenticate: NTLM <base64>` の値からデコード
    pub fn from_header(value: &str) -> Result<Self, AuthError> {
        let token = super::strip_scheme(value, "NTLM").ok_or(AuthError::MissingChallenge)?;
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| AuthError::InvalidNtlmMessage(e.to_string()))?;
        Self::decode(&bytes)
    }

    /// タイプ 2 メッセージをデコード
    pub fn decode(msg: &[u8]) -> Result<Self, AuthError> {
        if msg.len() < 32 || &msg[..8] != SIGNATURE {
            return Err(AuthError::InvalidNtlmMessage("bad signature".into()));
        }
        if read_u32(msg, 8) != 2 {
            return Err(AuthError::InvalidNtlmMessage("not a challenge message".into()));
        }
        let flags = read_u32(msg, 20);
        let mut server_challenge = [0u8; 8];
        server_challenge.copy_from_slice(&msg[24..32]);

        let target_name = security_buffer(msg, 12)
            .map(|b| decode_utf16le(&b))
            .unwrap_or_default();
        let target_info = if msg.len() >= 48 {
            security_buffer(msg, 40).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self {
            server_challenge,
            flags,
            target_name,
            target_info,
        })
    }
}

/// NEGOTIATE (タイプ 1) メッセージ
pub fn negotiate_message() -> Vec<u8> {
    let mut msg = Vec::with_capacity(32);
    msg.extend_from_slice(SIGNATURE);
    msg.extend_from_slice(&1u32.to_le_bytes());
    msg.extend_from_slice(&NEGOTIATE_FLAGS.to_le_bytes());
    // domain / workstation は空
    msg.extend_from_slice(&[0u8; 16]);
    msg
}

/// `Authorization: NTLM <base64>` の値を作る
pub fn header_value(message: &[u8]) -> String {
    format!("NTLM {}", STANDARD.encode(message))
}

/// AUTHENTICATE を作るための資格情報
#[derive(Debug, Clone, Copy)]
pub struct NtlmCredentials<'a> {
    /// ユーザー名 (ドメインなし)
    pub username: &'a str,
    /// パスワード
    pub password: &'a str,
    /// ドメイン
    pub domain: &'a str,
    /// ワークステーション名
    pub workstation: &'a str,
}

/// AUTHENTICATE (タイプ 3) メッセージ
///
/// `client_challenge` と `timestamp` (1601-01-01 からの 100ns 単位) は呼び出し側が用意する。
pub fn authenticate_message(
    credentials: &NtlmCredentials<'_>,
    challenge: &NtlmChallenge,
    client_challenge: [u8; 8],
    timestamp: u64,
) -> Result<Vec<u8>, AuthError> {
    let nt_hash = nt_hash(credentials.password);
    let identity = utf16le(&format!(
        "{}{}",
        credentials.username.to_uppercase(),
        credentials.domain
    ));
    let v2_hash = hmac_md5(&nt_hash, &[identity.as_slice()])?;

    let mut blob = Vec::with_capacity(32 + challenge.target_info.len());
    blob.extend_from_slice(&[0x01, 0x01, 0x00, 0x00]);
    blob.extend_from_slice(&[0u8; 4]);
    blob.extend_from_slice(&timestamp.to_le_bytes());
    blob.extend_from_slice(&client_challenge);
    blob.extend_from_slice(&[0u8; 4]);
    blob.extend_from_slice(&challenge.target_info);
    blob.extend_from_slice(&[0u8; 4]);

    let nt_proof = hmac_md5(&v2_hash, &[&challenge.server_challenge[..], &blob[..]])?;
    let mut nt_response = nt_proof.to_vec();
    nt_response.extend_from_slice(&blob);

    let mut lm_response =
        hmac_md5(&v2_hash, &[&challenge.server_challenge[..], &client_challenge[..]])?.to_vec();
    lm_response.extend_from_slice(&client_challenge);

    let domain = utf16le(credentials.domain);
    let user = utf16le(credentials.username);
    let workstation = utf16le(credentials.workstation);

    const HEADER_LEN: usize = 64;
    let mut payload = Vec::new();
    let mut fields = [(0usize, 0usize); 5];
    for (i, data) in [&lm_response, &nt_response, &domain, &user, &workstation]
        .into_iter()
        .enumerate()
    {
        fields[i] = (data.len(), HEADER_LEN + payload.len());
        payload.extend_from_slice(data);
    }
    let [lm, nt, dom, usr, ws] = fields;

    let mut msg = Vec::with_capacity(HEADER_LEN + payload.len());
    msg.extend_from_slice(SIGNATURE);
    msg.extend_from_slice(&3u32.to_le_bytes());
    for (len, offset) in [lm, nt, dom, usr, ws] {
        write_security_buffer(&mut msg, len, offset);
    }
    // 暗号化セッションキーは使わない
    write_security_buffer(&mut msg, 0, HEADER_LEN + payload.len());
    msg.extend_from_slice(&AUTHENTICATE_FLAGS.to_le_bytes());
    msg.extend_from_slice(&payload);
    Ok(msg)
}

/// NT ハッシュ (UTF-16LE パスワードの MD4)
pub fn nt_hash(password: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md4::digest(utf16le(password)));
    out
}

/// Unix 時刻を NTLMv2 のタイムスタンプ (1601-01-01 からの 100ns 単位) に変換
pub fn windows_timestamp(unix_secs: i64, subsec_nanos: u32) -> u64 {
    const UNIX_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
    let secs = u64::try_from(unix_secs.saturating_add(UNIX_EPOCH_OFFSET_SECS)).unwrap_or(0);
    secs * 10_000_000 + u64::from(subsec_nanos / 100)
}

/// `DOMAIN\user` 形式を (domain, user) に分解
pub fn split_domain(username: &str) -> (Option<&str>, &str) {
    match username.split_once('\\') {
        Some((domain, user)) => (Some(domain), user),
        None => (None, username),
    }
}

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 16], AuthError> {
    let mut mac = HmacMd5::new_from_slice(key)
        .map_err(|e| AuthError::InvalidNtlmMessage(format!("hmac key: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// セキュリティバッファ (len u16, maxlen u16, offset u32) が指す範囲を取り出す
fn security_buffer(msg: &[u8], at: usize) -> Option<Vec<u8>> {
    if msg.len() < at + 8 {
        return None;
    }
    let len = read_u16(msg, at) as usize;
    let offset = read_u32(msg, at + 4) as usize;
    msg.get(offset..offset.checked_add(len)?).map(<[u8]>::to_vec)
}

fn write_security_buffer(msg: &mut Vec<u8>, len: usize, offset: usize) {
    msg.extend_from_slice(&(len as u16).to_le_bytes());
    msg.extend_from_slice(&(len as u16).to_le_bytes());
    msg.extend_from_slice(&(offset as u32).to_le_bytes());
}
