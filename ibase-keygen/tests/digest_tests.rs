use ibase_keygen::{DigestKind, Digester, FallbackDigester, Sha256Digester, FALLBACK_DIGEST_LEN};

#[test]
fn sha256_empty_input() {
    let hex = Sha256Digester.digest(b"").unwrap();
    assert_eq!(
        hex,
        "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
    );
}

#[test]
fn sha256_is_uppercase_hex_of_full_length() {
    let hex = Sha256Digester.digest(b"abc").unwrap();
    assert_eq!(hex.len(), 64);
    assert!(hex.starts_with("BA7816BF"));
}

#[test]
fn fallback_strips_padding_and_symbols() {
    // base64("ab?") = "YWI/" ; "?" is 0x3F which makes a '/'.
    let out = FallbackDigester.digest(b"ab?").unwrap();
    assert_eq!(out, "YWIYWI");
}

#[test]
fn fallback_doubles_and_truncates() {
    // base64("hello") = "aGVsbG8=" -> "AGVSBG8" doubled -> "AGVSBG8AGVSBG8"
    let out = FallbackDigester.digest(b"hello").unwrap();
    assert_eq!(out, "AGVSBG8AGVSBG8");

    let long = FallbackDigester.digest(b"hello world, hello world").unwrap();
    assert_eq!(long.len(), FALLBACK_DIGEST_LEN);
    assert_eq!(long, "AGVSBG8GD29YBGQS");
}

#[test]
fn fallback_encodes_raw_utf8_bytes() {
    // "é" is 0xC3 0xA9; each byte is one base64 input octet.
    let out = FallbackDigester.digest("é".as_bytes()).unwrap();
    assert_eq!(out, "W6KW6K");
}

#[test]
fn digest_kind_default_is_sha256() {
    assert_eq!(DigestKind::default(), DigestKind::Sha256);
    assert_eq!(DigestKind::Sha256.digester().name(), "sha256");
    assert_eq!(DigestKind::Fallback.digester().name(), "fallback");
}

#[test]
fn digest_kind_serde() {
    assert_eq!(serde_json::to_string(&DigestKind::Fallback).unwrap(), r#""fallback""#);
    let parsed: DigestKind = serde_json::from_str(r#""sha256""#).unwrap();
    assert_eq!(parsed, DigestKind::Sha256);
}
