//! 受信バイト列 → 表示テキストの逐次デコード

use alloc::string::String;
use alloc::vec::Vec;

/// チャンク境界で分断された UTF-8 を繋ぎ直すデコーダー
///
/// 末尾の不完全なシーケンス（最大 3 バイト）は次のチャンクに持ち越す。
/// 不正なシーケンスは U+FFFD に置き換える。
#[derive(Debug, Default)]
pub struct Utf8Assembler {
    carry: Vec<u8>,
}

impl Utf8Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// チャンクを追加し、表示できるテキストを返す
    pub fn push(&mut self, chunk: &[u8]) -> String {
        let mut buf = core::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match core::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + bad..];
                        }
                        None => {
                            // 途中で切れている。続きを待つ
                            self.carry = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// 持ち越し中のバイト数
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// 接続が切り替わったときに持ち越しを捨てる
    pub fn reset(&mut self) {
        self.carry.clear();
    }
}
