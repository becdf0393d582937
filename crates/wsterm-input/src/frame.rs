//! 送信フレーム

use alloc::string::String;
use alloc::vec::Vec;

/// トランスポートに渡す不変のバイト列
///
/// 1 つの [`InputEvent`](crate::InputEvent)（Line モードでは 1 行）から
/// ちょうど 1 つ生成される。途中で分割して送ることはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame(Vec<u8>);

impl OutboundFrame {
    /// 1 バイトのフレーム（制御文字用）
    pub fn byte(b: u8) -> Self {
        OutboundFrame(alloc::vec![b])
    }

    /// 1 文字を UTF-8 でエンコードしたフレーム
    ///
    /// 複数バイト文字もここで 1 フレームにまとまる。
    pub fn from_char(c: char) -> Self {
        let mut buf = [0u8; 4];
        OutboundFrame(c.encode_utf8(&mut buf).as_bytes().to_vec())
    }

    /// 行バッファの内容に改行を付けたフレーム
    pub fn line(text: String, terminator: u8) -> Self {
        let mut bytes = text.into_bytes();
        bytes.push(terminator);
        OutboundFrame(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// UTF-8 として解釈できればテキストフレームとして送れる
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for OutboundFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
