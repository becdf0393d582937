//! Line モードのローカル行バッファ

use alloc::string::String;

/// クライアント側で保持する入力行
///
/// ## 責任
/// - 印字可能文字の追加（上限バイト数まで）
/// - Backspace による末尾 1 文字の削除（空でもアンダーフローしない）
/// - Enter 時に内容を取り出してクリア
///
/// 上限はバイト数で数える。リモート側の入力バッファがバイト単位のため。
#[derive(Debug, Clone)]
pub struct LineBuffer {
    text: String,
    max_len: usize,
}

impl LineBuffer {
    pub fn new(max_len: usize) -> Self {
        LineBuffer {
            text: String::new(),
            max_len,
        }
    }

    /// 1 文字追加する
    ///
    /// # 戻り値
    /// - `true`: 追加した
    /// - `false`: 上限を超えるため拒否（バッファは変化しない）
    pub fn push(&mut self, c: char) -> bool {
        if self.text.len() + c.len_utf8() > self.max_len {
            return false;
        }
        self.text.push(c);
        true
    }

    /// 末尾の 1 文字を削除する。空の場合は何もしない
    pub fn backspace(&mut self) -> Option<char> {
        self.text.pop()
    }

    /// 内容を取り出し、バッファを空にする
    pub fn take(&mut self) -> String {
        core::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// 画面に表示する未送信の入力
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 現在のバイト数
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(crate::DEFAULT_MAX_LINE_LEN)
    }
}
