//! Block Range.

/// 割当済みブロックの位置情報.
///
/// `offset`はプールバッファ先頭からのバイト位置で、実アドレスは保持しない.
/// プール破棄時のリーク報告は、この構造体の列として生成される.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockRange {
    /// ブロックの開始位置(バイト単位).
    pub offset: usize,

    /// ブロックの長さ(バイト単位).
    pub len: usize,
}
impl BlockRange {
    /// ブロックの終端位置を返す.
    ///
    /// 終端はexclusiveであり、`end`の位置自体はブロックには含まれない.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}
