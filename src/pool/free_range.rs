//! Free Range.

/// 空き(割当可能)領域を表現するための構造体.
///
/// 順序は`(offset, len)`の辞書式で定義されている.
/// 重複しない領域同士の比較では実質的にオフセット順となるため、
/// `BTreeSet`に格納すると、アドレス順の走査がそのまま得られる.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FreeRange {
    offset: usize,
    len: usize,
}

#[allow(clippy::len_without_is_empty)]
impl FreeRange {
    /// 新しい`FreeRange`インスタンスを生成する.
    pub fn new(offset: usize, len: usize) -> Self {
        FreeRange { offset, len }
    }

    /// 空き領域の開始位置(バイト単位)を返す.
    pub fn offset(self) -> usize {
        self.offset
    }

    /// 空き領域の長さ(バイト単位)を返す.
    pub fn len(self) -> usize {
        self.len
    }

    /// 空き領域の終端位置を返す(exclusive).
    pub fn end(self) -> usize {
        self.offset + self.len
    }

    /// この領域から`bytes`バイトを`align`境界で切り出せるかどうかを判定する.
    ///
    /// 切り出せる場合には、領域の先頭から割当位置までのシフト量が返される.
    ///
    /// `base`にはプールバッファ先頭の実アドレスを指定する.
    /// アライメントの判定はオフセットではなく実アドレス(`base + offset`)に対して行われる.
    ///
    /// # 事前条件
    ///
    /// - `align`は二の冪
    pub fn fit(self, base: usize, bytes: usize, align: usize) -> Option<usize> {
        debug_assert!(align.is_power_of_two());
        let addr = base.checked_add(self.offset)?;
        let aligned = addr.checked_add(align - 1)? & !(align - 1);
        let shift = aligned - addr;
        if shift.checked_add(bytes)? <= self.len {
            Some(shift)
        } else {
            None
        }
    }
}
