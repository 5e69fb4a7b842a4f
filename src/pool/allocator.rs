//! Range Allocator.

use std::collections::Bound::{Excluded, Unbounded};
use std::collections::{BTreeMap, BTreeSet};

use super::free_range::FreeRange;
use super::range::BlockRange;

/// プール内の空き領域・割当済み領域の台帳.
///
/// 容量`capacity`バイトの連続領域を対象として、
/// 個々の確保要求に応じた部分領域の割当を担当する.
///
/// 台帳が扱うのはオフセット(バッファ先頭からのバイト位置)のみで、実メモリには一切触れない.
/// 実アドレスはアライメント判定用に`base`として渡されるだけであり、割当結果は常にオフセットで返される.
///
/// # 割当戦略
///
/// このアロケータは"FirstFit"戦略を採用している.
///
/// 空き領域はアドレス順(オフセット順)の集合として管理されており、
/// 新規割当要求が発行された際には、先頭(最小オフセット)から順に探索が行われ、
/// アライメント調整後も要求サイズを満たせる最初の空き領域が選択される.
///
/// 選択された空き領域から要求分を切り出した結果、
/// 前後に余剰が生じた場合には、それらは空き領域として集合に戻される.
///
/// 解放された領域は、隣接する空き領域が存在すればそれらと併合された上で集合に追加される.
/// この併合により「隣接した二つの空き領域が別々に残る」ことはない.
#[derive(Debug)]
pub struct RangeAllocator {
    base: usize,
    capacity: usize,
    free_ranges: BTreeSet<FreeRange>,
    allocated: BTreeMap<usize, usize>,
}
impl RangeAllocator {
    /// アロケータを構築する.
    ///
    /// `base`には、アライメント判定に用いる実アドレス(バッファ先頭)を指定する.
    ///
    /// 構築直後は、全域`[0, capacity)`が単一の空き領域として登録されている.
    pub fn new(base: usize, capacity: usize) -> Self {
        let mut allocator = RangeAllocator {
            base,
            capacity,
            free_ranges: BTreeSet::new(),
            allocated: BTreeMap::new(),
        };
        if capacity > 0 {
            allocator.add_free_range(FreeRange::new(0, capacity));
        }
        allocator
    }

    /// `bytes`バイト分の領域を、`align`境界に合わせて割り当てる.
    ///
    /// 十分な空き領域が存在しない場合には`None`が返される.
    ///
    /// # 事前条件
    ///
    /// - `bytes > 0`
    /// - `align`は二の冪
    pub fn allocate(&mut self, bytes: usize, align: usize) -> Option<usize> {
        debug_assert!(bytes > 0);
        debug_assert!(align.is_power_of_two());
        let (free, shift) = self
            .free_ranges
            .iter()
            // オフセット順の走査なので、最初に適合したものが最小アドレスの候補となる
            .find_map(|f| f.fit(self.base, bytes, align).map(|shift| (*f, shift)))?;
        self.delete_free_range(free);
        if shift > 0 {
            // アライメント調整で生じた先頭の隙間は、通常の空き領域として戻す
            self.add_free_range(FreeRange::new(free.offset(), shift));
        }
        let offset = free.offset() + shift;
        let after = free.len() - shift - bytes;
        if after > 0 {
            self.add_free_range(FreeRange::new(offset + bytes, after));
        }
        assert!(self.allocated.insert(offset, bytes).is_none());
        Some(offset)
    }

    /// 割当済みの領域を解放して、空き領域に戻す.
    ///
    /// `offset`に一致する割当記録が存在する場合には、その記録も取り除かれる.
    /// 記録が見つからない場合でも解放自体は行われる(解放量は引数の`bytes`に従う).
    ///
    /// `bytes`が0の場合には何も行われない.
    pub fn release(&mut self, offset: usize, bytes: usize) {
        if bytes == 0 {
            return;
        }
        self.allocated.remove(&offset);
        let range = self.merge_free_ranges_if_possible(FreeRange::new(offset, bytes));
        self.add_free_range(range);
    }

    /// 管理対象領域全体の容量(バイト単位)を返す.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 現在割当済みの領域群を、オフセット順に列挙して返す.
    pub fn allocations(&self) -> Vec<BlockRange> {
        self.allocated
            .iter()
            .map(|(&offset, &len)| BlockRange { offset, len })
            .collect()
    }

    fn add_free_range(&mut self, range: FreeRange) {
        assert!(self.free_ranges.insert(range));
    }

    fn delete_free_range(&mut self, range: FreeRange) {
        assert!(self.free_ranges.remove(&range));
    }

    // `range`と隣接する空き領域が存在する場合には、それらをまとめてしまう.
    fn merge_free_ranges_if_possible(&mut self, mut range: FreeRange) -> FreeRange {
        // 「`range`の始端」を終端として持つ空き領域`prev`を探す。
        // 集合はオフセット順なので、`range`より手前にある最後の要素だけを確認すれば十分である。
        let key = FreeRange::new(range.offset(), 0);
        if let Some(prev) = self.free_ranges.range(..key).next_back().copied() {
            if prev.end() == range.offset() {
                self.delete_free_range(prev); // prevの情報は不要なので削除
                range = FreeRange::new(prev.offset(), prev.len() + range.len());
            }
        }

        // 「`range`の終端」を始端として持つ空き領域`next`を探す。
        // `next`については`range.end <= next.offset`を満たす最小の領域ということしか分かっていないため、
        // range.end == next.offset かどうかを確認する必要がある。
        let key = FreeRange::new(range.end(), 0);
        if let Some(next) = self
            .free_ranges
            .range((Excluded(key), Unbounded))
            .next()
            .copied()
        {
            if next.offset() == range.end() {
                self.delete_free_range(next); // nextの情報は不要なので削除
                range = FreeRange::new(range.offset(), range.len() + next.len());
            }
        }

        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let mut allocator = RangeAllocator::new(0, 24);
        assert_eq!(allocator.allocate(10, 1), Some(0));
        assert_eq!(allocator.allocate(10, 1), Some(10));
        assert_eq!(allocator.allocate(10, 1), None);
        assert_eq!(allocator.allocate(4, 1), Some(20));
        assert_partition(&allocator);

        allocator.release(10, 10);
        assert_eq!(allocator.allocate(5, 1), Some(10));
        assert_eq!(allocator.allocate(2, 1), Some(15));
        assert_eq!(allocator.allocate(4, 1), None);
        assert_partition(&allocator);
    }

    #[test]
    fn first_fit_prefers_lowest_offset() {
        let mut allocator = RangeAllocator::new(0, 64);
        assert_eq!(allocator.allocate(16, 1), Some(0));
        assert_eq!(allocator.allocate(16, 1), Some(16));
        assert_eq!(allocator.allocate(16, 1), Some(32));

        // 複数の空き領域が要求を満たす場合には、最小オフセットのものが選ばれる
        allocator.release(16, 16);
        allocator.release(0, 16);
        assert_eq!(allocator.allocate(8, 1), Some(0));
        assert_eq!(allocator.allocate(8, 1), Some(8));
        assert_eq!(allocator.allocate(8, 1), Some(16));
        assert_partition(&allocator);
    }

    #[test]
    fn coalesces_released_neighbors() {
        let mut allocator = RangeAllocator::new(0, 96);
        assert_eq!(allocator.allocate(32, 1), Some(0));
        assert_eq!(allocator.allocate(32, 1), Some(32));
        assert_eq!(allocator.allocate(32, 1), Some(64));
        assert!(allocator.free_ranges.is_empty());

        // 中抜きの解放では併合は起きない
        allocator.release(32, 32);
        assert_eq!(free_ranges(&allocator), [(32, 32)]);

        // 前方の隣接領域と併合される
        allocator.release(0, 32);
        assert_eq!(free_ranges(&allocator), [(0, 64)]);

        // 後方も併合されて、全域が単一の空き領域に戻る
        allocator.release(64, 32);
        assert_eq!(free_ranges(&allocator), [(0, 96)]);
        assert_partition(&allocator);
    }

    #[test]
    fn alignment_shift_splits_leading_gap() {
        // base=4: オフセット0の実アドレスは8バイト境界から4バイトずれている
        let mut allocator = RangeAllocator::new(4, 64);
        assert_eq!(allocator.allocate(8, 8), Some(4));
        assert_eq!(free_ranges(&allocator), [(0, 4), (12, 52)]);
        assert_partition(&allocator);

        // 先頭の隙間も通常の空き領域として再利用される
        assert_eq!(allocator.allocate(4, 1), Some(0));
        assert_partition(&allocator);
    }

    #[test]
    fn allocate_rejects_unsatisfiable_alignment() {
        let mut allocator = RangeAllocator::new(8, 32);

        // 要求サイズ自体は容量内でも、シフト込みで溢れる場合は割当不能
        assert_eq!(allocator.allocate(32, 64), None);
        assert_eq!(allocator.allocate(32, 8), Some(0));
    }

    #[test]
    fn full_capacity_cycle_restores_single_range() {
        let mut allocator = RangeAllocator::new(0, 1024);
        for _ in 0..3 {
            assert_eq!(allocator.allocate(1024, 1), Some(0));
            assert!(allocator.free_ranges.is_empty());
            assert_eq!(allocator.allocate(1, 1), None);

            allocator.release(0, 1024);
            assert_eq!(free_ranges(&allocator), [(0, 1024)]);
        }
    }

    #[test]
    fn release_merges_alignment_gap() {
        let mut allocator = RangeAllocator::new(0, 1024);
        assert_eq!(allocator.allocate(100, 8), Some(0));

        // オフセット100は8バイト境界に乗らないため、4バイトのシフトが入る
        assert_eq!(allocator.allocate(100, 8), Some(104));
        assert_eq!(free_ranges(&allocator), [(100, 4), (204, 820)]);

        // 解放された先頭ブロックは、シフトで生じていた隙間と併合される
        allocator.release(0, 100);
        assert_eq!(free_ranges(&allocator), [(0, 104), (204, 820)]);
        assert_eq!(allocator.allocations(), [BlockRange { offset: 104, len: 100 }]);
        assert_partition(&allocator);
    }

    #[test]
    fn allocate_and_release() {
        let mut allocator = RangeAllocator::new(0, 4096);
        let p0 = allocator.allocate(65, 1).unwrap();
        let p1 = allocator.allocate(65, 1).unwrap();
        let p2 = allocator.allocate(65, 1).unwrap();
        allocator.release(p0, 65);
        allocator.release(p1, 65);

        let p3 = allocator.allocate(65, 1).unwrap();
        let p4 = allocator.allocate(65, 1).unwrap();
        allocator.release(p2, 65);
        allocator.release(p3, 65);

        let p5 = allocator.allocate(65, 1).unwrap();
        let p6 = allocator.allocate(65, 1).unwrap();
        allocator.release(p4, 65);
        allocator.release(p5, 65);
        allocator.release(p6, 65);
        assert_eq!(free_ranges(&allocator), [(0, 4096)]);
        assert_partition(&allocator);
    }

    #[test]
    fn release_without_matching_record_still_frees() {
        let mut allocator = RangeAllocator::new(0, 64);
        assert_eq!(allocator.allocate(64, 1), Some(0));

        // 割当記録に一致しない位置の解放でも、領域自体は戻される
        allocator.release(32, 32);
        assert_eq!(free_ranges(&allocator), [(32, 32)]);

        // 記録の方は残ったままとなる
        assert_eq!(allocator.allocations(), [BlockRange { offset: 0, len: 64 }]);
    }

    #[test]
    fn zero_length_release_is_ignored() {
        let mut allocator = RangeAllocator::new(0, 64);
        assert_eq!(allocator.allocate(64, 1), Some(0));

        allocator.release(0, 0);
        assert!(allocator.free_ranges.is_empty());
        assert_eq!(allocator.allocations(), [BlockRange { offset: 0, len: 64 }]);
    }

    #[test]
    #[should_panic]
    fn it_panics() {
        let mut allocator = RangeAllocator::new(0, 1024);

        // Try releasing an unallocated range
        allocator.release(0, 1024);
    }

    fn free_ranges(allocator: &RangeAllocator) -> Vec<(usize, usize)> {
        allocator
            .free_ranges
            .iter()
            .map(|f| (f.offset(), f.len()))
            .collect()
    }

    // 空き領域と割当済み領域が、過不足なく全域を埋めていることを検査する。
    // あわせて、空き領域同士が隣接したまま残っていないことも確認する。
    fn assert_partition(allocator: &RangeAllocator) {
        let mut spans = allocator
            .free_ranges
            .iter()
            .map(|f| (f.offset(), f.len(), true))
            .collect::<Vec<_>>();
        spans.extend(
            allocator
                .allocations()
                .into_iter()
                .map(|b| (b.offset, b.len, false)),
        );
        spans.sort();

        let mut pos = 0;
        let mut prev_is_free = false;
        for (offset, len, is_free) in spans {
            assert_eq!(offset, pos, "hole or overlap at {}", pos);
            assert!(!(is_free && prev_is_free), "unmerged free ranges at {}", offset);
            pos += len;
            prev_is_free = is_free;
        }
        assert_eq!(pos, allocator.capacity());
    }
}
