//! 固定容量のメモリプール.
//!
//! このモジュールは、構築時に確保した単一の連続バッファからブロックを割り当てる
//! [FixedPool]と、その構築用の[FixedPoolBuilder]を提供する.
//!
//! プールの台帳はオフセット(バッファ先頭からのバイト位置)だけで管理されており、
//! 利用者に渡される実アドレスは、常にバッファ先頭アドレスからの導出値となる.
//!
//! [FixedPool]: ./struct.FixedPool.html
//! [FixedPoolBuilder]: ./struct.FixedPoolBuilder.html
pub use self::builder::FixedPoolBuilder;

pub(crate) use self::range::BlockRange; // `list`モジュールのテスト用に公開

use self::allocator::RangeAllocator;
use self::buffer::PoolBuffer;
use crate::alloc::BlockAllocator;
use crate::{ErrorKind, Result};
use slog::Logger;
use std::cell::RefCell;
use std::ptr::NonNull;

mod allocator;
mod buffer;
mod builder;
mod free_range;
mod range;

/// プールのデフォルト容量(バイト単位).
pub const DEFAULT_CAPACITY: usize = 1024;

/// 固定容量のメモリプール.
///
/// 構築時に確保した単一の連続バッファを所有し、
/// その内部から任意サイズ・任意アライメントのブロックを割り当てる.
///
/// 確保・解放は[BlockAllocator]トレイト経由で行われる.
/// 台帳は内部可変性で保護されているため、必要となるのは共有参照のみであり、
/// 一つのプールを複数のコンテナで共有できる(ただし単一スレッド内に限る).
///
/// 二つのプールは、同一インスタンスである場合に限り等価(`==`)と判定される.
/// 構造(容量や割当状況)の比較は行われない.
///
/// # リーク報告
///
/// プールの破棄時に未解放のブロックが残っている場合には、
/// それらの位置とサイズがloggerへ警告として出力される.
/// 報告は診断目的のものであり、破棄処理自体は常に完了する.
///
/// # Examples
///
/// ```
/// use fixpool::alloc::BlockAllocator;
/// use fixpool::pool::FixedPool;
///
/// # fn main() -> fixpool::Result<()> {
/// let pool = FixedPool::new(1024)?;
///
/// let block = pool.acquire(128, 8)?;
/// assert_eq!(block.as_ptr() as usize % 8, 0);
/// unsafe { pool.release(block, 128, 8) };
/// # Ok(())
/// # }
/// ```
///
/// [BlockAllocator]: ../alloc/trait.BlockAllocator.html
#[derive(Debug)]
pub struct FixedPool {
    logger: Logger,
    buffer: PoolBuffer,
    state: RefCell<RangeAllocator>,
}
impl FixedPool {
    pub(crate) fn with_buffer(logger: Logger, buffer: PoolBuffer) -> Self {
        let state = RangeAllocator::new(buffer.base_addr(), buffer.capacity());
        FixedPool {
            logger,
            buffer,
            state: RefCell::new(state),
        }
    }

    /// 指定された容量のプールを生成する.
    ///
    /// `FixedPoolBuilder::new().capacity(capacity).build()`の省略形.
    ///
    /// # Errors
    ///
    /// `capacity`が0の場合には、種類が`ErrorKind::InvalidInput`のエラーが返される.
    pub fn new(capacity: usize) -> Result<FixedPool> {
        track!(FixedPoolBuilder::new().capacity(capacity).build())
    }

    /// プールの容量(バイト単位)を返す.
    ///
    /// 容量は構築時に固定され、割当・解放によって変化することはない.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub(crate) fn leaked_ranges(&self) -> Vec<BlockRange> {
        self.state.borrow().allocations()
    }

    fn acquire_impl(&self, bytes: usize, align: usize) -> Result<NonNull<u8>> {
        track_assert!(bytes > 0, ErrorKind::InvalidInput);
        track_assert!(align.is_power_of_two(), ErrorKind::InvalidInput; align);
        let offset = track_assert_some!(
            self.state.borrow_mut().allocate(bytes, align),
            ErrorKind::PoolExhausted
        );
        let ptr = unsafe { self.buffer.as_ptr().add(offset) };
        Ok(NonNull::new(ptr).expect("Never fails"))
    }

    fn release_impl(&self, ptr: NonNull<u8>, bytes: usize) {
        let base = self.buffer.base_addr();
        let addr = ptr.as_ptr() as usize;

        // プール外を指すポインタは黙って無視する
        if addr < base || base + self.capacity() <= addr {
            return;
        }
        self.state.borrow_mut().release(addr - base, bytes);
    }
}
impl BlockAllocator for FixedPool {
    fn acquire(&self, bytes: usize, align: usize) -> Result<NonNull<u8>> {
        track!(self.acquire_impl(bytes, align))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, bytes: usize, _align: usize) {
        self.release_impl(ptr, bytes);
    }
}
impl PartialEq for FixedPool {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
impl Eq for FixedPool {}
impl Drop for FixedPool {
    fn drop(&mut self) {
        let leaked = self.leaked_ranges();
        if !leaked.is_empty() {
            warn!(self.logger, "memory leak detected"; "blocks" => leaked.len());
            for block in leaked {
                warn!(self.logger, "leaked block"; "offset" => block.offset, "len" => block.len);
            }
        }
    }
}
