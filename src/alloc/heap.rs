use std::alloc::{self, Layout};
use std::ptr::NonNull;

use super::BlockAllocator;
use crate::{Error, ErrorKind, Result};

/// システムヒープをそのまま利用する`BlockAllocator`実装.
///
/// 確保要求は毎回、`std::alloc`の汎用アロケータへ委譲される.
/// 容量制限もリーク検出も持たない、最も素朴な実装.
///
/// 全てのインスタンスが同一のヒープを指すため、
/// `HeapAllocator`同士は常に等価(`==`)と判定される.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapAllocator;
impl HeapAllocator {
    /// 新しい`HeapAllocator`インスタンスを生成する.
    pub fn new() -> Self {
        HeapAllocator
    }
}
impl BlockAllocator for HeapAllocator {
    fn acquire(&self, bytes: usize, align: usize) -> Result<NonNull<u8>> {
        track_assert!(bytes > 0, ErrorKind::InvalidInput);
        track_assert!(align.is_power_of_two(), ErrorKind::InvalidInput; align);
        let layout = track!(Layout::from_size_align(bytes, align).map_err(Error::from))?;
        let ptr = unsafe { alloc::alloc(layout) };
        let ptr = track_assert_some!(NonNull::new(ptr), ErrorKind::PoolExhausted);
        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        if bytes == 0 {
            return;
        }
        if let Ok(layout) = Layout::from_size_align(bytes, align) {
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;

    #[test]
    fn it_works() -> TestResult {
        let allocator = HeapAllocator::new();
        let block = track!(allocator.acquire(256, 16))?;
        assert_eq!(block.as_ptr() as usize % 16, 0);
        unsafe {
            block.as_ptr().write_bytes(0xAB, 256);
            assert_eq!(block.as_ptr().add(255).read(), 0xAB);
            allocator.release(block, 256, 16);
        }
        Ok(())
    }

    #[test]
    fn rejects_invalid_requests() {
        let allocator = HeapAllocator::new();
        assert_eq!(
            allocator.acquire(0, 8).err().map(|e| *e.kind()),
            Some(ErrorKind::InvalidInput)
        );
        assert_eq!(
            allocator.acquire(8, 3).err().map(|e| *e.kind()),
            Some(ErrorKind::InvalidInput)
        );
    }

    #[test]
    fn handles_compare_equal() {
        assert_eq!(HeapAllocator::new(), HeapAllocator::default());
    }
}
