//! Pool Buffer.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;

use crate::{Error, Result};

/// プールバッファ自体のアライメント.
///
/// 汎用のアロケータが返す領域と同等の保証.
/// これを超えるアライメント要求は、割当時のシフトによって満たされる.
pub const BUFFER_ALIGN: usize = 16;

/// プールの実体となる、固定長の生バイト領域.
///
/// 構築時に一度だけシステムアロケータから確保され、破棄時に一度だけ返却される.
/// 後から伸長・縮小されることはない.
///
/// この構造体は領域の中身には一切関知しない.
/// どの部分が使用中かの管理は、台帳(`RangeAllocator`)側の責務となる.
pub struct PoolBuffer {
    ptr: NonNull<u8>,
    capacity: usize,
}
unsafe impl Send for PoolBuffer {}
impl PoolBuffer {
    /// `capacity`バイトのバッファを確保する.
    ///
    /// # Errors
    ///
    /// `capacity`がメモリレイアウトとして表現できない場合には、
    /// 種類が`ErrorKind::InvalidInput`のエラーが返される.
    pub fn new(capacity: usize) -> Result<PoolBuffer> {
        debug_assert!(capacity > 0);
        let layout = track!(Layout::from_size_align(capacity, BUFFER_ALIGN).map_err(Error::from))?;
        let ptr = unsafe { alloc::alloc(layout) };
        let ptr = match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        };
        Ok(PoolBuffer { ptr, capacity })
    }

    /// バッファ先頭の生ポインタを返す.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// バッファ先頭の実アドレスを返す.
    pub fn base_addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// バッファの容量(バイト単位)を返す.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
impl Drop for PoolBuffer {
    fn drop(&mut self) {
        // `new`と同一のレイアウトで返却する
        let layout = Layout::from_size_align(self.capacity, BUFFER_ALIGN).expect("Never fails");
        unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
    }
}
impl fmt::Debug for PoolBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PoolBuffer {{ base: {:?}, capacity: {} }}",
            self.ptr, self.capacity
        )
    }
}
