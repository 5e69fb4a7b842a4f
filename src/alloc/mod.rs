//! ブロックの確保・解放能力の抽象.
//!
//! このモジュールは、バイト列ブロックの確保・解放というインタフェースを
//! [BlockAllocator]トレイトとして定義する.
//!
//! コンテナ側(e.g., [PoolList])はこのトレイトだけに依存するため、
//! メモリの出所が固定容量プールなのかシステムヒープなのかを関知しない.
//!
//! [BlockAllocator]: ./trait.BlockAllocator.html
//! [PoolList]: ../list/struct.PoolList.html
pub use self::heap::HeapAllocator;

use std::ptr::NonNull;

use crate::Result;

mod heap;

/// バイト列ブロックの確保・解放を担当するオブジェクトのためのトレイト.
///
/// 実装としては、固定容量プールから切り出す[FixedPool]と、
/// 都度システムヒープへ委譲する[HeapAllocator]が存在する.
///
/// 確保・解放は共有参照経由で行われる.
/// 状態をどう保護するかは実装側の責務となる(単一スレッド内での利用が前提).
///
/// [FixedPool]: ../pool/struct.FixedPool.html
/// [HeapAllocator]: ./struct.HeapAllocator.html
pub trait BlockAllocator {
    /// `bytes`バイトのブロックを、`align`境界に合わせて確保する.
    ///
    /// 返されるポインタは`align`の倍数のアドレスを指し、
    /// 解放されるまでの間、`bytes`バイト分の読み書きに利用できる.
    ///
    /// # Errors
    ///
    /// 要求を満たす空き領域が存在しない場合には、
    /// 種類が`ErrorKind::PoolExhausted`のエラーが返される.
    ///
    /// `bytes`が0の場合、および`align`が二の冪ではない場合には、
    /// 種類が`ErrorKind::InvalidInput`のエラーが返される.
    fn acquire(&self, bytes: usize, align: usize) -> Result<NonNull<u8>>;

    /// `acquire`で確保したブロックを解放する.
    ///
    /// # Safety
    ///
    /// `ptr`は、このアロケータの`acquire`が返した未解放のポインタであり、
    /// `bytes`および`align`には確保時と同じ値が渡されなければならない.
    /// 解放後の`ptr`経由のアクセスは未定義動作となる.
    unsafe fn release(&self, ptr: NonNull<u8>, bytes: usize, align: usize);
}
