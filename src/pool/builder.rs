use slog::{Discard, Logger};

use super::buffer::PoolBuffer;
use super::{FixedPool, DEFAULT_CAPACITY};
use crate::{ErrorKind, Result};

/// `FixedPool`のビルダ.
#[derive(Debug, Clone)]
pub struct FixedPoolBuilder {
    capacity: usize,
    logger: Logger,
}
impl FixedPoolBuilder {
    /// デフォルト設定で`FixedPoolBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        FixedPoolBuilder {
            capacity: DEFAULT_CAPACITY,
            logger: Logger::root(Discard, o!()),
        }
    }

    /// プールの容量(バイト単位)を設定する.
    ///
    /// プールが割当に使えるのはこの容量だけであり、後から伸長されることはない.
    ///
    /// デフォルト値は`DEFAULT_CAPACITY`.
    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    /// ログ出力用のloggerを登録する.
    ///
    /// プールのライフサイクルイベントおよび、破棄時のリーク報告の出力先となる.
    ///
    /// デフォルト値は`Logger::root(Discard, o!())`.
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// プールを構築する.
    ///
    /// バッファの確保はこの時点で一度だけ行われる.
    ///
    /// # Errors
    ///
    /// `capacity`が0の場合には、種類が`ErrorKind::InvalidInput`のエラーが返される.
    pub fn build(&self) -> Result<FixedPool> {
        track_assert!(self.capacity > 0, ErrorKind::InvalidInput);
        let buffer = track!(PoolBuffer::new(self.capacity))?;
        debug!(self.logger, "new fixed pool"; "capacity" => self.capacity);
        Ok(FixedPool::with_buffer(self.logger.clone(), buffer))
    }
}
impl Default for FixedPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
