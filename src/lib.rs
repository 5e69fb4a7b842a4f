//! Fixed-capacity Memory Pool.
//!
//! `fixpool`は、固定容量の事前確保バッファからブロックを割り当てるメモリプールと、
//! その上にノードを配置する連結リストを提供するライブラリ.
//!
//! # 特徴
//!
//! - 構築時に確保した単一の連続バッファから、任意サイズ・任意アライメントのブロックを割り当てる([FixedPool])
//!   - プールの容量は固定で、後から伸長・縮小されることはない
//! - 空き領域はアドレス順("FirstFit"戦略)に探索され、解放時には隣接する空き領域と自動的に併合される
//! - 未解放のままプールが破棄された場合には、残存ブロック群がリークとしてログに報告される
//!   - 報告は診断目的であり、破棄処理自体は常に完了する
//! - ノード用のメモリを[BlockAllocator]経由で確保する、ジェネリックな双方向連結リスト([PoolList])
//!   - アロケータは差し替え可能で、システムヒープを利用する[HeapAllocator]も同じ契約を満たす
//! - スレッド安全性は提供しない(単一スレッド内での利用を想定)
//!
//! # モジュールの依存関係
//!
//! ```text
//! list => alloc
//! pool => alloc
//! ```
//!
//! - [alloc]モジュール:
//!   - ブロックの確保・解放という能力を[BlockAllocator]トレイトとして定義する
//!   - コンテナ側はこのトレイトだけに依存し、メモリの出所を関知しない
//! - [pool]モジュール:
//!   - 主に[FixedPool]構造体を提供
//!   - 空き領域・割当済み領域の台帳を管理し、リーク報告までを担当する
//! - [list]モジュール:
//!   - 主に[PoolList]構造体を提供
//!   - ノードの生成・破棄は全て、束縛されたアロケータへの委譲で行われる
//!
//! # Examples
//!
//! ```
//! use fixpool::list::PoolList;
//! use fixpool::pool::FixedPoolBuilder;
//!
//! # fn main() -> fixpool::Result<()> {
//! // 256KiBのプールを構築し、その上に二つのリストを作る
//! let pool = FixedPoolBuilder::new().capacity(256 * 1024).build()?;
//!
//! let mut numbers = PoolList::new(&pool);
//! for i in 1..=5 {
//!     numbers.push_back(i * 10)?;
//! }
//! numbers.push_front(5)?;
//! assert_eq!(numbers.pop_back(), Some(50));
//! assert_eq!(numbers.iter().copied().collect::<Vec<_>>(), [5, 10, 20, 30, 40]);
//!
//! let mut names = PoolList::new(&pool);
//! names.push_back("foo".to_string())?;
//! names.push_back("bar".to_string())?;
//! assert_eq!(names.len(), 2);
//!
//! names.clear();
//! numbers.clear();
//! # Ok(())
//! # }
//! ```
//!
//! [alloc]: ./alloc/index.html
//! [pool]: ./pool/index.html
//! [list]: ./list/index.html
//! [FixedPool]: ./pool/struct.FixedPool.html
//! [PoolList]: ./list/struct.PoolList.html
//! [BlockAllocator]: ./alloc/trait.BlockAllocator.html
//! [HeapAllocator]: ./alloc/struct.HeapAllocator.html
#![warn(missing_docs)]
#[macro_use]
extern crate trackable;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

pub mod alloc;
pub mod list;
pub mod pool;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
