//! プール上にノードを配置する、ジェネリックな双方向連結リスト.
//!
//! このモジュールが提供する[PoolList]は、ノード用のメモリを
//! [BlockAllocator]経由で一つずつ確保する双方向連結リスト.
//!
//! アロケータとして[FixedPool]を束縛すれば全ノードがプール内に置かれ、
//! [HeapAllocator]を束縛すれば通常のヒープ上のリストとして振る舞う.
//! リスト側のコードは両者を区別しない.
//!
//! # Examples
//!
//! ```
//! use fixpool::alloc::HeapAllocator;
//! use fixpool::list::PoolList;
//!
//! # fn main() -> fixpool::Result<()> {
//! #[derive(Debug, Clone, PartialEq)]
//! struct Reading {
//!     sensor: u32,
//!     value: f64,
//! }
//!
//! // プールを使わない場合には、ノードはシステムヒープ上に置かれる
//! let heap = HeapAllocator::new();
//! let mut readings = PoolList::new(&heap);
//! readings.push_back(Reading { sensor: 1, value: 0.5 })?;
//! readings.push_back(Reading { sensor: 2, value: 1.5 })?;
//! readings.push_front(Reading { sensor: 0, value: -0.5 })?;
//! assert_eq!(readings.len(), 3);
//!
//! // 可変走査で値を書き換える
//! for reading in readings.iter_mut() {
//!     reading.value *= 2.0;
//! }
//! assert_eq!(readings.pop_front().map(|r| r.value), Some(-1.0));
//!
//! readings.clear();
//! assert!(readings.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! [PoolList]: ./struct.PoolList.html
//! [BlockAllocator]: ../alloc/trait.BlockAllocator.html
//! [FixedPool]: ../pool/struct.FixedPool.html
//! [HeapAllocator]: ../alloc/struct.HeapAllocator.html
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::alloc::BlockAllocator;
use crate::Result;

struct Node<T> {
    value: T,
    prev: Option<NonNull<Node<T>>>,
    next: Option<NonNull<Node<T>>>,
}

/// プールに対応した、ジェネリックな双方向連結リスト.
///
/// ノードは一つずつ、構築時に束縛された[BlockAllocator]から確保される.
/// ブロックの確保が行われるのは要素の追加時だけであり、
/// 取り除かれたノードのブロックは即座にアロケータへ返却される.
///
/// リストはアロケータを所有せず、参照で束縛するのみである.
/// 「アロケータはリストよりも長生きする」という制約は、借用によってコンパイル時に保証される.
///
/// # Examples
///
/// ```
/// use fixpool::list::PoolList;
/// use fixpool::pool::FixedPool;
///
/// # fn main() -> fixpool::Result<()> {
/// let pool = FixedPool::new(1024)?;
/// let mut list = PoolList::new(&pool);
///
/// list.push_back(5)?;
/// list.push_back(10)?;
/// list.push_back(20)?;
/// assert_eq!(list.pop_back(), Some(20));
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [5, 10]);
/// # Ok(())
/// # }
/// ```
///
/// [BlockAllocator]: ../alloc/trait.BlockAllocator.html
pub struct PoolList<'a, T, A: BlockAllocator> {
    allocator: &'a A,
    head: Option<NonNull<Node<T>>>,
    tail: Option<NonNull<Node<T>>>,
    len: usize,
    _marker: PhantomData<T>,
}
impl<'a, T, A: BlockAllocator> PoolList<'a, T, A> {
    /// `allocator`をノードの置き場所として束縛した、空のリストを生成する.
    ///
    /// この時点ではブロックの確保は行われない.
    pub fn new(allocator: &'a A) -> Self {
        PoolList {
            allocator,
            head: None,
            tail: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// リストの要素数を返す.
    pub fn len(&self) -> usize {
        self.len
    }

    /// リストが空かどうかを判定する.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 末尾に要素を追加する.
    ///
    /// # Errors
    ///
    /// ノード用のブロック確保に失敗した場合には、アロケータのエラーがそのまま返される.
    /// この場合、リストは変更されない.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        let node = track!(self.allocate_node(value))?;
        unsafe {
            (*node.as_ptr()).prev = self.tail;
            match self.tail {
                Some(tail) => (*tail.as_ptr()).next = Some(node),
                None => self.head = Some(node),
            }
        }
        self.tail = Some(node);
        self.len += 1;
        Ok(())
    }

    /// 先頭に要素を追加する.
    ///
    /// # Errors
    ///
    /// ノード用のブロック確保に失敗した場合には、アロケータのエラーがそのまま返される.
    /// この場合、リストは変更されない.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        let node = track!(self.allocate_node(value))?;
        unsafe {
            (*node.as_ptr()).next = self.head;
            match self.head {
                Some(head) => (*head.as_ptr()).prev = Some(node),
                None => self.tail = Some(node),
            }
        }
        self.head = Some(node);
        self.len += 1;
        Ok(())
    }

    /// 末尾の要素を取り除いて返す.
    ///
    /// リストが空の場合には`None`が返される.
    /// 取り除かれたノードのブロックは、即座にアロケータへ返却される.
    pub fn pop_back(&mut self) -> Option<T> {
        let ptr = self.tail?;
        let node = unsafe { self.release_node(ptr) };
        self.tail = node.prev;
        match self.tail {
            Some(tail) => unsafe { (*tail.as_ptr()).next = None },
            None => self.head = None,
        }
        self.len -= 1;
        Some(node.value)
    }

    /// 先頭の要素を取り除いて返す.
    ///
    /// リストが空の場合には`None`が返される.
    /// 取り除かれたノードのブロックは、即座にアロケータへ返却される.
    pub fn pop_front(&mut self) -> Option<T> {
        let ptr = self.head?;
        let node = unsafe { self.release_node(ptr) };
        self.head = node.next;
        match self.head {
            Some(head) => unsafe { (*head.as_ptr()).prev = None },
            None => self.tail = None,
        }
        self.len -= 1;
        Some(node.value)
    }

    /// 全ての要素を取り除く.
    ///
    /// ノードのブロックは先頭から順にアロケータへ返却される.
    /// 空リストに対して呼び出しても何も起こらない.
    pub fn clear(&mut self) {
        let mut next = self.head;
        while let Some(ptr) = next {
            let node = unsafe { self.release_node(ptr) };
            next = node.next;
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// 先頭から末尾へ向かう要素のイテレータを返す.
    ///
    /// イテレータは遅延評価であり、リスト自体に変更を加えることはない.
    /// 何度でも作り直せる.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            _marker: PhantomData,
        }
    }

    /// 先頭から末尾へ向かう、可変参照のイテレータを返す.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head,
            _marker: PhantomData,
        }
    }

    /// リストの中身を丸ごと取り出して、新しいリストとして返す.
    ///
    /// 取り出した後の`self`は空リストとなり、そのまま再利用できる.
    /// ノードの移動はポインタの差し替えだけで行われて、要素の複製は発生しない.
    pub fn take(&mut self) -> Self {
        PoolList {
            allocator: self.allocator,
            head: self.head.take(),
            tail: self.tail.take(),
            len: mem::replace(&mut self.len, 0),
            _marker: PhantomData,
        }
    }

    /// 同じアロケータ上に、全要素を複製した新しいリストを構築する.
    ///
    /// # Errors
    ///
    /// 途中でノードの確保に失敗した場合には、そのエラーが返される.
    /// その時点までに複製されていたノードは、全て解放される.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut list = PoolList::new(self.allocator);
        for value in self {
            track!(list.push_back(value.clone()))?;
        }
        Ok(list)
    }

    fn allocate_node(&self, value: T) -> Result<NonNull<Node<T>>> {
        let block = track!(self
            .allocator
            .acquire(mem::size_of::<Node<T>>(), mem::align_of::<Node<T>>()))?;
        let node = block.cast::<Node<T>>();
        unsafe {
            node.as_ptr().write(Node {
                value,
                prev: None,
                next: None,
            });
        }
        Ok(node)
    }

    // ノードの中身を退避した上で、ブロックをアロケータへ返却する.
    //
    // 呼び出し側は、返ってきた`Node`のリンクを使って接続を修復する必要がある.
    unsafe fn release_node(&self, ptr: NonNull<Node<T>>) -> Node<T> {
        let node = ptr.as_ptr().read();
        self.allocator.release(
            ptr.cast(),
            mem::size_of::<Node<T>>(),
            mem::align_of::<Node<T>>(),
        );
        node
    }
}
impl<'a, T, A: BlockAllocator> Drop for PoolList<'a, T, A> {
    fn drop(&mut self) {
        self.clear();
    }
}
impl<'a, T: fmt::Debug, A: BlockAllocator> fmt::Debug for PoolList<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
impl<'a, 'b, T, A: BlockAllocator> IntoIterator for &'b PoolList<'a, T, A> {
    type Item = &'b T;
    type IntoIter = Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
impl<'a, 'b, T, A: BlockAllocator> IntoIterator for &'b mut PoolList<'a, T, A> {
    type Item = &'b mut T;
    type IntoIter = IterMut<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// [PoolList]の要素を先頭から順に辿るイテレータ.
///
/// 等価(`==`)の判定は「同じノードを指しているかどうか」で行われる.
/// 走破済みのイテレータ同士は、常に等しいと判定される.
///
/// [PoolList]: ./struct.PoolList.html
#[derive(Debug)]
pub struct Iter<'a, T> {
    next: Option<NonNull<Node<T>>>,
    _marker: PhantomData<&'a Node<T>>,
}
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let ptr = self.next?;
        let node = unsafe { &*ptr.as_ptr() };
        self.next = node.next;
        Some(&node.value)
    }
}
impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            next: self.next,
            _marker: PhantomData,
        }
    }
}
impl<'a, T> PartialEq for Iter<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.next == other.next
    }
}
impl<'a, T> Eq for Iter<'a, T> {}

/// [PoolList]の要素を先頭から順に辿る、可変参照のイテレータ.
///
/// [PoolList]: ./struct.PoolList.html
#[derive(Debug)]
pub struct IterMut<'a, T> {
    next: Option<NonNull<Node<T>>>,
    _marker: PhantomData<&'a mut Node<T>>,
}
impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let ptr = self.next?;
        let node = unsafe { &mut *ptr.as_ptr() };
        self.next = node.next;
        Some(&mut node.value)
    }
}
impl<'a, T> PartialEq for IterMut<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.next == other.next
    }
}
impl<'a, T> Eq for IterMut<'a, T> {}
