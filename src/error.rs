use trackable::error::ErrorKindExt;

/// crate固有のエラー型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(trackable::error::TrackableError<ErrorKind>);
impl From<std::alloc::LayoutError> for Error {
    fn from(e: std::alloc::LayoutError) -> Self {
        ErrorKind::InvalidInput.cause(e).into()
    }
}

/// 発生し得るエラーの種別.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// プールに要求を満たせるだけの空き領域がない.
    ///
    /// 解放済みの領域は併合された上で再利用されるが、
    /// それでも足りない場合にはこのエラーが返される.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者が不要なブロック(ないしノード)を解放する
    /// - より大きな容量を指定してプールを構築し直す
    PoolExhausted,

    /// 入力が不正.
    ///
    /// サイズが0の確保要求や、二の冪ではないアライメント指定等が該当する.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側のプログラムを修正して入力を正しくする
    InvalidInput,

    /// その他エラー.
    ///
    /// # 典型的な対応策
    ///
    /// - エラーの詳細(原因)を確認して個別に対処する
    Other,
}
impl trackable::error::ErrorKind for ErrorKind {}
