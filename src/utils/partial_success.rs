//! Type aliases for operations that support partial success/failure patterns.
//! Building a graph keeps going past a broken module; these shapes carry the
//! result together with the diagnostics of the parts that were left out.

/// Represents a successful operation where some parts failed but didn't prevent overall success.
/// The `Vec<E>` contains errors from the failed parts that were handled gracefully.
pub type PartialSuccess<T, E> = ( T, Vec<E> );

/// Represents an operation that may partially succeed or fail.
/// Ok: Core success data plus errors from partial failures that allowed completion.
/// Err: Primary failure cause plus errors that were collected before it.
pub type PartialResult<T, E> = Result<( T, Vec<E> ), ( E, Vec<E> )>;
