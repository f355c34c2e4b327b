use crate::error::Result;
use crate::runtime::Scope;

/// A state container with one instance per [`Scope`].
///
/// Implementors are cheap handles (usually a few signals and memos), so the
/// instance kept by the scope and the copies handed out share their state.
///
/// # Examples
///
/// ```
/// use tally::{Memo, Scope, Signal, Store};
///
/// #[derive(Clone)]
/// struct Cart {
///     items: Signal<Vec<u32>>,
///     total: Memo<u32>,
/// }
///
/// impl Store for Cart {
///     const ID: &'static str = "cart";
///
///     fn setup(scope: &Scope) -> Self {
///         let items = scope.signal(Vec::new());
///         let total = scope.memo({
///             let items = items.clone();
///             move || items.with(|items| items.iter().sum::<u32>())
///         });
///         Self { items, total }
///     }
/// }
///
/// let scope = Scope::new();
/// let cart = scope.use_store::<Cart>().unwrap();
/// cart.items.update(|items| items.push(3));
///
/// let same_cart = scope.use_store::<Cart>().unwrap();
/// assert_eq!(same_cart.total.get(), 3);
/// ```
pub trait Store: Clone + 'static {
    /// Registry key, unique within a scope.
    const ID: &'static str;

    /// Build the store's state. Called once per scope, on first use.
    fn setup(scope: &Scope) -> Self;
}

/// Get the active scope's instance of `S`.
///
/// Fails with [`Error::NoActiveScope`](crate::Error::NoActiveScope) outside
/// [`Scope::run`].
pub fn use_store<S: Store>() -> Result<S> {
    Scope::current()?.use_store::<S>()
}
