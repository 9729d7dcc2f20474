//! Function wrappers that capture every call before running it.

use crate::core::error::SylteError;
use crate::core::ident::CallId;
use crate::core::store::{Store, default_store};
use crate::core::value::{Payload, ToPayload};
use std::panic::Location;

/// A callable that accepts its arguments packed as `Args`.
///
/// Implemented for plain functions and closures of up to eight arguments (packed
/// as a tuple) and for functions taking a whole [`Payload`].
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

impl<F, R> Invoke<()> for F
where
    F: Fn() -> R,
{
    type Output = R;

    fn invoke(&self, _args: ()) -> R {
        self()
    }
}

impl<F, R> Invoke<Payload> for F
where
    F: Fn(Payload) -> R,
{
    type Output = R;

    fn invoke(&self, args: Payload) -> R {
        self(args)
    }
}

macro_rules! impl_invoke {
    ($($name:ident),+) => {
        impl<Func, Ret, $($name),+> Invoke<($($name,)+)> for Func
        where
            Func: Fn($($name),+) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($name,)+): ($($name,)+)) -> Ret {
                self($($name),+)
            }
        }
    };
}

impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, F);
impl_invoke!(A, B, C, D, E, F, G);
impl_invoke!(A, B, C, D, E, F, G, H);

/// A function whose every call is persisted to a [`Store`] before it runs.
///
/// Identifiers record the source file of each call site, so one wrapper shared
/// across modules still tells its callers apart.
#[derive(Debug, Clone)]
pub struct Sylted<F> {
    store: Option<Store>,
    name: String,
    func: F,
}

impl<F> Sylted<F> {
    pub fn new(store: Store, name: impl Into<String>, func: F) -> Self {
        Self {
            store: Some(store),
            name: name.into(),
            func,
        }
    }

    /// Wrap `func` against the process-wide store, resolved at the first call.
    pub fn with_default_store(name: impl Into<String>, func: F) -> Self {
        Self {
            store: None,
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> Result<&Store, SylteError> {
        match &self.store {
            Some(store) => Ok(store),
            None => default_store(),
        }
    }

    /// Capture `args`, then call the wrapped function with them.
    ///
    /// The function does not run when the capture fails.
    #[track_caller]
    pub fn call<A>(&self, args: A) -> Result<F::Output, SylteError>
    where
        A: ToPayload,
        F: Invoke<A>,
    {
        self.capture(&args)?;
        Ok(self.func.invoke(args))
    }

    /// Persist `args` without calling the wrapped function.
    #[track_caller]
    pub fn capture<A: ToPayload>(&self, args: &A) -> Result<CallId, SylteError> {
        let caller = Location::caller().file();
        self.store()?.capture(caller, &self.name, &args.to_payload())
    }
}

/// Wrap a function so each call is captured before it runs.
///
/// `sylt!(func)` uses the process-wide store; `sylt!(store, func)` an explicit
/// one.
///
/// ```no_run
/// fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// let add = sylte::sylt!(add);
/// assert_eq!(add.call((3_i64, 7_i64)).unwrap(), 10);
/// ```
#[macro_export]
macro_rules! sylt {
    ($store:expr, $func:path) => {
        $crate::Sylted::new(
            ::std::clone::Clone::clone(&$store),
            stringify!($func),
            $func,
        )
    };
    ($func:path) => {
        $crate::Sylted::with_default_store(stringify!($func), $func)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn add(a: i64, b: i64) -> i64 {
        a + b
    }

    #[test]
    fn test_call_is_transparent() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let wrapped = Sylted::new(store.clone(), "add", add);
        assert_eq!(wrapped.call((3_i64, 7_i64)).unwrap(), 10);

        let ids = store.list("").unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].as_str().starts_with("capture-add-"));
        assert_eq!(
            store.unsylt(ids[0].as_str()).unwrap().args,
            vec![Value::Int(3), Value::Int(7)]
        );
    }

    #[test]
    fn test_macro_records_call_site_file() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let wrapped = crate::sylt!(store, add);
        assert_eq!(wrapped.name(), "add");
        wrapped.call((1_i64, 2_i64)).unwrap();
        assert_eq!(store.list("capture-add-").unwrap().len(), 1);
    }

    #[test]
    fn test_payload_functions_receive_kwargs() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let wrapped = Sylted::new(store.clone(), "scale", |p: Payload| {
            p.kwargs.get("factor").cloned()
        });
        let out = wrapped.call(Payload::new().arg(4).kwarg("factor", 2)).unwrap();
        assert_eq!(out, Some(Value::Int(2)));
        let stored = store.latest("scale").unwrap().unwrap();
        assert_eq!(stored.kwargs["factor"], Value::Int(2));
    }

    #[test]
    fn test_failed_capture_skips_the_call() {
        let tmp = tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let ran = Cell::new(false);
        let wrapped = Sylted::new(Store::new(blocker.join("store")), "f", || {
            ran.set(true)
        });
        assert!(wrapped.call(()).is_err());
        assert!(!ran.get());
    }
}
