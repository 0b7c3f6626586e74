//! Typed keys for attaching analysis results to AST nodes

use std::fmt;
use std::marker::PhantomData;

/// Key of a node annotation holding values of type `T`
///
/// Keys are plain values compared by name. Declare them with
/// [`annotations!`](crate::annotations) so the name always matches the
/// constant.
pub struct Annotation<T> {
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Annotation<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Annotation<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Annotation<T> {}

impl<T> PartialEq for Annotation<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Annotation<T> {}

impl<T> fmt::Debug for Annotation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.name, std::any::type_name::<T>())
    }
}

impl<T> fmt::Display for Annotation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares annotation key constants named after themselves
///
/// ```
/// use contracts_core::annotations;
///
/// annotations! {
///     pub CONSTANT_VALUE: i64;
///     pub(crate) VISITED: bool;
/// }
///
/// assert_eq!(CONSTANT_VALUE.name(), "CONSTANT_VALUE");
/// ```
#[macro_export]
macro_rules! annotations {
    ($( $(#[$meta:meta])* $vis:vis $name:ident : $ty:ty; )+) => {
        $(
            $(#[$meta])*
            $vis const $name: $crate::annotation::Annotation<$ty> =
                $crate::annotation::Annotation::new(stringify!($name));
        )+
    };
}
