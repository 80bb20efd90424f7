//! Sentinel policies: where the reserved "empty" key comes from.
//!
//! A slot is empty exactly when its key compares equal to the table's
//! sentinel. Every policy here produces that key. The table builds the
//! marker once at construction and keeps it for comparisons; each slot it
//! vacates or allocates gets a copy through [`Sentinel::clone_marker`].
//!
//! Inserting a key equal to the sentinel is a caller error. Debug builds
//! assert on it; release builds do not check.

/// Source of the reserved key value marking an unoccupied slot.
pub trait Sentinel<K> {
    fn empty_marker(&self) -> K;

    /// Marker for one more empty slot, given the table's cached copy.
    ///
    /// Policies whose marker is costly to build override this to clone.
    #[inline]
    fn clone_marker(&self, marker: &K) -> K {
        let _ = marker;
        self.empty_marker()
    }
}

/// Key types with a naturally unused value.
///
/// Implemented for the primitive integers (`MAX`), `char` (`U+FFFF`, a
/// noncharacter), raw pointers (null), and the owning or borrowed text and
/// byte containers (empty). Implement it for your own enums to give them a
/// spare variant as sentinel.
pub trait ReservedKey {
    fn reserved() -> Self;
}

/// Default policy: delegates to [`ReservedKey`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Reserved;

impl<K: ReservedKey> Sentinel<K> for Reserved {
    #[inline]
    fn empty_marker(&self) -> K {
        K::reserved()
    }
}

/// Integer literal sentinel fixed at the type level.
///
/// The constant is converted with `as`, so `Const<-1>` on an unsigned key is
/// that type's `MAX`.
///
/// ```
/// use sentinel_hashmap::{Const, OpenHashMap};
///
/// let mut m: OpenHashMap<u32, u32, Const<-1>> = OpenHashMap::new();
/// m.insert(0, 1);
/// assert!(m.contains_key(&0));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Const<const N: i128>;

/// Runtime literal sentinel; each empty slot receives a clone.
#[derive(Clone, Debug, Default)]
pub struct Literal<K>(pub K);

impl<K: Clone> Sentinel<K> for Literal<K> {
    #[inline]
    fn empty_marker(&self) -> K {
        self.0.clone()
    }

    #[inline]
    fn clone_marker(&self, marker: &K) -> K {
        marker.clone()
    }
}

/// Key transform: builds the sentinel from a lightweight token.
///
/// The transform runs once per table, when it is constructed; empty slots
/// receive clones of that result.
///
/// Useful when the key type has no literal to spare but can be constructed
/// from something cheap, e.g. a placeholder path or a null-like handle.
///
/// ```
/// use sentinel_hashmap::{OpenHashMap, Transform};
/// use std::path::PathBuf;
///
/// fn from_token(t: &&'static str) -> PathBuf {
///     PathBuf::from(*t)
/// }
///
/// type Z = Transform<&'static str, fn(&&'static str) -> PathBuf>;
/// let sentinel: Z = Transform::new("\0", from_token);
/// let mut m: OpenHashMap<PathBuf, u8, Z> = OpenHashMap::with_sentinel(sentinel);
/// m.insert(PathBuf::from("/tmp"), 1);
/// assert_eq!(m.get(std::path::Path::new("/tmp")), Some(&1));
/// ```
#[derive(Clone, Debug)]
pub struct Transform<T, F> {
    token: T,
    f: F,
}

impl<T, F> Transform<T, F> {
    pub fn new(token: T, f: F) -> Self {
        Self { token, f }
    }

    pub fn token(&self) -> &T {
        &self.token
    }
}

impl<K, T, F> Sentinel<K> for Transform<T, F>
where
    K: Clone,
    F: Fn(&T) -> K,
{
    #[inline]
    fn empty_marker(&self) -> K {
        (self.f)(&self.token)
    }

    #[inline]
    fn clone_marker(&self, marker: &K) -> K {
        marker.clone()
    }
}

macro_rules! reserved_int {
    ($($t:ty),* $(,)?) => {$(
        impl ReservedKey for $t {
            #[inline]
            fn reserved() -> Self {
                <$t>::MAX
            }
        }

        impl<const N: i128> Sentinel<$t> for Const<N> {
            #[inline]
            fn empty_marker(&self) -> $t {
                N as $t
            }
        }
    )*};
}

reserved_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl ReservedKey for char {
    #[inline]
    fn reserved() -> Self {
        '\u{FFFF}'
    }
}

impl<T> ReservedKey for *const T {
    #[inline]
    fn reserved() -> Self {
        core::ptr::null()
    }
}

impl<T> ReservedKey for *mut T {
    #[inline]
    fn reserved() -> Self {
        core::ptr::null_mut()
    }
}

impl ReservedKey for String {
    #[inline]
    fn reserved() -> Self {
        String::new()
    }
}

impl ReservedKey for Box<str> {
    #[inline]
    fn reserved() -> Self {
        Box::from("")
    }
}

impl ReservedKey for &str {
    #[inline]
    fn reserved() -> Self {
        ""
    }
}

impl<T> ReservedKey for Vec<T> {
    #[inline]
    fn reserved() -> Self {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_values() {
        assert_eq!(<Reserved as Sentinel<u32>>::empty_marker(&Reserved), u32::MAX);
        assert_eq!(<Reserved as Sentinel<i8>>::empty_marker(&Reserved), i8::MAX);
        assert_eq!(<Reserved as Sentinel<String>>::empty_marker(&Reserved), "");
        assert_eq!(<Reserved as Sentinel<&str>>::empty_marker(&Reserved), "");
        let p: *const u8 = Reserved.empty_marker();
        assert!(p.is_null());
    }

    #[test]
    fn const_literal_wraps_like_as_cast() {
        assert_eq!(<Const<-1> as Sentinel<u32>>::empty_marker(&Const), u32::MAX);
        assert_eq!(<Const<-1> as Sentinel<u8>>::empty_marker(&Const), u8::MAX);
        assert_eq!(<Const<0> as Sentinel<i64>>::empty_marker(&Const), 0);
        assert_eq!(<Const<42> as Sentinel<usize>>::empty_marker(&Const), 42);
    }

    #[test]
    fn literal_clones_value() {
        let lit = Literal(String::from("<none>"));
        let a: String = lit.empty_marker();
        let b: String = lit.empty_marker();
        assert_eq!(a, "<none>");
        assert_eq!(a, b);
    }

    #[test]
    fn transform_runs_on_token() {
        let t = Transform::new(3usize, |n: &usize| "-".repeat(*n));
        let s: String = t.empty_marker();
        assert_eq!(s, "---");
        assert_eq!(*t.token(), 3);
    }

    #[test]
    fn transform_copies_cached_marker() {
        let calls = std::cell::Cell::new(0);
        let t = Transform::new((), |_: &()| {
            calls.set(calls.get() + 1);
            String::from("\0")
        });
        let cached: String = t.empty_marker();
        let copy = t.clone_marker(&cached);
        assert_eq!(copy, cached);
        assert_eq!(calls.get(), 1);
    }
}
