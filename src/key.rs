//! Entry keys for [`KeyedCache`](crate::store::keyed::KeyedCache).
//!
//! Writes accept either an integer or a string key through [`CacheKey`].
//! Reads (`get`/`has`) accept integer keys only, see [`IntKey`].

use std::fmt;
use std::num::TryFromIntError;

/// Integer key accepted by the read path.
pub type IntKey = i64;

/// Key accepted by the write path: an integer or a string.
///
/// Integer and string keys occupy separate key spaces, so `Int(1)` and
/// `Str("1")` are different entries.
///
/// ```
/// use cache_registry::key::CacheKey;
///
/// assert_eq!(CacheKey::from(7), CacheKey::Int(7));
/// assert_eq!(CacheKey::from("passage"), CacheKey::Str("passage".into()));
/// assert_ne!(CacheKey::from(1), CacheKey::from("1"));
///
/// // `u64` and `usize` ids convert fallibly
/// let ids = vec![10, 20, 30];
/// assert_eq!(CacheKey::try_from(ids.len()), Ok(CacheKey::Int(3)));
/// assert!(CacheKey::try_from(u64::MAX).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    Int(IntKey),
    Str(String),
}

impl CacheKey {
    /// Returns the integer payload, if this is an integer key.
    #[inline]
    pub fn as_int(&self) -> Option<IntKey> {
        match self {
            CacheKey::Int(id) => Some(*id),
            CacheKey::Str(_) => None,
        }
    }

    /// Returns the string payload, if this is a string key.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheKey::Int(_) => None,
            CacheKey::Str(s) => Some(s.as_str()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Int(id) => write!(f, "{id}"),
            CacheKey::Str(s) => write!(f, "{s:?}"),
        }
    }
}

macro_rules! int_key_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CacheKey {
                #[inline]
                fn from(id: $t) -> Self {
                    CacheKey::Int(IntKey::from(id))
                }
            }
        )*
    };
}

// Only lossless conversions into `i64`. Wider unsigned ids (`u64`,
// `usize`) go through `TryFrom` and fail above `i64::MAX`.
int_key_from!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! int_key_try_from {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for CacheKey {
                type Error = TryFromIntError;

                #[inline]
                fn try_from(id: $t) -> Result<Self, Self::Error> {
                    IntKey::try_from(id).map(CacheKey::Int)
                }
            }
        )*
    };
}

int_key_try_from!(u64, usize);

impl From<&str> for CacheKey {
    #[inline]
    fn from(s: &str) -> Self {
        CacheKey::Str(s.to_owned())
    }
}

impl From<String> for CacheKey {
    #[inline]
    fn from(s: String) -> Self {
        CacheKey::Str(s)
    }
}

impl From<&String> for CacheKey {
    #[inline]
    fn from(s: &String) -> Self {
        CacheKey::Str(s.clone())
    }
}
