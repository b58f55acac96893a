//! Key Deriver
//!
//! Turns a call's arguments into the key its result is cached under.
//!
//! The default scheme writes one `index:tag:repr` segment per positional
//! argument. Primitives are keyed by value, `Ref` values by identity.

mod arg;


pub use arg::{Arg, Ref};

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::warn;

/// Key shared by calls without arguments and calls with a single
/// undefined argument.
pub const DEFAULT_KEY: &str = "__default__";

const SEGMENT_DELIMITER: char = ',';

/// Source of one-off keys for arguments that cannot be serialized
static UNSERIALIZABLE: AtomicU64 = AtomicU64::new(0);

// == Key Part ==
/// Keyed form of one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    Undefined,
    Null,
    Boolean(bool),
    /// Canonical decimal text of the number
    Number(String),
    String(String),
    /// Identity of a `Ref`
    Object(u64),
}

impl KeyPart {
    /// Returns the type tag written into the key.
    pub fn tag(&self) -> &'static str {
        match self {
            KeyPart::Undefined => "undefined",
            KeyPart::Null => "null",
            KeyPart::Boolean(_) => "boolean",
            KeyPart::Number(_) => "number",
            KeyPart::String(_) => "string",
            KeyPart::Object(_) => "object",
        }
    }

    fn write_repr(&self, out: &mut String) {
        // Writing into a String cannot fail
        let _ = match self {
            KeyPart::Undefined | KeyPart::Null => Ok(()),
            KeyPart::Boolean(value) => write!(out, "{value}"),
            KeyPart::Number(text) => write!(out, "{text}"),
            // Quoted and escaped so a delimiter inside the text never reads
            // as a segment boundary
            KeyPart::String(text) => write!(out, "{text:?}"),
            KeyPart::Object(id) => write!(out, "#{id}"),
        };
    }
}

// == Key Arg ==
/// A single argument that can take part in a default cache key.
pub trait KeyArg {
    fn key_part(&self) -> KeyPart;
}

macro_rules! number_key_arg {
    ($($ty:ty),*) => {
        $(
            impl KeyArg for $ty {
                fn key_part(&self) -> KeyPart {
                    KeyPart::Number(self.to_string())
                }
            }
        )*
    };
}

number_key_arg!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl KeyArg for bool {
    fn key_part(&self) -> KeyPart {
        KeyPart::Boolean(*self)
    }
}

impl KeyArg for char {
    fn key_part(&self) -> KeyPart {
        KeyPart::String(self.to_string())
    }
}

impl KeyArg for str {
    fn key_part(&self) -> KeyPart {
        KeyPart::String(self.to_string())
    }
}

impl KeyArg for String {
    fn key_part(&self) -> KeyPart {
        KeyPart::String(self.clone())
    }
}

impl<T: KeyArg> KeyArg for Option<T> {
    fn key_part(&self) -> KeyPart {
        match self {
            Some(value) => value.key_part(),
            None => KeyPart::Undefined,
        }
    }
}

impl<T: ?Sized> KeyArg for Ref<T> {
    fn key_part(&self) -> KeyPart {
        KeyPart::Object(self.id())
    }
}

impl KeyArg for Arg {
    fn key_part(&self) -> KeyPart {
        match self {
            Arg::Undefined => KeyPart::Undefined,
            Arg::Null => KeyPart::Null,
            Arg::Bool(value) => value.key_part(),
            Arg::Number(value) => value.key_part(),
            Arg::String(value) => value.key_part(),
            Arg::Ref(value) => value.key_part(),
        }
    }
}

impl<T: KeyArg + ?Sized> KeyArg for &T {
    fn key_part(&self) -> KeyPart {
        (**self).key_part()
    }
}

// == Key Args ==
/// A full argument list: `()`, a tuple of `KeyArg`s, or a single `KeyArg`.
pub trait KeyArgs {
    fn key_parts(&self) -> Vec<KeyPart>;
}

impl KeyArgs for () {
    fn key_parts(&self) -> Vec<KeyPart> {
        Vec::new()
    }
}

macro_rules! tuple_key_args {
    ($($name:ident),+) => {
        impl<$($name: KeyArg),+> KeyArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn key_parts(&self) -> Vec<KeyPart> {
                let ($($name,)+) = self;
                vec![$($name.key_part()),+]
            }
        }
    };
}

tuple_key_args!(A);
tuple_key_args!(A, B);
tuple_key_args!(A, B, C);
tuple_key_args!(A, B, C, D);
tuple_key_args!(A, B, C, D, E);
tuple_key_args!(A, B, C, D, E, F);
tuple_key_args!(A, B, C, D, E, F, G);
tuple_key_args!(A, B, C, D, E, F, G, H);

macro_rules! single_key_args {
    ($($ty:ty),*) => {
        $(
            impl KeyArgs for $ty {
                fn key_parts(&self) -> Vec<KeyPart> {
                    vec![self.key_part()]
                }
            }
        )*
    };
}

single_key_args!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, Arg
);

impl<T: KeyArg> KeyArgs for Option<T> {
    fn key_parts(&self) -> Vec<KeyPart> {
        vec![self.key_part()]
    }
}

impl<T: ?Sized> KeyArgs for Ref<T> {
    fn key_parts(&self) -> Vec<KeyPart> {
        vec![self.key_part()]
    }
}

impl<T: KeyArg + ?Sized> KeyArgs for &T {
    fn key_parts(&self) -> Vec<KeyPart> {
        vec![self.key_part()]
    }
}

// Variadic argument lists
impl<T: KeyArg> KeyArgs for [T] {
    fn key_parts(&self) -> Vec<KeyPart> {
        self.iter().map(KeyArg::key_part).collect()
    }
}

impl<T: KeyArg> KeyArgs for Vec<T> {
    fn key_parts(&self) -> Vec<KeyPart> {
        self.as_slice().key_parts()
    }
}

// == Derive Key ==
/// Derives the default cache key for an argument list.
///
/// Never panics. Lists that differ in length, position or argument type
/// produce different keys even when the textual values coincide.
pub fn derive_key<A: KeyArgs + ?Sized>(args: &A) -> String {
    let parts = args.key_parts();
    if matches!(parts.as_slice(), [] | [KeyPart::Undefined]) {
        return DEFAULT_KEY.to_string();
    }

    let mut key = String::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            key.push(SEGMENT_DELIMITER);
        }
        let _ = write!(key, "{index}:{}:", part.tag());
        part.write_repr(&mut key);
    }
    key
}

// == JSON Key ==
/// Structural key function: serializes the arguments as JSON.
///
/// Intended for `Options::with_cache_key(json_key)` when arguments should
/// compare by content rather than identity. Arguments that fail to
/// serialize get a key no other call shares, so they are never answered
/// from the cache.
pub fn json_key<A: Serialize + ?Sized>(args: &A) -> String {
    serde_json::to_string(args).unwrap_or_else(|err| {
        warn!("Arguments could not be serialized into a cache key: {}", err);
        let id = UNSERIALIZABLE.fetch_add(1, Ordering::Relaxed);
        format!("!{id}:{err}")
    })
}
