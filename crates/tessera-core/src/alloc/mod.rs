//! Hash collections used throughout Tessera.
//!
//! The geometry builders key maps by small integer tuples (edge endpoints,
//! quantized coordinates), where AHash is considerably faster than SipHash.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet};
