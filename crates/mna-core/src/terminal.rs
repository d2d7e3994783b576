use std::fmt::Debug;
use std::hash::Hash;

/// An opaque node identifier. A terminal label can be an integer, a tuple,
/// or any other type the caller finds convenient; the engine never
/// interprets it beyond equality and hashing.
pub trait Terminal: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Terminal for T {}
