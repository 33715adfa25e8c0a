mod bitmask;

pub use bitmask::{Bitmask, Iter};

/// A fieldless enum whose variants map onto distinct bits of a `u64`.
pub trait Bitable: Copy {
    fn bit(&self) -> u64;
    fn index(&self) -> u32;
    fn from_index(index: u32) -> Option<Self>;
}
