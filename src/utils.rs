use fnv::FnvHasher;
use rand::{Rng, RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::{
    collections::{HashMap, HashSet},
    hash::{BuildHasherDefault, Hash}
};

pub type FnvHashSet<T> = HashSet<T, BuildHasherDefault<FnvHasher>>;
pub type FnvHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FnvHasher>>;

/// Construct a hash set with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers and small strings.
pub fn fnv_hashset<T: Hash + Eq>(capacity: usize) -> FnvHashSet<T> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashSet::<T, _>::with_capacity_and_hasher(capacity, fnv)
}

/// Construct a hash map with the specified capacity. The hashing algorithm is much faster than the default
/// on short keys such as integers and small strings.
pub fn fnv_hashmap<K: Hash + Eq, V>(capacity: usize) -> FnvHashMap<K, V> {
    let fnv = BuildHasherDefault::<FnvHasher>::default();
    HashMap::<K, V, _>::with_capacity_and_hasher(capacity, fnv)
}

/// The single random stream a maze is built from.
///
/// Every draw the generator, the repair pass and the layout make goes through here in a
/// fixed order, so the same seed hash always reproduces the same maze. Integer draws are
/// taken from 32 bit words so the results do not depend on the platform's pointer width.
#[derive(Debug, Clone)]
pub struct MazeRng {
    rng: XorShiftRng,
}

impl MazeRng {
    pub fn new(seed_hash: i32) -> MazeRng {
        MazeRng { rng: XorShiftRng::seed_from_u64(u64::from(seed_hash as u32)) }
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn value(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform integer in `[low, high)`. An empty range yields `low`.
    #[inline]
    pub fn range(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u32;
        low + (self.rng.next_u32() % span) as usize
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.value() < p
    }
}
