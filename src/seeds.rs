use sha2::{Digest, Sha256};

use crate::utils::MazeRng;

/// Turn a seed string into the integer the random stream is seeded with.
///
/// A string holding a decimal `i32` is used as is. Anything else is hashed with
/// SHA-256, re-hashing the digest `computations - 1` extra times, and the first four
/// bytes of the final digest are read as a little endian `i32`.
pub fn compute_seed(seed: &str, computations: usize) -> i32 {
    if let Ok(hash) = seed.trim().parse::<i32>() {
        return hash;
    }

    let mut digest = Sha256::digest(seed.as_bytes());
    for _ in 1..computations {
        digest = Sha256::digest(&digest);
    }
    i32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

const ADJECTIVES: &[&str] = &[
    "Amber", "Ancient", "Bitter", "Brave", "Brittle", "Calm", "Crimson", "Crooked", "Damp",
    "Dusky", "Eager", "Faint", "Fierce", "Gentle", "Gloomy", "Golden", "Hollow", "Hungry",
    "Icy", "Jagged", "Lively", "Lonely", "Mossy", "Muddy", "Narrow", "Noisy", "Pale",
    "Quiet", "Restless", "Rusty", "Silent", "Sleepy", "Sly", "Stony", "Swift", "Tangled",
    "Wandering", "Weary", "Wicked", "Wild",
];

const ANIMALS: &[&str] = &[
    "Badger", "Bat", "Beetle", "Boar", "Crow", "Eel", "Ferret", "Fox", "Gecko", "Hare",
    "Heron", "Lynx", "Mole", "Moth", "Newt", "Otter", "Owl", "Raven", "Salamander", "Shrew",
    "Snail", "Spider", "Stoat", "Toad", "Viper", "Weasel", "Wolf", "Wren",
];

/// A readable seed such as `MossyQuietOtter` for when the user gives none.
pub fn random_seed(rng: &mut MazeRng) -> String {
    let first = ADJECTIVES[rng.range(0, ADJECTIVES.len())];
    let second = ADJECTIVES[rng.range(0, ADJECTIVES.len())];
    let animal = ANIMALS[rng.range(0, ANIMALS.len())];
    [first, second, animal].concat()
}
