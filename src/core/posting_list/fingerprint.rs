use std::fmt::{self, Write};
use std::hash::Hasher;

use fnv::FnvHasher;
use serde::{Deserialize, Serialize};

use crate::RowId;

/// Deterministic 64-bit digest of a posting list's contents.
///
/// Order sensitive and not collision free: two different lists may share a
/// fingerprint, in which case the evaluator keeps the last one it records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Feeds formatted text straight into a hasher.
struct HashWriter<H: Hasher>(H);

impl<H: Hasher> Write for HashWriter<H> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write(s.as_bytes());
        Ok(())
    }
}

/// Hash each row id's decimal form, `\n` terminated, with FNV-1a 64.
///
/// The terminator keeps `[1, 23]` and `[12, 3]` apart.
pub fn fingerprint(refs: &[RowId]) -> Fingerprint {
    let mut writer = HashWriter(FnvHasher::default());
    for row_id in refs {
        // `HashWriter::write_str` is infallible.
        let _ = writeln!(writer, "{}", row_id);
    }
    Fingerprint(writer.0.finish())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let refs: Vec<RowId> = (0..1000).map(|i| i * 3 + 7).collect();
        assert_eq!(fingerprint(&refs), fingerprint(&refs.clone()));
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let refs: Vec<RowId> = (1..=64).collect();
        let mut shuffled = refs.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(42));
        assert_ne!(refs, shuffled);
        assert_ne!(fingerprint(&refs), fingerprint(&shuffled));

        assert_ne!(fingerprint(&[1, 2]), fingerprint(&[2, 1]));
    }

    #[test]
    fn test_fingerprint_digit_boundaries() {
        assert_ne!(fingerprint(&[1, 23]), fingerprint(&[12, 3]));
        assert_ne!(fingerprint(&[123]), fingerprint(&[1, 2, 3]));
    }

    #[test]
    fn test_fingerprint_empty_and_small_lists_differ() {
        let lists: Vec<Vec<RowId>> = vec![vec![], vec![0], vec![1, 2, 3], vec![10, 20, 30, 40]];
        let prints = lists.iter().map(|l| fingerprint(l)).collect::<HashSet<_>>();
        assert_eq!(prints.len(), lists.len());
    }

    #[test]
    fn test_fingerprint_display() {
        assert_eq!(Fingerprint(0xab).to_string(), "00000000000000ab");
    }
}
