//! Buffer size calculation

use crate::tuple::{DICT_HEADER_SIZE, TUPLE_HEADER_SIZE};
use crate::tuplet::Tuplet;

/// Minimum buffer size for a dictionary holding values of the given lengths
///
/// One entry per value: `1 + 7 * lengths.len() + sum(lengths)`.
pub fn calc_buffer_size(lengths: &[usize]) -> usize {
    let payload: usize = lengths.iter().sum();
    DICT_HEADER_SIZE + TUPLE_HEADER_SIZE * lengths.len() + payload
}

/// Minimum buffer size needed to serialize `tuplets`
pub fn calc_buffer_size_for_tuplets(tuplets: &[Tuplet<'_>]) -> usize {
    tuplets
        .iter()
        .fold(DICT_HEADER_SIZE, |acc, t| acc + TUPLE_HEADER_SIZE + t.length())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dictionary() {
        assert_eq!(calc_buffer_size(&[]), 1);
        assert_eq!(calc_buffer_size_for_tuplets(&[]), 1);
    }

    #[test]
    fn test_formula() {
        assert_eq!(calc_buffer_size(&[4]), 1 + 7 + 4);
        assert_eq!(calc_buffer_size(&[1, 2, 10]), 1 + 21 + 13);
        assert_eq!(calc_buffer_size(&[0, 0]), 15);
    }

    #[test]
    fn test_tuplets_match_lengths() {
        let tuplets = [
            Tuplet::cstring(1, "hi"),
            Tuplet::integer(2, 5u32),
            Tuplet::bytes(3, &[0; 9]),
        ];
        assert_eq!(
            calc_buffer_size_for_tuplets(&tuplets),
            calc_buffer_size(&[3, 4, 9])
        );
    }
}
