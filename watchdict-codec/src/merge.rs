//! Dictionary merge
//!
//! Merging applies the tuples of a source dictionary to a destination
//! dictionary. Destination tuples keep their positions and are overwritten
//! in place when the source carries the same key; keys that only exist in
//! the source are appended after them in the order they first appear.
//!
//! Repeated keys pair up by position: the k-th destination occurrence of a
//! key takes the k-th source occurrence. The last destination occurrence
//! also absorbs any extra source occurrences, so the last source value wins.
//! An appended key carries its last source value.
//!
//! The merge runs in two passes. The first validates both dictionaries and
//! computes the merged size; the destination is only rewritten once the
//! result is known to fit. A failed merge leaves the destination as it was.

use crate::error::DictError;
use crate::reader::{validate, DictReader};
use crate::tuple::{Tuple, DICT_HEADER_SIZE, MAX_TUPLES};
use crate::writer::DictWriter;

/// Merge `source` into the dictionary held in `dest[..*dest_size]`
///
/// `scratch` receives a copy of the current destination and must be at least
/// as large as it (`OutOfMemory` otherwise). With `update_existing_only`,
/// source keys missing from the destination are dropped.
///
/// `callback` runs once for every source tuple that was applied, in source
/// order. It receives the destination tuple that occurrence was written to,
/// as stored after the merge, and its previous value, or `None` if the key
/// is new. On success `dest_size` holds the new dictionary size.
pub fn merge<F>(
    dest: &mut [u8],
    dest_size: &mut usize,
    source: &[u8],
    update_existing_only: bool,
    scratch: &mut [u8],
    mut callback: F,
) -> Result<(), DictError>
where
    F: FnMut(&Tuple<'_>, Option<&Tuple<'_>>),
{
    if *dest_size > dest.len() {
        return Err(DictError::InvalidArgs);
    }
    let old_len = validate(&dest[..*dest_size])?;
    validate(source)?;
    if old_len > scratch.len() {
        return Err(DictError::OutOfMemory);
    }

    let src = DictReader::new(source)?;

    // Pass 1: size of the merged dictionary
    let old = DictReader::new(&dest[..old_len])?;
    let mut needed = DICT_HEADER_SIZE;
    let mut count = 0usize;
    for (index, tuple) in old.clone().enumerate() {
        let merged = replacement(&old, &src, index, &tuple).unwrap_or(tuple);
        needed += merged.encoded_len();
        count += 1;
    }
    if !update_existing_only {
        for tuple in appended(&old, &src) {
            needed += tuple.encoded_len();
            count += 1;
        }
    }
    if count > MAX_TUPLES || needed > dest.len() {
        return Err(DictError::NotEnoughStorage);
    }

    // Pass 2: rebuild the destination from the saved copy
    scratch[..old_len].copy_from_slice(&dest[..old_len]);
    let old = DictReader::new(&scratch[..old_len])?;

    let mut writer = DictWriter::begin(dest)?;
    for (index, tuple) in old.clone().enumerate() {
        let merged = replacement(&old, &src, index, &tuple).unwrap_or(tuple);
        writer.write_tuple(&merged)?;
    }
    if !update_existing_only {
        for tuple in appended(&old, &src) {
            writer.write_tuple(&tuple)?;
        }
    }
    let new_len = writer.end();
    debug_assert_eq!(new_len, needed);
    *dest_size = new_len;

    let updated = DictReader::new(&dest[..new_len])?;
    for (index, tuple) in src.clone().enumerate() {
        let in_dest = occurrences(&old, tuple.key);
        if in_dest == 0 {
            if update_existing_only {
                continue;
            }
            if let Some(current) = updated.find(tuple.key) {
                callback(&current, None);
            }
            continue;
        }
        let target = occurrence_index(&src, index, tuple.key).min(in_dest - 1);
        let previous = nth_with_key(&old, tuple.key, target);
        if let Some(current) = nth_with_key(&updated, tuple.key, target) {
            callback(&current, previous.as_ref());
        }
    }
    Ok(())
}

/// [`merge`] with an `N`-byte scratch buffer on the stack
pub fn merge_on_stack<const N: usize, F>(
    dest: &mut [u8],
    dest_size: &mut usize,
    source: &[u8],
    update_existing_only: bool,
    callback: F,
) -> Result<(), DictError>
where
    F: FnMut(&Tuple<'_>, Option<&Tuple<'_>>),
{
    let mut scratch = [0u8; N];
    merge(
        dest,
        dest_size,
        source,
        update_existing_only,
        &mut scratch,
        callback,
    )
}

/// Number of tuples in `reader` carrying `key`
fn occurrences(reader: &DictReader<'_>, key: u32) -> usize {
    reader.clone().filter(|t| t.key == key).count()
}

/// The `n`-th tuple (from zero) in `reader` carrying `key`
fn nth_with_key<'a>(reader: &DictReader<'a>, key: u32, n: usize) -> Option<Tuple<'a>> {
    reader.clone().filter(|t| t.key == key).nth(n)
}

/// How many tuples before position `index` in `reader` carry `key`
fn occurrence_index(reader: &DictReader<'_>, index: usize, key: u32) -> usize {
    reader.clone().take(index).filter(|t| t.key == key).count()
}

/// Source value for the destination tuple at position `index`, if any
fn replacement<'a>(
    old: &DictReader<'_>,
    src: &DictReader<'a>,
    index: usize,
    tuple: &Tuple<'_>,
) -> Option<Tuple<'a>> {
    let nth = occurrence_index(old, index, tuple.key);
    let pick = if nth + 1 == occurrences(old, tuple.key) {
        nth.max(occurrences(src, tuple.key).saturating_sub(1))
    } else {
        nth
    };
    nth_with_key(src, tuple.key, pick)
}

/// Source tuples whose key is absent from `old`, one per key, in order of
/// first appearance and carrying the last value for that key
fn appended<'a, 'b>(
    old: &'b DictReader<'a>,
    src: &'b DictReader<'a>,
) -> impl Iterator<Item = Tuple<'a>> + 'b {
    src.clone()
        .enumerate()
        .filter(move |(index, tuple)| {
            old.find(tuple.key).is_none() && occurrence_index(src, *index, tuple.key) == 0
        })
        .filter_map(move |(_, tuple)| {
            let last = occurrences(src, tuple.key).saturating_sub(1);
            nth_with_key(src, tuple.key, last)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::serialize_tuplets_to_buffer;
    use crate::tuplet::Tuplet;
    use heapless::{String, Vec};

    type Change = (u32, String<8>, Option<String<8>>);

    fn text(s: &str) -> String<8> {
        let mut out = String::new();
        out.push_str(s).unwrap();
        out
    }

    fn dict(tuplets: &[Tuplet<'_>], buf: &mut [u8]) -> usize {
        serialize_tuplets_to_buffer(tuplets, buf).unwrap()
    }

    fn contents(buf: &[u8]) -> Vec<(u32, String<8>), 8> {
        let mut out = Vec::new();
        for tuple in DictReader::new(buf).unwrap() {
            out.push((tuple.key, text(tuple.as_cstr().unwrap()))).unwrap();
        }
        out
    }

    fn run(
        dest: &mut [u8],
        dest_size: &mut usize,
        source: &[u8],
        update_existing_only: bool,
    ) -> (Result<(), DictError>, Vec<Change, 8>) {
        let mut changes = Vec::<Change, 8>::new();
        let result = merge_on_stack::<128, _>(
            dest,
            dest_size,
            source,
            update_existing_only,
            |new, old| {
                let old = old.map(|t| text(t.as_cstr().unwrap()));
                changes
                    .push((new.key, text(new.as_cstr().unwrap()), old))
                    .unwrap();
            },
        );
        (result, changes)
    }

    #[test]
    fn test_merge_appends_and_overwrites() {
        let mut dest = [0u8; 128];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a"), Tuplet::cstring(2, "b")], &mut dest);
        let mut src = [0u8; 64];
        let src_size = dict(&[Tuplet::cstring(2, "c"), Tuplet::cstring(3, "d")], &mut src);

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        result.unwrap();

        assert_eq!(
            &contents(&dest[..dest_size])[..],
            &[(1, text("a")), (2, text("c")), (3, text("d"))]
        );
        assert_eq!(
            &changes[..],
            &[(2, text("c"), Some(text("b"))), (3, text("d"), None)]
        );
    }

    #[test]
    fn test_merge_update_existing_only() {
        let mut dest = [0u8; 128];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a"), Tuplet::cstring(2, "b")], &mut dest);
        let mut src = [0u8; 64];
        let src_size = dict(&[Tuplet::cstring(2, "c"), Tuplet::cstring(3, "d")], &mut src);

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], true);
        result.unwrap();

        assert_eq!(
            &contents(&dest[..dest_size])[..],
            &[(1, text("a")), (2, text("c"))]
        );
        assert_eq!(&changes[..], &[(2, text("c"), Some(text("b")))]);
    }

    #[test]
    fn test_merge_value_growth_shifts_following_tuples() {
        let mut dest = [0u8; 128];
        let mut dest_size = dict(
            &[
                Tuplet::cstring(1, "x"),
                Tuplet::cstring(2, "y"),
                Tuplet::cstring(3, "z"),
            ],
            &mut dest,
        );
        let mut src = [0u8; 64];
        let src_size = dict(&[Tuplet::cstring(1, "longer")], &mut src);

        let (result, _) = run(&mut dest, &mut dest_size, &src[..src_size], true);
        result.unwrap();

        assert_eq!(
            &contents(&dest[..dest_size])[..],
            &[(1, text("longer")), (2, text("y")), (3, text("z"))]
        );
    }

    #[test]
    fn test_merge_duplicate_source_keys() {
        let mut dest = [0u8; 128];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a")], &mut dest);
        let mut src = [0u8; 64];
        let src_size = dict(
            &[
                Tuplet::cstring(1, "first"),
                Tuplet::cstring(4, "p"),
                Tuplet::cstring(1, "last"),
                Tuplet::cstring(4, "q"),
            ],
            &mut src,
        );

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        result.unwrap();

        assert_eq!(
            &contents(&dest[..dest_size])[..],
            &[(1, text("last")), (4, text("q"))]
        );
        // One callback per source occurrence, each seeing the final value
        assert_eq!(
            &changes[..],
            &[
                (1, text("last"), Some(text("a"))),
                (4, text("q"), None),
                (1, text("last"), Some(text("a"))),
                (4, text("q"), None),
            ]
        );
    }

    #[test]
    fn test_merge_into_itself_is_idempotent() {
        let tuplets = [Tuplet::cstring(5, "five"), Tuplet::cstring(6, "six")];
        let mut dest = [0u8; 128];
        let mut dest_size = dict(&tuplets, &mut dest);
        let mut src = [0u8; 64];
        let src_size = dict(&tuplets, &mut src);

        run(&mut dest, &mut dest_size, &src[..src_size], false).0.unwrap();
        assert_eq!(&dest[..dest_size], &src[..src_size]);

        run(&mut dest, &mut dest_size, &src[..src_size], false).0.unwrap();
        assert_eq!(&dest[..dest_size], &src[..src_size]);
    }

    #[test]
    fn test_merge_duplicate_destination_keys_pair_by_position() {
        let tuplets = [
            Tuplet::cstring(1, "a"),
            Tuplet::cstring(2, "k"),
            Tuplet::cstring(1, "b"),
        ];
        let mut dest = [0u8; 128];
        let mut dest_size = dict(&tuplets, &mut dest);
        let mut src = [0u8; 64];
        let src_size = dict(&tuplets, &mut src);

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        result.unwrap();
        assert_eq!(&dest[..dest_size], &src[..src_size]);
        assert_eq!(
            &changes[..],
            &[
                (1, text("a"), Some(text("a"))),
                (2, text("k"), Some(text("k"))),
                (1, text("b"), Some(text("b"))),
            ]
        );

        // A single source occurrence only updates the first destination one
        let src_size = dict(&[Tuplet::cstring(1, "x")], &mut src);
        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        result.unwrap();
        assert_eq!(
            &contents(&dest[..dest_size])[..],
            &[(1, text("x")), (2, text("k")), (1, text("b"))]
        );
        assert_eq!(&changes[..], &[(1, text("x"), Some(text("a")))]);
    }

    #[test]
    fn test_merge_extra_source_occurrences_go_to_last_destination_one() {
        let mut dest = [0u8; 128];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a"), Tuplet::cstring(1, "b")], &mut dest);
        let mut src = [0u8; 64];
        let src_size = dict(
            &[
                Tuplet::cstring(1, "p"),
                Tuplet::cstring(1, "q"),
                Tuplet::cstring(1, "r"),
            ],
            &mut src,
        );

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        result.unwrap();
        assert_eq!(
            &contents(&dest[..dest_size])[..],
            &[(1, text("p")), (1, text("r"))]
        );
        assert_eq!(
            &changes[..],
            &[
                (1, text("p"), Some(text("a"))),
                (1, text("r"), Some(text("b"))),
                (1, text("r"), Some(text("b"))),
            ]
        );
    }

    #[test]
    fn test_merge_not_enough_storage_keeps_destination() {
        let mut dest = [0u8; 24];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a")], &mut dest);
        let before = dest;
        let mut src = [0u8; 64];
        let src_size = dict(&[Tuplet::cstring(2, "too long")], &mut src);

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        assert_eq!(result, Err(DictError::NotEnoughStorage));
        assert!(changes.is_empty());
        assert_eq!(dest, before);
        assert_eq!(dest_size, 10);
    }

    #[test]
    fn test_merge_scratch_too_small() {
        let mut dest = [0u8; 64];
        let mut dest_size = dict(&[Tuplet::cstring(1, "abcdef")], &mut dest);
        let mut src = [0u8; 16];
        let src_size = dict(&[Tuplet::cstring(1, "b")], &mut src);
        let mut scratch = [0u8; 4];

        let result = merge(
            &mut dest,
            &mut dest_size,
            &src[..src_size],
            false,
            &mut scratch,
            |_, _| {},
        );
        assert_eq!(result, Err(DictError::OutOfMemory));
    }

    #[test]
    fn test_merge_corrupt_source() {
        let mut dest = [0u8; 64];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a")], &mut dest);
        let before = dest;
        // Declares one tuple whose value runs past the end
        let src = [1u8, 1, 0, 0, 0, 1, 9, 0, b'x'];

        let (result, _) = run(&mut dest, &mut dest_size, &src, false);
        assert_eq!(result, Err(DictError::InternalInconsistency));
        assert_eq!(dest, before);
    }

    #[test]
    fn test_merge_empty_source() {
        let mut dest = [0u8; 64];
        let mut dest_size = dict(&[Tuplet::cstring(1, "a")], &mut dest);
        let size_before = dest_size;

        let (result, changes) = run(&mut dest, &mut dest_size, &[0], false);
        result.unwrap();
        assert!(changes.is_empty());
        assert_eq!(dest_size, size_before);
    }

    #[test]
    fn test_merge_into_empty_destination() {
        let mut dest = [0u8; 64];
        let mut dest_size = dict(&[], &mut dest);
        let mut src = [0u8; 32];
        let src_size = dict(&[Tuplet::cstring(9, "new")], &mut src);

        let (result, changes) = run(&mut dest, &mut dest_size, &src[..src_size], false);
        result.unwrap();
        assert_eq!(&dest[..dest_size], &src[..src_size]);
        assert_eq!(&changes[..], &[(9, text("new"), None)]);
    }

    #[test]
    fn test_merge_dest_size_out_of_range() {
        let mut dest = [0u8; 8];
        let mut dest_size = 9;
        let (result, _) = run(&mut dest, &mut dest_size, &[0], false);
        assert_eq!(result, Err(DictError::InvalidArgs));
    }
}
