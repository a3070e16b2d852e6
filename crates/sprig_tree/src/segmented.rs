//! Matching against text split into runs.
//!
//! A node's string value is the concatenation of several byte runs that sit
//! apart in the tree's text buffer. The functions here compare a needle
//! against that concatenation without building it. They accept any ordered
//! sequence of runs, so they are equally correct for adjacent or scattered
//! storage.
//!
//! Every function treats the runs as one logical string. Empty runs are
//! allowed and contribute nothing.

use memchr::memchr_iter;

/// Returns true if the concatenated runs equal `needle` exactly.
pub fn equals<'a, I>(runs: I, needle: &[u8]) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut rest = needle;
    for run in runs {
        if run.len() > rest.len() || !rest.starts_with(run) {
            return false;
        }
        rest = &rest[run.len()..];
    }
    rest.is_empty()
}

/// Returns true if the concatenated runs start with `needle`.
///
/// Stops reading runs as soon as the needle is consumed.
pub fn starts_with<'a, I>(runs: I, needle: &[u8]) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    continues_with(runs, needle)
}

/// Returns true if `needle` occurs anywhere in the concatenated runs,
/// including occurrences that straddle run boundaries.
///
/// For each occurrence of the needle's first byte, the match is extended
/// greedily through the rest of that run and then through the following
/// runs in order. The first mismatch abandons that candidate only.
pub fn contains<'a, I>(runs: I, needle: &[u8]) -> bool
where
    I: Iterator<Item = &'a [u8]> + Clone,
{
    let Some(&first) = needle.first() else {
        return true;
    };

    let mut runs = runs;
    while let Some(run) = runs.next() {
        for at in memchr_iter(first, run) {
            let head = &run[at..];
            let n = head.len().min(needle.len());
            if head[..n] != needle[..n] {
                continue;
            }
            if continues_with(runs.clone(), &needle[n..]) {
                return true;
            }
        }
    }
    false
}

/// Prefix check shared by `starts_with` and the tail of a `contains` candidate.
fn continues_with<'a, I>(runs: I, needle: &[u8]) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut rest = needle;
    for run in runs {
        if rest.is_empty() {
            return true;
        }
        let n = run.len().min(rest.len());
        if run[..n] != rest[..n] {
            return false;
        }
        rest = &rest[n..];
    }
    rest.is_empty()
}
