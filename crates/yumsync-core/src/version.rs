//! RPM version ordering.

use std::{cmp::Ordering, fmt};

use serde::Serialize;

/// Compares two version or release strings the way `rpmvercmp` does.
///
/// Strings are split into alternating numeric and alphabetic segments;
/// separators only delimit segments. Numeric segments compare by value and
/// beat alphabetic ones. `~` sorts before anything, even the end of the
/// string, while `^` sorts after the end of the string but before any other
/// segment.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let mut one = a.as_bytes();
    let mut two = b.as_bytes();

    loop {
        one = skip_separators(one);
        two = skip_separators(two);

        match (one.first(), two.first()) {
            (Some(b'~'), Some(b'~')) => {
                one = &one[1..];
                two = &two[1..];
                continue;
            }
            (Some(b'~'), _) => return Ordering::Less,
            (_, Some(b'~')) => return Ordering::Greater,
            (Some(b'^'), Some(b'^')) => {
                one = &one[1..];
                two = &two[1..];
                continue;
            }
            (Some(b'^'), None) => return Ordering::Greater,
            (Some(b'^'), _) => return Ordering::Less,
            (None, Some(b'^')) => return Ordering::Less,
            (_, Some(b'^')) => return Ordering::Greater,
            (None, _) | (_, None) => break,
            _ => {}
        }

        let numeric = one[0].is_ascii_digit();
        let (seg_one, rest_one) = split_segment(one, numeric);
        let (seg_two, rest_two) = split_segment(two, numeric);
        one = rest_one;
        two = rest_two;

        // Segments of different kinds: the numeric one is newer.
        if seg_two.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ordering = if numeric {
            let seg_one = trim_leading_zeros(seg_one);
            let seg_two = trim_leading_zeros(seg_two);
            seg_one
                .len()
                .cmp(&seg_two.len())
                .then_with(|| seg_one.cmp(seg_two))
        } else {
            seg_one.cmp(seg_two)
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    match (one.is_empty(), two.is_empty()) {
        (true, true) => Ordering::Equal,
        (false, _) => Ordering::Greater,
        (true, false) => Ordering::Less,
    }
}

fn skip_separators(s: &[u8]) -> &[u8] {
    let start = s
        .iter()
        .position(|c| c.is_ascii_alphanumeric() || *c == b'~' || *c == b'^')
        .unwrap_or(s.len());
    &s[start..]
}

fn split_segment(s: &[u8], numeric: bool) -> (&[u8], &[u8]) {
    let end = s
        .iter()
        .position(|c| {
            if numeric {
                !c.is_ascii_digit()
            } else {
                !c.is_ascii_alphabetic()
            }
        })
        .unwrap_or(s.len());
    s.split_at(end)
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|c| *c != b'0').unwrap_or(s.len());
    &s[start..]
}

/// Epoch, version and release of a package or capability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Evr {
    pub epoch: Option<u64>,
    pub version: String,
    pub release: Option<String>,
}

impl Evr {
    pub fn new(epoch: Option<u64>, version: impl Into<String>, release: Option<String>) -> Self {
        Self {
            epoch,
            version: version.into(),
            release,
        }
    }

    /// Parses `[epoch:]version[-release]`.
    ///
    /// A non-numeric epoch prefix is kept as part of the version.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => {
                match epoch.parse::<u64>() {
                    Ok(epoch) => (Some(epoch), rest),
                    Err(_) => (None, s),
                }
            }
            None => (None, s),
        };

        match rest.rsplit_once('-') {
            Some((version, release)) => {
                Self::new(epoch, version, Some(release.to_string()))
            }
            None => Self::new(epoch, rest, None),
        }
    }

    /// Total ordering used to pick the newest package. A missing epoch counts
    /// as 0 and a missing release as the empty string.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.epoch
            .unwrap_or(0)
            .cmp(&other.epoch.unwrap_or(0))
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| {
                rpmvercmp(
                    self.release.as_deref().unwrap_or(""),
                    other.release.as_deref().unwrap_or(""),
                )
            })
    }

    /// Ordering used when evaluating dependency ranges: a release is only
    /// compared when both sides carry one.
    pub fn compare_for_range(&self, other: &Self) -> Ordering {
        let ordering = self
            .epoch
            .unwrap_or(0)
            .cmp(&other.epoch.unwrap_or(0))
            .then_with(|| rpmvercmp(&self.version, &other.version));

        match (&self.release, &other.release) {
            (Some(one), Some(two)) => ordering.then_with(|| rpmvercmp(one, two)),
            _ => ordering,
        }
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(epoch) = self.epoch.filter(|e| *e > 0) {
            write!(f, "{epoch}:")?;
        }
        write!(f, "{}", self.version)?;
        if let Some(release) = &self.release {
            write!(f, "-{release}")?;
        }
        Ok(())
    }
}
