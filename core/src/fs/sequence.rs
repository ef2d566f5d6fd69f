//! Frame-sequence detection among sibling file names.
//!
//! Files such as `a.001.txt`, `a.002.txt` and `a.004.txt` differ only in a
//! zero-padded frame number. [`find_sequences`] groups them into a single
//! [`FileSequence`] whose printable name replaces the frame digits with `#`
//! (`a.###.txt`) and which carries the frames present as a [`FrameList`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::util::{Token, tokenize};

/// Character used in place of frame digits within a sequence name.
pub const FRAME_PLACEHOLDER: char = '#';

/// Sorted, de-duplicated set of frame numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FrameList {
    frames: Vec<u64>,
}

impl FrameList {
    pub fn from_frames(frames: impl IntoIterator<Item = u64>) -> Self {
        let mut frames: Vec<u64> = frames.into_iter().collect();
        frames.sort_unstable();
        frames.dedup();
        Self { frames }
    }

    pub fn frames(&self) -> &[u64] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, frame: u64) -> bool {
        self.frames.binary_search(&frame).is_ok()
    }
}

/// Compact range form: consecutive runs become `start-end`, runs are joined
/// with commas (`1-2,4`).
impl fmt::Display for FrameList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.frames.iter().copied().peekable();
        let mut first = true;
        while let Some(start) = iter.next() {
            let mut end = start;
            while let Some(&next) = iter.peek() {
                if next != end + 1 {
                    break;
                }
                end = next;
                iter.next();
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

/// A run of sibling files sharing a prefix and suffix around a frame number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileSequence {
    prefix: String,
    suffix: String,
    padding: usize,
    frames: FrameList,
}

impl FileSequence {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        padding: usize,
        frames: FrameList,
    ) -> Self {
        Self { prefix: prefix.into(), suffix: suffix.into(), padding: padding.max(1), frames }
    }

    /// Printable name with the frame digits replaced by `#` repeated to the padding width.
    pub fn file_name(&self) -> String {
        let mut name = String::with_capacity(self.prefix.len() + self.padding + self.suffix.len());
        name.push_str(&self.prefix);
        name.extend(std::iter::repeat_n(FRAME_PLACEHOLDER, self.padding));
        name.push_str(&self.suffix);
        name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn frame_list(&self) -> &FrameList {
        &self.frames
    }

    /// Name of the member file holding `frame`, zero-padded to the sequence padding.
    pub fn file_name_for_frame(&self, frame: u64) -> String {
        format!("{}{:0width$}{}", self.prefix, frame, self.suffix, width = self.padding)
    }

    /// Names of every member file, in frame order.
    pub fn file_names(&self) -> Vec<String> {
        self.frames.frames().iter().map(|&frame| self.file_name_for_frame(frame)).collect()
    }

    /// Frame number encoded in `name` if it is spelled the way this sequence
    /// spells its members. The frame need not be present in the frame list.
    pub fn frame_of(&self, name: &str) -> Option<u64> {
        let digits = name.strip_prefix(&self.prefix)?.strip_suffix(&self.suffix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let frame = digits.parse::<u64>().ok()?;
        (self.file_name_for_frame(frame) == name).then_some(frame)
    }

    /// Returns `true` if `name` is one of the member files.
    pub fn contains_file(&self, name: &str) -> bool {
        self.frame_of(name).is_some_and(|frame| self.frames.contains(frame))
    }
}

impl fmt::Display for FileSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.file_name(), self.frames)
    }
}

/// A file name split around its last digit run.
#[derive(Debug)]
struct FrameCandidate<'a> {
    prefix: &'a str,
    digits: &'a str,
    suffix: &'a str,
    frame: u64,
}

impl FrameCandidate<'_> {
    /// Padding fixed by a leading zero; `None` when the run would also fit
    /// a shorter padding.
    fn fixed_padding(&self) -> Option<usize> {
        (self.digits.len() > 1 && self.digits.starts_with('0')).then_some(self.digits.len())
    }
}

fn split_frame(name: &str) -> Option<FrameCandidate<'_>> {
    if name.contains(FRAME_PLACEHOLDER) {
        return None;
    }

    let mut offset = 0;
    let mut last = None;
    for token in tokenize(name) {
        if let Token::Number(digits, _) = token {
            last = Some((offset, digits));
        }
        offset += token.as_str().len();
    }

    let (start, digits) = last?;
    let frame = digits.parse::<u64>().ok()?;
    Some(FrameCandidate {
        prefix: &name[..start],
        digits,
        suffix: &name[start + digits.len()..],
        frame,
    })
}

/// Group sibling file names into sequences, sorted by placeholder name.
///
/// Every name carrying a digit run belongs to exactly one sequence, so a
/// lone `b.003.txt` still yields `b.###.txt` with a single frame. Callers are
/// expected to pass file names only; directories never form sequences.
pub fn find_sequences<'a, I>(names: I) -> Vec<FileSequence>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<(&str, &str), Vec<FrameCandidate<'_>>> = BTreeMap::new();
    for candidate in names.into_iter().filter_map(split_frame) {
        groups.entry((candidate.prefix, candidate.suffix)).or_default().push(candidate);
    }

    let mut sequences = Vec::new();
    for ((prefix, suffix), members) in groups {
        let fixed: BTreeSet<usize> =
            members.iter().filter_map(FrameCandidate::fixed_padding).collect();

        let mut by_padding: BTreeMap<usize, Vec<u64>> = BTreeMap::new();
        let mut unpadded: Vec<&FrameCandidate<'_>> = Vec::new();
        for member in &members {
            match member.fixed_padding() {
                Some(width) => by_padding.entry(width).or_default().push(member.frame),
                None if fixed.contains(&member.digits.len()) => {
                    by_padding.entry(member.digits.len()).or_default().push(member.frame)
                }
                None => unpadded.push(member),
            }
        }

        // Without leading zeros every member renders exactly at the shortest width.
        if let Some(width) = unpadded.iter().map(|member| member.digits.len()).min() {
            by_padding.entry(width).or_default().extend(unpadded.iter().map(|member| member.frame));
        }

        for (padding, frames) in by_padding {
            sequences.push(FileSequence::new(prefix, suffix, padding, FrameList::from_frames(frames)));
        }
    }

    sequences.sort_by_key(FileSequence::file_name);
    sequences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_list_compacts_consecutive_runs() {
        assert_eq!(FrameList::from_frames([4, 1, 2]).to_string(), "1-2,4");
        assert_eq!(FrameList::from_frames([3]).to_string(), "3");
        assert_eq!(FrameList::from_frames([1, 2, 3, 7, 9, 10]).to_string(), "1-3,7,9-10");
        assert_eq!(FrameList::default().to_string(), "");
    }

    #[test]
    fn groups_padded_siblings() {
        let names = ["singleFile.txt", "a.001.txt", "a.002.txt", "a.004.txt", "b.003.txt"];
        let sequences = find_sequences(names);

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].file_name(), "a.###.txt");
        assert_eq!(sequences[0].frame_list().frames(), &[1, 2, 4]);
        assert_eq!(sequences[1].file_name(), "b.###.txt");
        assert_eq!(sequences[1].frame_list().frames(), &[3]);
    }

    #[test]
    fn mixed_padding_never_shares_a_placeholder() {
        let sequences = find_sequences(["s.01.exr", "s.001.exr", "s.002.exr"]);
        let names: Vec<String> = sequences.iter().map(FileSequence::file_name).collect();
        assert_eq!(names, vec!["s.###.exr", "s.##.exr"]);
    }

    #[test]
    fn unpadded_numbers_join_matching_padded_width() {
        let sequences = find_sequences(["s.09.exr", "s.10.exr", "t.9.exr", "t.10.exr"]);
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].file_name(), "s.##.exr");
        assert_eq!(sequences[0].frame_list().frames(), &[9, 10]);
        assert_eq!(sequences[1].file_name(), "t.#.exr");
        assert_eq!(sequences[1].file_names(), vec!["t.9.exr", "t.10.exr"]);
    }

    #[test]
    fn last_digit_run_is_the_frame() {
        let sequences = find_sequences(["shot010_v2.1001.exr", "shot010_v2.1002.exr"]);
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].prefix(), "shot010_v2.");
        assert_eq!(sequences[0].padding(), 4);
        assert_eq!(sequences[0].to_string(), "shot010_v2.####.exr 1001-1002");
    }

    #[test]
    fn names_without_digits_or_with_placeholders_are_ignored() {
        assert!(find_sequences(["notes.txt", "a.###.txt"]).is_empty());
    }

    #[test]
    fn membership_respects_padding() {
        let sequence = FileSequence::new("a.", ".txt", 3, FrameList::from_frames([1, 2]));
        assert!(sequence.contains_file("a.001.txt"));
        assert!(!sequence.contains_file("a.1.txt"));
        assert!(!sequence.contains_file("a.003.txt"));
        assert_eq!(sequence.frame_of("a.003.txt"), Some(3));
    }
}
