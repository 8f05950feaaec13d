// 🔍 Plate Matcher - Fuzzy equivalence classes over noisy plate strings
// Finds likely transcription errors and groups plates that are probably
// all supposed to be the same string

use log::debug;

// ============================================================================
// PLATE MATCHER
// ============================================================================

/// PlateMatcher - Builds fuzzy-match equivalence classes over the distinct
/// raw plate strings seen in a run.
///
/// For each string, a family of match tests is generated by sliding a
/// wildcard window of `fuzz_size` contiguous characters across it
/// (including positions straddling either end). Two strings are linked
/// when enough tests pass in either direction; classes are the connected
/// components of the link relation.
///
/// O(n²) in distinct-plate count, which is fine: a run sees hundreds of
/// plates, not millions.
pub struct PlateMatcher {
    /// Minimum string length to participate in matching (default: 4)
    pub min_length: usize,

    /// Two strings whose length differs by this much or more never link
    /// (default: 2)
    pub max_size_diff: usize,

    /// Number of contiguous characters treated as a wildcard when
    /// constructing match tests (default: 2)
    pub fuzz_size: usize,

    /// Number of passing tests for a pair to be considered linked
    /// (default: 1)
    pub match_threshold: usize,
}

/// One match test: candidate must start with `prefix` and contain
/// `suffix` somewhere after it
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchTest {
    prefix: String,
    suffix: String,
}

impl MatchTest {
    fn matches(&self, candidate: &str) -> bool {
        if !candidate.starts_with(&self.prefix) {
            return false;
        }
        candidate[self.prefix.len()..].contains(&self.suffix)
    }
}

impl PlateMatcher {
    /// Create a matcher with default thresholds
    pub fn new() -> Self {
        PlateMatcher {
            min_length: 4,
            max_size_diff: 2,
            fuzz_size: 2,
            match_threshold: 1,
        }
    }

    /// Whether a string would break match-test construction.
    /// Grouping delimiters are reserved; such strings are excluded from
    /// matching entirely and end up in singleton classes.
    pub fn has_reserved_chars(value: &str) -> bool {
        value
            .chars()
            .any(|c| matches!(c, '(' | ')' | '[' | ']'))
    }

    /// Partition `plates` into equivalence classes.
    ///
    /// Input order does not matter: plates are processed in lexicographic
    /// order and each class comes back sorted, classes ordered by their
    /// first member. Every input string lands in exactly one class;
    /// strings with no link (or excluded from matching) form singletons.
    pub fn find_equivalence_classes(&self, plates: &[String]) -> Vec<Vec<String>> {
        let mut sorted: Vec<String> = plates.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let (candidates, excluded): (Vec<String>, Vec<String>) = sorted
            .into_iter()
            .partition(|p| !Self::has_reserved_chars(p));

        let tests: Vec<Vec<MatchTest>> = candidates
            .iter()
            .map(|s| self.build_tests(s))
            .collect();

        // Union linked pairs until every component is connected.
        let mut parent: Vec<usize> = (0..candidates.len()).collect();
        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let forward =
                    self.score_with_tests(&tests[i], &candidates[i], &candidates[j]);
                let backward =
                    self.score_with_tests(&tests[j], &candidates[j], &candidates[i]);
                if forward >= self.match_threshold || backward >= self.match_threshold {
                    union(&mut parent, i, j);
                }
            }
        }

        let mut classes: Vec<Vec<String>> = Vec::new();
        let mut roots: Vec<Option<usize>> = vec![None; candidates.len()];
        for i in 0..candidates.len() {
            let root = find(&mut parent, i);
            match roots[root] {
                Some(class_index) => classes[class_index].push(candidates[i].clone()),
                None => {
                    roots[root] = Some(classes.len());
                    classes.push(vec![candidates[i].clone()]);
                }
            }
        }

        for plate in excluded {
            classes.push(vec![plate]);
        }
        classes.sort_by(|a, b| a[0].cmp(&b[0]));

        debug!(
            "plate equivalence: {} classes, {} with more than one member",
            classes.len(),
            classes.iter().filter(|c| c.len() > 1).count()
        );

        classes
    }

    /// Number of `s`'s match tests satisfied by `t`
    pub fn match_score(&self, s: &str, t: &str) -> usize {
        self.score_with_tests(&self.build_tests(s), s, t)
    }

    fn score_with_tests(&self, tests: &[MatchTest], s: &str, t: &str) -> usize {
        if s.chars().count() < self.min_length || t.chars().count() < self.min_length {
            return 0;
        }
        let size_diff = s.chars().count().abs_diff(t.chars().count());
        if size_diff >= self.max_size_diff {
            return 0;
        }
        tests.iter().filter(|test| test.matches(t)).count()
    }

    /// Generate the prefix/suffix test family for one string.
    ///
    /// The wildcard window slides from `-(fuzz_size - 1)` (hanging off the
    /// front) to the last character, so deletions and insertions at either
    /// end are covered as well as interior substitutions.
    fn build_tests(&self, target: &str) -> Vec<MatchTest> {
        let chars: Vec<char> = target.chars().collect();
        if chars.len() < self.fuzz_size {
            return Vec::new();
        }

        let fuzz = self.fuzz_size as isize;
        let len = chars.len() as isize;

        (-(fuzz - 1)..len)
            .map(|posn| {
                let prefix_end = posn.max(0) as usize;
                let suffix_start = ((posn + fuzz).min(len)) as usize;
                MatchTest {
                    prefix: chars[..prefix_end].iter().collect(),
                    suffix: chars[suffix_start..].iter().collect(),
                }
            })
            .collect()
    }
}

impl Default for PlateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// UNION-FIND
// ============================================================================

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Lower index wins so representatives are stable
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn plates(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trailing_substitution_merges() {
        let matcher = PlateMatcher::new();
        let classes =
            matcher.find_equivalence_classes(&plates(&["7ABC123", "7ABC12B", "ZZZ000"]));

        assert_eq!(classes.len(), 2);
        assert!(classes.contains(&plates(&["7ABC123", "7ABC12B"])));
        assert!(classes.contains(&plates(&["ZZZ000"])));
    }

    #[test]
    fn test_classes_partition_input() {
        let matcher = PlateMatcher::new();
        let input = plates(&[
            "7ABC123", "7ABC12B", "ZZZ000", "5XYZ987", "5XYZ98", "AB", "AB",
        ]);
        let classes = matcher.find_equivalence_classes(&input);

        let mut members: Vec<String> = classes.iter().flatten().cloned().collect();
        members.sort();
        let mut distinct: Vec<String> = input.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(members, distinct);
    }

    #[test]
    fn test_short_strings_never_link() {
        let matcher = PlateMatcher::new();
        let classes = matcher.find_equivalence_classes(&plates(&["ABC", "ABD"]));
        assert_eq!(classes.len(), 2);
    }

    #[test]
    fn test_length_difference_gate() {
        let matcher = PlateMatcher::new();
        // Diff of 2 is not < max_size_diff
        let classes = matcher.find_equivalence_classes(&plates(&["ABCDEF", "ABCDEFGH"]));
        assert_eq!(classes.len(), 2);

        // Diff of 1 can still link
        let classes = matcher.find_equivalence_classes(&plates(&["ABCDEF", "ABCDEFG"]));
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_reserved_chars_excluded_from_matching() {
        let matcher = PlateMatcher::new();
        assert!(PlateMatcher::has_reserved_chars("7ABC(1)"));
        assert!(!PlateMatcher::has_reserved_chars("7ABC123"));

        let classes = matcher.find_equivalence_classes(&plates(&["7ABC12(", "7ABC123"]));
        assert_eq!(classes.len(), 2);
        assert!(classes.contains(&plates(&["7ABC12("])));
    }

    #[test]
    fn test_transitive_linking() {
        let matcher = PlateMatcher::new();
        // A-B and B-C link pairwise; all three end up in one class
        let classes =
            matcher.find_equivalence_classes(&plates(&["ABCDE1", "ABCDE2", "ABCDX2"]));
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].len(), 3);
    }

    #[test]
    fn test_match_score_counts_tests() {
        let matcher = PlateMatcher::new();
        // Identical strings satisfy every sliding-window test
        let score = matcher.match_score("ABCDEF", "ABCDEF");
        assert_eq!(score, 7); // positions -1..=5

        // Unrelated strings satisfy none
        assert_eq!(matcher.match_score("ABCDEF", "UVWXYZ"), 0);
    }

    #[test]
    fn test_deterministic_output_order() {
        let matcher = PlateMatcher::new();
        let a = matcher.find_equivalence_classes(&plates(&["ZZZ000", "7ABC12B", "7ABC123"]));
        let b = matcher.find_equivalence_classes(&plates(&["7ABC123", "ZZZ000", "7ABC12B"]));
        assert_eq!(a, b);
    }
}
