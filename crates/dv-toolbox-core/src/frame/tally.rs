/// Counts occurrences of observed values, preserving first-seen order for deterministic
/// tie-breaking when picking the most common one.
///
/// Frame-level fields are expected to repeat across many DIF blocks; when tape dropouts cause
/// disagreement, the most commonly observed value wins.
#[derive(Debug)]
pub(super) struct Tally<T: PartialEq + Clone>(Vec<(T, u32)>);

impl<T: PartialEq + Clone> Tally<T> {
    pub(super) fn new() -> Self {
        Self(Vec::new())
    }

    pub(super) fn count(&mut self, value: T) {
        if let Some(entry) = self.0.iter_mut().find(|(v, _)| *v == value) {
            entry.1 += 1;
        } else {
            self.0.push((value, 1));
        }
    }

    pub(super) fn count_if_present(&mut self, value: Option<T>) {
        if let Some(value) = value {
            self.count(value);
        }
    }

    /// Returns the most commonly observed value, or `None` if nothing was ever counted.
    ///
    /// Ties are broken in favor of whichever distinct value was seen first, per
    /// [`Iterator::max_by_key`]'s last-wins tie-breaking rule on the reversed list.
    pub(super) fn most_common(&self) -> Option<T> {
        self.0.iter().rev().max_by_key(|(_, count)| *count).map(|(v, _)| v.clone())
    }

    pub(super) fn most_common_or(&self, default: T) -> T {
        self.most_common().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn test_empty_tally_has_no_most_common() {
        let tally: Tally<u8> = Tally::new();
        expect_that!(tally.most_common(), none());
        expect_that!(tally.most_common_or(7), eq(7));
    }

    #[googletest::test]
    fn test_most_common_picks_highest_count() {
        let mut tally: Tally<&str> = Tally::new();
        tally.count("a");
        tally.count("b");
        tally.count("b");
        tally.count("a");
        tally.count("b");
        expect_that!(tally.most_common(), some(eq("b")));
    }

    #[googletest::test]
    fn test_ties_break_in_favor_of_first_seen() {
        let mut tally: Tally<&str> = Tally::new();
        tally.count("first");
        tally.count("second");
        expect_that!(tally.most_common(), some(eq("first")));
    }

    #[googletest::test]
    fn test_count_if_present_ignores_none() {
        let mut tally: Tally<u8> = Tally::new();
        tally.count_if_present(None);
        tally.count_if_present(Some(3));
        expect_that!(tally.most_common(), some(eq(3)));
    }
}
