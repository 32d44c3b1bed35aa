use std::{
    collections::{HashMap, HashSet},
    sync::{LazyLock, Mutex},
};

mod test_cases;

pub(crate) use test_cases::*;

/// A lazily-built map of named test cases, with tracking of which cases have actually been
/// exercised by a test function.
///
/// Constructed with [`test_case_map!`].  Combined with [`test_all_test_cases_ran!`], this catches
/// the common mistake of adding a new test case to the map, but forgetting to add a corresponding
/// `#[case::...]` attribute that actually runs it.
pub(crate) struct LazyTestCases<T: 'static> {
    cases: LazyLock<HashMap<&'static str, T>>,
    ran: Mutex<HashSet<&'static str>>,
}

impl<T: 'static> LazyTestCases<T> {
    /// Not normally called directly; use [`test_case_map!`] instead.
    pub(crate) const fn new(f: fn() -> HashMap<&'static str, T>) -> Self {
        Self { cases: LazyLock::new(f), ran: Mutex::new(HashSet::new()) }
    }

    /// Look up a test case by name, recording that it has run.
    pub(crate) fn get_test_case(&self, name: &str) -> &T {
        let (&key, value) = self
            .cases
            .get_key_value(name)
            .unwrap_or_else(|| panic!("no test case named {name} was registered"));
        self.ran.lock().unwrap().insert(key);
        value
    }

    /// Confirm that every registered test case was looked up by [`LazyTestCases::get_test_case`]
    /// at some point during the test run.
    pub(crate) fn assert_all_ran(&self) {
        let ran = self.ran.lock().unwrap();
        let missing: Vec<&str> =
            self.cases.keys().filter(|name| !ran.contains(*name)).copied().collect();
        assert!(missing.is_empty(), "test cases were registered but never run: {missing:?}");
    }
}

/// Builds a [`LazyTestCases`] map from a flat list of `"name", value` pairs.
macro_rules! test_case_map {
    ($($name:literal, $value:expr),+ $(,)?) => {
        $crate::testutil::LazyTestCases::new(|| {
            std::collections::HashMap::from([
                $(($name, $value)),+
            ])
        })
    };
}
pub(crate) use test_case_map;

/// Generates a test function that asserts every test case registered in the given
/// [`LazyTestCases`] maps was actually run by some other `#[rstest]` function.
///
/// This is meant to be called once per test module, listing every [`LazyTestCases`] map and the
/// name of the test function that consumes it.
macro_rules! test_all_test_cases_ran {
    ($(($test_fn_name:literal, $cases:expr)),+ $(,)?) => {
        #[googletest::test]
        fn test_all_test_cases_ran() {
            $(
                let _ = $test_fn_name; // documents which test function this map belongs to
                $cases.assert_all_ran();
            )+
        }
    };
}
pub(crate) use test_all_test_cases_ran;

/// Parses a whitespace-separated string of hex byte pairs into a fixed-size byte array.
///
/// This is used throughout binary test fixtures to keep test data human-readable.
pub(crate) fn from_hex<const N: usize>(hex: &str) -> [u8; N] {
    let bytes: Vec<u8> = hex
        .split_whitespace()
        .map(|pair| u8::from_str_radix(pair, 16).unwrap_or_else(|_| panic!("bad hex byte {pair}")))
        .collect();
    bytes.try_into().unwrap_or_else(|bytes: Vec<u8>| {
        panic!("expected {N} hex bytes, got {}", bytes.len())
    })
}
