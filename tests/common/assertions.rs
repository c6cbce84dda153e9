//! Custom assertion macros
//!
//! Shorter failure output for the patterns the integration suites repeat.
//! Pulled in with `#[macro_use]` so each suite sees them by bare name.

#![allow(unused_macros)]

/// Assert that a result is ok and return the value
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected {:?} to contain {:?}",
            $haystack,
            $needle
        )
    };
}

/// Assert the wire names of a batch of server events
macro_rules! assert_events {
    ($events:expr, [$($name:expr),* $(,)?]) => {
        let names: Vec<&str> = $events.iter().map(|e| e.name()).collect();
        let expected: Vec<&str> = vec![$($name),*];
        assert_eq!(names, expected, "unexpected event sequence");
    };
}
