//! Demonstration suites
//!
//! Registered by the `popquiz` binary. `Example #1` contains a case that
//! overruns its duration budget, so a full run exits with status 1.

use std::thread::sleep;
use std::time::Duration;
use thiserror::Error;

use popquiz::assert::{assert_equal, assert_throws};
use popquiz::{Failure, Registry};

#[derive(Debug, Error)]
#[error("This is a runtime error.")]
struct RuntimeError;

/// Register every demonstration case
pub fn register(registry: &mut Registry) {
    example_one(registry);
    example_two(registry);
}

fn example_one(registry: &mut Registry) {
    registry.add_test("Example #1", "Do Nothing", || Ok::<(), Failure>(()));

    registry.add_test("Example #1", "Assert True", || {
        assert_equal(1, 1, "One should equal one.")
    });

    // Sleeps past its 5 ms budget, so it fails although the error was raised.
    registry
        .add_test("Example #1", "Expect Exception", || {
            sleep(Duration::from_millis(10));
            assert_throws::<RuntimeError, (), _>(|| Err(RuntimeError))
        })
        .budget_ms(5);

    registry
        .add_test("Example #1", "Throw Exception", || {
            assert_equal(1, 2, "One should not equal two.")
        })
        .ignore();
}

fn example_two(registry: &mut Registry) {
    registry
        .add_test("Example #2", "Ignore", || Ok::<(), Failure>(()))
        .ignore();

    registry.add_test("Example #2", "Do nothing", || Ok::<(), Failure>(()));

    registry
        .add_test("Example #2", "Throw Exception and Ignore", || {
            assert_equal("Pi", "pi", "Almost Equal!")
        })
        .ignore();
}
