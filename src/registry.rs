//! Case and suite registry
//!
//! Holds every registered suite in registration order. Populated once by the
//! setup callback, then only read by the engine.

use indexmap::IndexMap;
use std::fmt;

/// Executable body of a test case
pub type CaseBody = Box<dyn Fn() -> anyhow::Result<()>>;

/// A single registered test case
pub struct TestCase {
    name: String,
    body: CaseBody,
    included: bool,
    duration_budget_ms: Option<u64>,
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the outcome counts towards the run verdict
    pub fn is_included(&self) -> bool {
        self.included
    }

    pub fn duration_budget_ms(&self) -> Option<u64> {
        self.duration_budget_ms
    }

    pub(crate) fn body(&self) -> &CaseBody {
        &self.body
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("included", &self.included)
            .field("duration_budget_ms", &self.duration_budget_ms)
            .finish_non_exhaustive()
    }
}

/// Named, ordered group of test cases
#[derive(Debug)]
pub struct Suite {
    name: String,
    cases: Vec<TestCase>,
}

impl Suite {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Handle returned by [`Registry::add_test`] to adjust the new case
pub struct CaseHandle<'a> {
    case: &'a mut TestCase,
}

impl CaseHandle<'_> {
    /// Run the case but keep its outcome out of the run verdict
    pub fn ignore(self) -> Self {
        self.include(false)
    }

    pub fn include(self, included: bool) -> Self {
        self.case.included = included;
        self
    }

    /// Fail the case when it takes longer than `budget_ms` milliseconds
    pub fn budget_ms(self, budget_ms: u64) -> Self {
        self.case.duration_budget_ms = Some(budget_ms);
        self
    }
}

/// Ordered mapping from suite name to suite
#[derive(Debug, Default)]
pub struct Registry {
    suites: IndexMap<String, Suite>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an included case without budget to `suite`, creating the suite
    /// on first use
    pub fn add_test<F, E>(
        &mut self,
        suite: impl Into<String>,
        name: impl Into<String>,
        body: F,
    ) -> CaseHandle<'_>
    where
        F: Fn() -> Result<(), E> + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        self.add_test_with(suite, name, body, true, None)
    }

    /// Append a case with explicit inclusion flag and duration budget
    pub fn add_test_with<F, E>(
        &mut self,
        suite: impl Into<String>,
        name: impl Into<String>,
        body: F,
        included: bool,
        duration_budget_ms: Option<u64>,
    ) -> CaseHandle<'_>
    where
        F: Fn() -> Result<(), E> + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        let suite_name = suite.into();
        let suite = self
            .suites
            .entry(suite_name.clone())
            .or_insert_with(|| Suite::new(suite_name));

        suite.cases.push(TestCase {
            name: name.into(),
            body: Box::new(move || -> anyhow::Result<()> { body().map_err(Into::into) }),
            included,
            duration_budget_ms,
        });

        let index = suite.cases.len() - 1;
        CaseHandle {
            case: &mut suite.cases[index],
        }
    }

    /// Suites in registration order
    pub fn suites(&self) -> impl Iterator<Item = &Suite> {
        self.suites.values()
    }

    pub fn suite(&self, name: &str) -> Option<&Suite> {
        self.suites.get(name)
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    pub fn case_count(&self) -> usize {
        self.suites.values().map(Suite::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Failure;

    fn pass() -> Result<(), Failure> {
        Ok(())
    }

    #[test]
    fn test_suites_keep_registration_order() {
        let mut registry = Registry::new();
        registry.add_test("Zeta", "z", pass);
        registry.add_test("Alpha", "a", pass);
        registry.add_test("Zeta", "z2", pass);

        let names: Vec<_> = registry.suites().map(Suite::name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);

        let cases: Vec<_> = registry
            .suite("Zeta")
            .unwrap()
            .cases()
            .iter()
            .map(TestCase::name)
            .collect();
        assert_eq!(cases, vec!["z", "z2"]);
    }

    #[test]
    fn test_duplicate_case_names_are_kept() {
        let mut registry = Registry::new();
        registry.add_test("S", "dup", pass);
        registry.add_test("S", "dup", pass);
        assert_eq!(registry.suite("S").unwrap().len(), 2);
        assert_eq!(registry.case_count(), 2);
    }

    #[test]
    fn test_case_handle_options() {
        let mut registry = Registry::new();
        registry.add_test("S", "plain", pass);
        registry.add_test("S", "ignored", pass).ignore();
        registry.add_test("S", "timed", pass).budget_ms(5);
        registry.add_test_with("S", "explicit", pass, false, Some(10));

        let cases = registry.suite("S").unwrap().cases();
        assert!(cases[0].is_included());
        assert_eq!(cases[0].duration_budget_ms(), None);
        assert!(!cases[1].is_included());
        assert_eq!(cases[2].duration_budget_ms(), Some(5));
        assert!(!cases[3].is_included());
        assert_eq!(cases[3].duration_budget_ms(), Some(10));
    }

    #[test]
    fn test_body_errors_become_anyhow() {
        let mut registry = Registry::new();
        registry.add_test("S", "fails", || Err(Failure::new("nope")));

        let case = &registry.suite("S").unwrap().cases()[0];
        let err = (case.body())().unwrap_err();
        assert_eq!(err.downcast_ref::<Failure>().unwrap().message(), "nope");
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.suite_count(), 0);
        assert_eq!(registry.case_count(), 0);
    }
}
