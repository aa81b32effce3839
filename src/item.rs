use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// A value that can live in the cache: it exposes a stable identifying key.
pub trait Cacheable {
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> &Self::Key;
}

/// Demo record used by the CLI workload and tests: an employee keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub name: String,
    pub annual_salary: u32,
}

impl EmployeeRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, annual_salary: u32) -> Self {
        Self { name: name.into(), annual_salary }
    }
}

impl Cacheable for EmployeeRecord {
    type Key = String;

    fn key(&self) -> &String {
        &self.name
    }
}
