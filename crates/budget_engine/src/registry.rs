//! Shared read model holding the last known total of every category.
//!
//! Sections push whole-category replacements through [`TotalsRegistry::update`].
//! An update equal to the stored value is dropped: the snapshot keeps its identity,
//! the version does not move and subscribers are not called.

use std::cell::RefCell;
use std::rc::Rc;

use models::{CategoryTotals, PersonRevenue};

/// One category's replacement value.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryUpdate {
    Revenue(f64),
    RevenueByPerson(Vec<PersonRevenue>),
    FixedExpenses(f64),
    VariableExpenses(f64),
    Apartments(f64),
}

impl CategoryUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryUpdate::Revenue(_) => "revenue",
            CategoryUpdate::RevenueByPerson(_) => "revenue_by_person",
            CategoryUpdate::FixedExpenses(_) => "fixed_expenses",
            CategoryUpdate::VariableExpenses(_) => "variable_expenses",
            CategoryUpdate::Apartments(_) => "apartments",
        }
    }

    /// Replaces non-finite values with 0 so every stored total compares equal to itself.
    fn into_finite(self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        match self {
            CategoryUpdate::Revenue(v) => CategoryUpdate::Revenue(finite(v)),
            CategoryUpdate::RevenueByPerson(list) => CategoryUpdate::RevenueByPerson(
                list.into_iter()
                    .map(|p| PersonRevenue {
                        amount: finite(p.amount),
                        ..p
                    })
                    .collect(),
            ),
            CategoryUpdate::FixedExpenses(v) => CategoryUpdate::FixedExpenses(finite(v)),
            CategoryUpdate::VariableExpenses(v) => CategoryUpdate::VariableExpenses(finite(v)),
            CategoryUpdate::Apartments(v) => CategoryUpdate::Apartments(finite(v)),
        }
    }

    fn matches(&self, totals: &CategoryTotals) -> bool {
        match self {
            CategoryUpdate::Revenue(v) => totals.revenue == *v,
            CategoryUpdate::RevenueByPerson(list) => same_people(&totals.revenue_by_person, list),
            CategoryUpdate::FixedExpenses(v) => totals.fixed_expenses == *v,
            CategoryUpdate::VariableExpenses(v) => totals.variable_expenses == *v,
            CategoryUpdate::Apartments(v) => totals.apartments == *v,
        }
    }

    fn apply(self, totals: &mut CategoryTotals) {
        match self {
            CategoryUpdate::Revenue(v) => totals.revenue = v,
            CategoryUpdate::RevenueByPerson(list) => totals.revenue_by_person = list,
            CategoryUpdate::FixedExpenses(v) => totals.fixed_expenses = v,
            CategoryUpdate::VariableExpenses(v) => totals.variable_expenses = v,
            CategoryUpdate::Apartments(v) => totals.apartments = v,
        }
    }
}

fn same_people(current: &[PersonRevenue], next: &[PersonRevenue]) -> bool {
    current.len() == next.len()
        && current
            .iter()
            .zip(next)
            .all(|(a, b)| a.name == b.name && a.amount == b.amount)
}

type Subscriber = Box<dyn FnMut(&CategoryTotals)>;

pub struct TotalsRegistry {
    totals: Rc<CategoryTotals>,
    version: u64,
    subscribers: Vec<Subscriber>,
}

/// Handle injected into every section controller.
pub type SharedRegistry = Rc<RefCell<TotalsRegistry>>;

impl TotalsRegistry {
    pub fn new() -> Self {
        Self {
            totals: Rc::new(CategoryTotals::default()),
            version: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Current snapshot. Cheap to clone; a new allocation exists only after a real change.
    pub fn snapshot(&self) -> Rc<CategoryTotals> {
        Rc::clone(&self.totals)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Subscribers run after every real change, with the new snapshot. They must not
    /// borrow the registry again.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CategoryTotals) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Returns whether the stored totals changed.
    pub fn update(&mut self, update: CategoryUpdate) -> bool {
        let update = update.into_finite();
        if update.matches(&self.totals) {
            tracing::trace!(category = update.name(), "totals unchanged, skipping");
            return false;
        }

        let category = update.name();
        let mut next = CategoryTotals::clone(&self.totals);
        update.apply(&mut next);
        self.totals = Rc::new(next);
        self.version += 1;
        tracing::debug!(category, version = self.version, "totals updated");

        let snapshot = Rc::clone(&self.totals);
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&snapshot);
        }
        true
    }
}

impl Default for TotalsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TotalsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TotalsRegistry")
            .field("totals", &self.totals)
            .field("version", &self.version)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn person(name: &str, amount: f64) -> PersonRevenue {
        PersonRevenue {
            name: name.to_string(),
            amount,
        }
    }

    #[test]
    fn test_update_replaces_value_and_bumps_version() {
        let mut registry = TotalsRegistry::new();
        assert!(registry.update(CategoryUpdate::FixedExpenses(1200.0)));
        assert_eq!(registry.snapshot().fixed_expenses, 1200.0);
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn test_equal_update_keeps_snapshot_identity() {
        let mut registry = TotalsRegistry::new();
        registry.update(CategoryUpdate::Apartments(-300.0));
        let before = registry.snapshot();

        assert!(!registry.update(CategoryUpdate::Apartments(-300.0)));
        assert!(Rc::ptr_eq(&before, &registry.snapshot()));
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn test_real_change_allocates_new_snapshot() {
        let mut registry = TotalsRegistry::new();
        let before = registry.snapshot();
        registry.update(CategoryUpdate::Revenue(10.0));
        assert!(!Rc::ptr_eq(&before, &registry.snapshot()));
        assert_eq!(before.revenue, 0.0);
    }

    #[test]
    fn test_person_list_equality_is_ordered_name_and_amount() {
        let mut registry = TotalsRegistry::new();
        registry.update(CategoryUpdate::RevenueByPerson(vec![
            person("Alice", 100.0),
            person("Bob", 50.0),
        ]));
        let before = registry.snapshot();

        assert!(!registry.update(CategoryUpdate::RevenueByPerson(vec![
            person("Alice", 100.0),
            person("Bob", 50.0),
        ])));
        assert!(Rc::ptr_eq(&before, &registry.snapshot()));

        assert!(registry.update(CategoryUpdate::RevenueByPerson(vec![
            person("Bob", 50.0),
            person("Alice", 100.0),
        ])));
        assert!(registry.update(CategoryUpdate::RevenueByPerson(vec![person("Bob", 50.0)])));
        assert!(registry.update(CategoryUpdate::RevenueByPerson(vec![person("Bobby", 50.0)])));
    }

    #[test]
    fn test_subscribers_only_see_real_changes() {
        let calls = Rc::new(Cell::new(0));
        let mut registry = TotalsRegistry::new();
        let seen = Rc::clone(&calls);
        registry.subscribe(move |_| seen.set(seen.get() + 1));

        registry.update(CategoryUpdate::VariableExpenses(80.0));
        registry.update(CategoryUpdate::VariableExpenses(80.0));
        registry.update(CategoryUpdate::FixedExpenses(0.0));
        registry.update(CategoryUpdate::VariableExpenses(90.0));

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_non_finite_totals_are_stored_as_zero() {
        let mut registry = TotalsRegistry::new();
        assert!(registry.update(CategoryUpdate::Apartments(12.0)));
        assert!(registry.update(CategoryUpdate::Apartments(f64::NAN)));
        assert_eq!(registry.snapshot().apartments, 0.0);

        let version = registry.version();
        assert!(!registry.update(CategoryUpdate::Apartments(f64::NAN)));
        assert!(!registry.update(CategoryUpdate::Apartments(f64::NEG_INFINITY)));
        assert_eq!(registry.version(), version);

        assert!(!registry.update(CategoryUpdate::RevenueByPerson(vec![])));
        assert!(registry.update(CategoryUpdate::RevenueByPerson(vec![person("Alice", f64::NAN)])));
        assert!(!registry.update(CategoryUpdate::RevenueByPerson(vec![person("Alice", f64::NAN)])));
        assert_eq!(registry.snapshot().revenue_by_person[0].amount, 0.0);
    }
}
