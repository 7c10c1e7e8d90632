//! Section controllers. Each owns its collection and republishes its category total
//! to the shared registry after every edit.

use std::rc::Rc;

use models::{
    ApartmentField, ApartmentKind, BudgetSnapshot, CategoryTotals, LineItem,
    VariableCategory, VariableGroup,
};

use crate::aggregate;
use crate::registry::{CategoryUpdate, SharedRegistry, TotalsRegistry};
use crate::store::{Apartments, LineItems, Persons};

pub struct RevenueSection {
    persons: Persons,
    registry: SharedRegistry,
}

impl RevenueSection {
    pub fn new(persons: Persons, registry: SharedRegistry) -> Self {
        let section = Self { persons, registry };
        section.publish();
        section
    }

    pub fn persons(&self) -> &Persons {
        &self.persons
    }

    pub fn total(&self) -> f64 {
        aggregate::revenue_total(self.persons.iter())
    }

    fn publish(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.update(CategoryUpdate::Revenue(self.total()));
        registry.update(CategoryUpdate::RevenueByPerson(aggregate::revenue_by_person(
            self.persons.iter(),
        )));
    }

    pub fn add_person(&mut self) -> Option<u32> {
        let id = self.persons.add_person()?;
        self.publish();
        Some(id)
    }

    pub fn rename_person(&mut self, person_id: u32, name: &str) {
        if self.persons.rename_person(person_id, name) {
            self.publish();
        }
    }

    /// Returns false when the person is unknown or is the last one left.
    pub fn remove_person(&mut self, person_id: u32) -> bool {
        let removed = self.persons.remove_person(person_id);
        if removed {
            self.publish();
        }
        removed
    }

    pub fn add_revenue(&mut self, person_id: u32) -> Option<u32> {
        let person = self.persons.get_mut(person_id)?;
        let id = person.revenues.add("Revenue")?;
        self.publish();
        Some(id)
    }

    pub fn rename_revenue(&mut self, person_id: u32, item_id: u32, name: &str) {
        if let Some(person) = self.persons.get_mut(person_id) {
            person.revenues.rename(item_id, name);
        }
    }

    pub fn set_revenue_amount(&mut self, person_id: u32, item_id: u32, amount: f64) {
        let changed = self
            .persons
            .get_mut(person_id)
            .is_some_and(|p| p.revenues.set_amount(item_id, amount));
        if changed {
            self.publish();
        }
    }

    pub fn remove_revenue(&mut self, person_id: u32, item_id: u32) {
        let removed = self
            .persons
            .get_mut(person_id)
            .is_some_and(|p| p.revenues.remove(item_id));
        if removed {
            self.publish();
        }
    }
}

pub struct FixedExpensesSection {
    items: LineItems,
    registry: SharedRegistry,
}

impl FixedExpensesSection {
    pub fn new(items: LineItems, registry: SharedRegistry) -> Self {
        let section = Self { items, registry };
        section.publish();
        section
    }

    pub fn items(&self) -> &LineItems {
        &self.items
    }

    pub fn total(&self) -> f64 {
        aggregate::items_total(self.items.as_slice())
    }

    fn publish(&self) {
        self.registry
            .borrow_mut()
            .update(CategoryUpdate::FixedExpenses(self.total()));
    }

    pub fn add(&mut self) -> Option<u32> {
        let id = self.items.add("Expense")?;
        self.publish();
        Some(id)
    }

    pub fn rename(&mut self, id: u32, name: &str) {
        self.items.rename(id, name);
    }

    pub fn set_amount(&mut self, id: u32, amount: f64) {
        if self.items.set_amount(id, amount) {
            self.publish();
        }
    }

    pub fn remove(&mut self, id: u32) {
        if self.items.remove(id) {
            self.publish();
        }
    }
}

/// Variable expenses, always one group per [`VariableCategory`], in declaration order.
pub struct VariableExpensesSection {
    groups: Vec<(VariableCategory, LineItems)>,
    registry: SharedRegistry,
}

impl VariableExpensesSection {
    pub fn new(groups: Vec<VariableGroup>, registry: SharedRegistry) -> Self {
        let mut by_category: Vec<(VariableCategory, Vec<LineItem>)> = VariableCategory::ALL
            .iter()
            .map(|c| (*c, Vec::new()))
            .collect();
        for group in groups {
            if let Some((_, items)) = by_category.iter_mut().find(|(c, _)| *c == group.category) {
                items.extend(group.items);
            }
        }
        let groups = by_category
            .into_iter()
            .map(|(c, items)| (c, LineItems::from_items(items)))
            .collect();

        let section = Self { groups, registry };
        section.publish();
        section
    }

    fn group_mut(&mut self, category: VariableCategory) -> &mut LineItems {
        let index = VariableCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        &mut self.groups[index].1
    }

    pub fn group(&self, category: VariableCategory) -> Option<&LineItems> {
        self.groups
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, items)| items)
    }

    pub fn subtotal(&self, category: VariableCategory) -> f64 {
        self.group(category)
            .map_or(0.0, |items| aggregate::items_total(items.as_slice()))
    }

    pub fn subtotals(&self) -> Vec<(VariableCategory, f64)> {
        self.groups
            .iter()
            .map(|(c, items)| (*c, aggregate::items_total(items.as_slice())))
            .collect()
    }

    pub fn total(&self) -> f64 {
        aggregate::finite_or_zero(self.subtotals().iter().map(|(_, v)| v).sum())
    }

    fn publish(&self) {
        self.registry
            .borrow_mut()
            .update(CategoryUpdate::VariableExpenses(self.total()));
    }

    pub fn add(&mut self, category: VariableCategory) -> Option<u32> {
        let id = self.group_mut(category).add(category.label())?;
        self.publish();
        Some(id)
    }

    pub fn rename(&mut self, category: VariableCategory, id: u32, name: &str) {
        self.group_mut(category).rename(id, name);
    }

    pub fn set_amount(&mut self, category: VariableCategory, id: u32, amount: f64) {
        if self.group_mut(category).set_amount(id, amount) {
            self.publish();
        }
    }

    pub fn remove(&mut self, category: VariableCategory, id: u32) {
        if self.group_mut(category).remove(id) {
            self.publish();
        }
    }

    pub fn to_groups(&self) -> Vec<VariableGroup> {
        self.groups
            .iter()
            .map(|(category, items)| VariableGroup {
                category: *category,
                items: items.to_vec(),
            })
            .collect()
    }
}

pub struct ApartmentsSection {
    apartments: Apartments,
    registry: SharedRegistry,
}

impl ApartmentsSection {
    pub fn new(apartments: Apartments, registry: SharedRegistry) -> Self {
        let section = Self {
            apartments,
            registry,
        };
        section.publish();
        section
    }

    pub fn apartments(&self) -> &Apartments {
        &self.apartments
    }

    pub fn total(&self) -> f64 {
        aggregate::apartments_total(self.apartments.iter())
    }

    fn publish(&self) {
        self.registry
            .borrow_mut()
            .update(CategoryUpdate::Apartments(self.total()));
    }

    pub fn add(&mut self, kind: ApartmentKind) -> Option<u32> {
        let id = self.apartments.add_apartment(kind)?;
        self.publish();
        Some(id)
    }

    pub fn rename(&mut self, id: u32, name: &str) {
        self.apartments.rename_apartment(id, name);
    }

    pub fn set_kind(&mut self, id: u32, kind: ApartmentKind) {
        if self.apartments.set_kind(id, kind) {
            self.publish();
        }
    }

    pub fn set_field(&mut self, id: u32, field: ApartmentField, value: f64) {
        if self.apartments.set_field(id, field, value) {
            self.publish();
        }
    }

    pub fn remove(&mut self, id: u32) {
        if self.apartments.remove(id) {
            self.publish();
        }
    }
}

/// The four sections wired to one registry.
pub struct Budget {
    pub revenue: RevenueSection,
    pub fixed: FixedExpensesSection,
    pub variable: VariableExpensesSection,
    pub apartments: ApartmentsSection,
    registry: SharedRegistry,
}

impl Budget {
    pub fn new() -> Self {
        Self::from_snapshot(BudgetSnapshot::default())
    }

    pub fn from_snapshot(snapshot: BudgetSnapshot) -> Self {
        let registry = TotalsRegistry::shared();
        Self {
            revenue: RevenueSection::new(
                Persons::from_people(snapshot.persons),
                Rc::clone(&registry),
            ),
            fixed: FixedExpensesSection::new(
                LineItems::from_items(snapshot.fixed_expenses),
                Rc::clone(&registry),
            ),
            variable: VariableExpensesSection::new(
                snapshot.variable_expenses,
                Rc::clone(&registry),
            ),
            apartments: ApartmentsSection::new(
                Apartments::from_apartments(snapshot.apartments),
                Rc::clone(&registry),
            ),
            registry,
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn totals(&self) -> Rc<CategoryTotals> {
        self.registry.borrow().snapshot()
    }

    pub fn to_snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            persons: self.revenue.persons().iter().map(|p| p.to_model()).collect(),
            fixed_expenses: self.fixed.items().to_vec(),
            variable_expenses: self.variable.to_groups(),
            apartments: self.apartments.apartments().as_slice().to_vec(),
        }
    }

    /// Rebuilds totals straight from section state, bypassing the registry.
    pub fn recompute_totals(&self) -> CategoryTotals {
        CategoryTotals {
            revenue: self.revenue.total(),
            fixed_expenses: self.fixed.total(),
            variable_expenses: self.variable.total(),
            apartments: self.apartments.total(),
            revenue_by_person: aggregate::revenue_by_person(self.revenue.persons().iter()),
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(budget: &Budget) -> Rc<Cell<u32>> {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        budget
            .registry()
            .borrow_mut()
            .subscribe(move |_| seen.set(seen.get() + 1));
        calls
    }

    #[test]
    fn test_new_budget_has_one_person_and_zero_totals() {
        let budget = Budget::new();
        assert_eq!(budget.revenue.persons().len(), 1);
        let totals = budget.totals();
        assert_eq!(totals.revenue, 0.0);
        assert_eq!(totals.revenue_by_person.len(), 1);
        assert_eq!(totals.revenue_by_person[0].name, "Person 1");
    }

    #[test]
    fn test_edits_flow_into_registry() {
        let mut budget = Budget::new();
        let person = budget.revenue.persons().iter().next().unwrap().id;
        let salary = budget.revenue.add_revenue(person).unwrap();
        budget.revenue.set_revenue_amount(person, salary, 2500.0);

        let rent = budget.fixed.add().unwrap();
        budget.fixed.set_amount(rent, 900.0);

        let food = budget.variable.add(VariableCategory::Groceries).unwrap();
        budget.variable.set_amount(VariableCategory::Groceries, food, 300.0);
        let bus = budget.variable.add(VariableCategory::Transport).unwrap();
        budget.variable.set_amount(VariableCategory::Transport, bus, 50.0);

        let flat = budget.apartments.add(ApartmentKind::Owned).unwrap();
        budget.apartments.set_field(flat, ApartmentField::Rent, 600.0);
        budget.apartments.set_field(flat, ApartmentField::LoanPayment, 400.0);

        let totals = budget.totals();
        assert_eq!(totals.revenue, 2500.0);
        assert_eq!(totals.fixed_expenses, 900.0);
        assert_eq!(totals.variable_expenses, 350.0);
        assert_eq!(totals.apartments, 200.0);
        assert_eq!(totals.net_balance(), 1450.0);
        assert_eq!(*totals, budget.recompute_totals());
        assert_eq!(budget.variable.subtotal(VariableCategory::Transport), 50.0);
    }

    #[test]
    fn test_rename_of_expense_does_not_notify() {
        let mut budget = Budget::new();
        let id = budget.fixed.add().unwrap();
        budget.fixed.set_amount(id, 10.0);
        let calls = counting(&budget);

        budget.fixed.rename(id, "Insurance");
        budget.fixed.set_amount(id, 10.0);
        assert_eq!(calls.get(), 0);

        budget.fixed.set_amount(id, 11.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_edits_netting_to_same_total_are_no_ops_downstream() {
        let mut budget = Budget::new();
        let a = budget.fixed.add().unwrap();
        budget.fixed.set_amount(a, 100.0);
        let before = budget.totals();
        let calls = counting(&budget);

        let empty = budget.fixed.add().unwrap();
        budget.fixed.remove(empty);
        let leisure = budget.variable.add(VariableCategory::Leisure).unwrap();
        budget.variable.set_amount(VariableCategory::Leisure, leisure, f64::NAN);

        assert_eq!(calls.get(), 0);
        assert!(Rc::ptr_eq(&before, &budget.totals()));
    }

    #[test]
    fn test_renaming_person_updates_breakdown() {
        let mut budget = Budget::new();
        let id = budget.revenue.persons().iter().next().unwrap().id;
        budget.revenue.rename_person(id, "Camille");
        assert_eq!(budget.totals().revenue_by_person[0].name, "Camille");

        budget.revenue.rename_person(id, "  ");
        assert_eq!(budget.totals().revenue_by_person[0].name, models::UNTITLED);
    }

    #[test]
    fn test_last_person_removal_is_refused() {
        let mut budget = Budget::new();
        let id = budget.revenue.persons().iter().next().unwrap().id;
        assert!(!budget.revenue.remove_person(id));
        let other = budget.revenue.add_person().unwrap();
        assert!(budget.revenue.remove_person(other));
        assert_eq!(budget.totals().revenue_by_person.len(), 1);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_sections() {
        let mut budget = Budget::new();
        let flat = budget.apartments.add(ApartmentKind::Rental).unwrap();
        budget.apartments.set_field(flat, ApartmentField::Rent, 750.0);
        let fun = budget.variable.add(VariableCategory::Leisure).unwrap();
        budget.variable.set_amount(VariableCategory::Leisure, fun, 120.0);

        let restored = Budget::from_snapshot(budget.to_snapshot());
        assert_eq!(*restored.totals(), *budget.totals());
        assert_eq!(restored.variable.to_groups().len(), VariableCategory::ALL.len());
    }

    #[test]
    fn test_kind_switch_republishes_apartment_total() {
        let mut budget = Budget::from_snapshot(BudgetSnapshot {
            apartments: vec![models::Apartment {
                id: 1,
                name: "Loft".into(),
                kind: ApartmentKind::Rental,
                fields: models::ApartmentFields {
                    rent: 800.0,
                    gas: 45.0,
                    ..Default::default()
                },
            }],
            ..Default::default()
        });
        assert_eq!(budget.totals().apartments, -845.0);
        budget.apartments.set_kind(1, ApartmentKind::Owned);
        assert_eq!(budget.totals().apartments, 0.0);
    }

    #[test]
    fn test_add_after_last_id_is_refused() {
        let mut budget = Budget::from_snapshot(BudgetSnapshot {
            fixed_expenses: vec![LineItem {
                id: u32::MAX,
                name: "Imported".into(),
                amount: 12.0,
            }],
            ..Default::default()
        });
        let calls = counting(&budget);

        assert_eq!(budget.fixed.add(), None);
        assert_eq!(budget.fixed.items().len(), 1);
        assert_eq!(budget.totals().fixed_expenses, 12.0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_overflowing_apartments_stay_finite_and_quiet() {
        let mut budget = Budget::new();
        let first = budget.apartments.add(ApartmentKind::Owned).unwrap();
        let second = budget.apartments.add(ApartmentKind::Owned).unwrap();
        let rental = budget.apartments.add(ApartmentKind::Rental).unwrap();
        budget.apartments.set_field(first, ApartmentField::Rent, f64::MAX);
        budget.apartments.set_field(second, ApartmentField::Rent, f64::MAX);
        budget.apartments.set_field(rental, ApartmentField::Rent, f64::MAX);
        budget.apartments.set_field(rental, ApartmentField::Gas, f64::MAX);

        let totals = budget.totals();
        assert!(totals.apartments.is_finite());
        assert!(totals.net_balance().is_finite());

        let calls = counting(&budget);
        budget.apartments.set_field(first, ApartmentField::Rent, f64::MAX);
        assert_eq!(calls.get(), 0);
        assert!(Rc::ptr_eq(&totals, &budget.totals()));
    }
}
