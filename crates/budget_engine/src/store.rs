use models::{Apartment, ApartmentField, ApartmentFields, ApartmentKind, LineItem, Person, UNTITLED};
use std::collections::HashSet;

/// Coerces user input into a valid amount: non-finite or negative values become 0.
pub fn sanitize_amount(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Blank names fall back to the shared placeholder.
pub fn sanitize_name(raw: &str) -> String {
    if raw.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        raw.to_string()
    }
}

/// Monotonic id source. Ids handed out are never reused, even after removal.
/// `next` is `None` once `u32::MAX` has been handed out.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Option<u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: Some(1) }
    }

    /// Starts past the highest id already in use.
    pub fn after(max_existing: Option<u32>) -> Self {
        Self {
            next: max_existing.map_or(Some(1), |m| m.checked_add(1)),
        }
    }

    /// Returns `None` when the id space is exhausted.
    pub fn allocate(&mut self) -> Option<u32> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Keyed {
    fn id(&self) -> u32;
}

impl Keyed for LineItem {
    fn id(&self) -> u32 {
        self.id
    }
}

impl Keyed for Apartment {
    fn id(&self) -> u32 {
        self.id
    }
}

/// Ordered entries with unique ids and their own id counter.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: Vec<T>,
    ids: IdAllocator,
}

impl<T: Keyed> Collection<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Builds a collection from loaded entries, keeping the first entry of any duplicated id.
    pub fn from_entries(entries: Vec<T>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if seen.insert(entry.id()) {
                kept.push(entry);
            } else {
                tracing::warn!(id = entry.id(), "dropping entry with duplicate id");
            }
        }
        let ids = IdAllocator::after(kept.iter().map(Keyed::id).max());
        Self { entries: kept, ids }
    }

    /// Appends a new entry under a fresh id, or refuses when no id is left.
    pub fn insert_with(&mut self, build: impl FnOnce(u32) -> T) -> Option<u32> {
        let Some(id) = self.ids.allocate() else {
            tracing::warn!(len = self.entries.len(), "id space exhausted, entry not added");
            return None;
        };
        self.entries.push(build(id));
        Some(id)
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Keyed> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type LineItems = Collection<LineItem>;

impl Collection<LineItem> {
    /// Loads items, coercing names and amounts the same way edits do.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| LineItem {
                id: item.id,
                name: sanitize_name(&item.name),
                amount: sanitize_amount(item.amount),
            })
            .collect();
        Self::from_entries(items)
    }

    /// Appends a zero-amount item named `"{placeholder} {id}"`.
    pub fn add(&mut self, placeholder: &str) -> Option<u32> {
        self.insert_with(|id| LineItem {
            id,
            name: format!("{} {}", placeholder, id),
            amount: 0.0,
        })
    }

    pub fn rename(&mut self, id: u32, name: &str) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.name = sanitize_name(name);
                true
            }
            None => false,
        }
    }

    pub fn set_amount(&mut self, id: u32, amount: f64) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                if !amount.is_finite() {
                    tracing::warn!(id, "non-finite amount coerced to 0");
                }
                item.amount = sanitize_amount(amount);
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<LineItem> {
        self.as_slice().to_vec()
    }
}

/// A person together with their own revenue collection.
#[derive(Debug, Clone)]
pub struct PersonLedger {
    pub id: u32,
    pub name: String,
    pub revenues: LineItems,
}

impl Keyed for PersonLedger {
    fn id(&self) -> u32 {
        self.id
    }
}

impl PersonLedger {
    pub fn from_model(person: Person) -> Self {
        Self {
            id: person.id,
            name: sanitize_name(&person.name),
            revenues: LineItems::from_items(person.revenues),
        }
    }

    pub fn to_model(&self) -> Person {
        Person {
            id: self.id,
            name: self.name.clone(),
            revenues: self.revenues.to_vec(),
        }
    }
}

pub type Persons = Collection<PersonLedger>;

impl Collection<PersonLedger> {
    /// Loads persons, creating a default one when none are given.
    pub fn from_people(people: Vec<Person>) -> Self {
        let mut persons = Self::from_entries(people.into_iter().map(PersonLedger::from_model).collect());
        if persons.is_empty() {
            let _ = persons.add_person();
        }
        persons
    }

    pub fn add_person(&mut self) -> Option<u32> {
        self.insert_with(|id| PersonLedger {
            id,
            name: format!("Person {}", id),
            revenues: LineItems::new(),
        })
    }

    pub fn rename_person(&mut self, id: u32, name: &str) -> bool {
        match self.get_mut(id) {
            Some(person) => {
                person.name = sanitize_name(name);
                true
            }
            None => false,
        }
    }

    /// Refuses to remove the last remaining person.
    pub fn remove_person(&mut self, id: u32) -> bool {
        if self.len() <= 1 {
            return false;
        }
        self.remove(id)
    }
}

pub type Apartments = Collection<Apartment>;

impl Collection<Apartment> {
    /// Loads apartments; amounts are sanitized and fields inactive for the kind are zeroed.
    pub fn from_apartments(apartments: Vec<Apartment>) -> Self {
        let apartments = apartments
            .into_iter()
            .map(|mut apt| {
                apt.name = sanitize_name(&apt.name);
                for field in ApartmentField::ALL {
                    let slot = apt.fields.get_mut(field);
                    *slot = if field.applies_to(apt.kind) {
                        sanitize_amount(*slot)
                    } else {
                        0.0
                    };
                }
                apt
            })
            .collect();
        Self::from_entries(apartments)
    }

    pub fn add_apartment(&mut self, kind: ApartmentKind) -> Option<u32> {
        self.insert_with(|id| Apartment {
            id,
            name: format!("Apartment {}", id),
            kind,
            fields: ApartmentFields::default(),
        })
    }

    pub fn rename_apartment(&mut self, id: u32, name: &str) -> bool {
        match self.get_mut(id) {
            Some(apt) => {
                apt.name = sanitize_name(name);
                true
            }
            None => false,
        }
    }

    /// Switches kind, zeroing the fields the new kind does not use. Rent changes meaning
    /// (received vs. paid) so it is reset as well; insurance is kept.
    pub fn set_kind(&mut self, id: u32, kind: ApartmentKind) -> bool {
        let Some(apt) = self.get_mut(id) else {
            return false;
        };
        if apt.kind == kind {
            return true;
        }
        apt.kind = kind;
        for field in ApartmentField::ALL {
            if !field.applies_to(kind) {
                *apt.fields.get_mut(field) = 0.0;
            }
        }
        apt.fields.rent = 0.0;
        true
    }

    /// Writes are ignored for fields the apartment's kind does not use.
    pub fn set_field(&mut self, id: u32, field: ApartmentField, value: f64) -> bool {
        let Some(apt) = self.get_mut(id) else {
            return false;
        };
        if !field.applies_to(apt.kind) {
            tracing::debug!(id, ?field, kind = ?apt.kind, "ignoring inactive apartment field");
            return false;
        }
        *apt.fields.get_mut(field) = sanitize_amount(value);
        true
    }
}
