//! Pure reductions from section state to category totals.

use models::{Apartment, ApartmentKind, LineItem, PersonRevenue};

use crate::store::PersonLedger;

/// Sums that overflow collapse to 0, like non-finite input does.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn items_total(items: &[LineItem]) -> f64 {
    finite_or_zero(items.iter().map(|i| i.amount).sum())
}

pub fn person_total(person: &PersonLedger) -> f64 {
    items_total(person.revenues.as_slice())
}

pub fn revenue_total<'a>(persons: impl IntoIterator<Item = &'a PersonLedger>) -> f64 {
    finite_or_zero(persons.into_iter().map(person_total).sum())
}

pub fn revenue_by_person<'a>(
    persons: impl IntoIterator<Item = &'a PersonLedger>,
) -> Vec<PersonRevenue> {
    persons
        .into_iter()
        .map(|p| PersonRevenue {
            name: p.name.clone(),
            amount: person_total(p),
        })
        .collect()
}

/// Signed monthly result of one apartment: owned apartments earn rent minus their
/// costs, rented ones only cost money.
pub fn apartment_total(apartment: &Apartment) -> f64 {
    let f = &apartment.fields;
    let total = match apartment.kind {
        ApartmentKind::Owned => {
            f.rent
                - (f.income_tax
                    + f.property_tax
                    + f.co_ownership_charges
                    + f.insurance
                    + f.loan_payment
                    + f.loan_insurance)
        }
        ApartmentKind::Rental => {
            -(f.rent + f.insurance + f.internet + f.water + f.electricity + f.gas)
        }
    };
    finite_or_zero(total)
}

pub fn apartments_total<'a>(apartments: impl IntoIterator<Item = &'a Apartment>) -> f64 {
    finite_or_zero(apartments.into_iter().map(apartment_total).sum())
}
