use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";

// Budget input models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
	pub id: u32,
	pub name: String,
	#[serde(default)]
	pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
	pub id: u32,
	pub name: String,
	#[serde(default)]
	pub revenues: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApartmentKind {
	Rental,
	Owned,
}

/// Numeric attributes of an apartment. Which of them count depends on the
/// apartment kind, see [`ApartmentField::applies_to`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApartmentFields {
	pub rent: f64,
	pub insurance: f64,
	// rental only
	pub internet: f64,
	pub water: f64,
	pub electricity: f64,
	pub gas: f64,
	// owned only
	pub income_tax: f64,
	pub property_tax: f64,
	pub co_ownership_charges: f64,
	pub loan_payment: f64,
	pub loan_insurance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApartmentField {
	Rent,
	Insurance,
	Internet,
	Water,
	Electricity,
	Gas,
	IncomeTax,
	PropertyTax,
	CoOwnershipCharges,
	LoanPayment,
	LoanInsurance,
}

impl ApartmentField {
	pub const ALL: [ApartmentField; 11] = [
		ApartmentField::Rent,
		ApartmentField::Insurance,
		ApartmentField::Internet,
		ApartmentField::Water,
		ApartmentField::Electricity,
		ApartmentField::Gas,
		ApartmentField::IncomeTax,
		ApartmentField::PropertyTax,
		ApartmentField::CoOwnershipCharges,
		ApartmentField::LoanPayment,
		ApartmentField::LoanInsurance,
	];

	pub fn applies_to(self, kind: ApartmentKind) -> bool {
		match self {
			ApartmentField::Rent | ApartmentField::Insurance => true,
			ApartmentField::Internet
			| ApartmentField::Water
			| ApartmentField::Electricity
			| ApartmentField::Gas => kind == ApartmentKind::Rental,
			ApartmentField::IncomeTax
			| ApartmentField::PropertyTax
			| ApartmentField::CoOwnershipCharges
			| ApartmentField::LoanPayment
			| ApartmentField::LoanInsurance => kind == ApartmentKind::Owned,
		}
	}
}

impl ApartmentFields {
	pub fn get(&self, field: ApartmentField) -> f64 {
		match field {
			ApartmentField::Rent => self.rent,
			ApartmentField::Insurance => self.insurance,
			ApartmentField::Internet => self.internet,
			ApartmentField::Water => self.water,
			ApartmentField::Electricity => self.electricity,
			ApartmentField::Gas => self.gas,
			ApartmentField::IncomeTax => self.income_tax,
			ApartmentField::PropertyTax => self.property_tax,
			ApartmentField::CoOwnershipCharges => self.co_ownership_charges,
			ApartmentField::LoanPayment => self.loan_payment,
			ApartmentField::LoanInsurance => self.loan_insurance,
		}
	}

	pub fn get_mut(&mut self, field: ApartmentField) -> &mut f64 {
		match field {
			ApartmentField::Rent => &mut self.rent,
			ApartmentField::Insurance => &mut self.insurance,
			ApartmentField::Internet => &mut self.internet,
			ApartmentField::Water => &mut self.water,
			ApartmentField::Electricity => &mut self.electricity,
			ApartmentField::Gas => &mut self.gas,
			ApartmentField::IncomeTax => &mut self.income_tax,
			ApartmentField::PropertyTax => &mut self.property_tax,
			ApartmentField::CoOwnershipCharges => &mut self.co_ownership_charges,
			ApartmentField::LoanPayment => &mut self.loan_payment,
			ApartmentField::LoanInsurance => &mut self.loan_insurance,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
	pub id: u32,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: ApartmentKind,
	#[serde(default)]
	pub fields: ApartmentFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableCategory {
	Groceries,
	Transport,
	Leisure,
	Health,
	Miscellaneous,
}

impl VariableCategory {
	pub const ALL: [VariableCategory; 5] = [
		VariableCategory::Groceries,
		VariableCategory::Transport,
		VariableCategory::Leisure,
		VariableCategory::Health,
		VariableCategory::Miscellaneous,
	];

	pub fn label(self) -> &'static str {
		match self {
			VariableCategory::Groceries => "Groceries",
			VariableCategory::Transport => "Transport",
			VariableCategory::Leisure => "Leisure",
			VariableCategory::Health => "Health",
			VariableCategory::Miscellaneous => "Miscellaneous",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableGroup {
	pub category: VariableCategory,
	#[serde(default)]
	pub items: Vec<LineItem>,
}

/// Full state of the four budget sections, as posted by a client or read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSnapshot {
	pub persons: Vec<Person>,
	pub fixed_expenses: Vec<LineItem>,
	pub variable_expenses: Vec<VariableGroup>,
	pub apartments: Vec<Apartment>,
}

// Derived totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRevenue {
	pub name: String,
	pub amount: f64,
}

/// Last known total of every category. Expense totals are magnitudes, the
/// apartments total carries its sign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
	pub revenue: f64,
	pub fixed_expenses: f64,
	pub variable_expenses: f64,
	pub apartments: f64,
	pub revenue_by_person: Vec<PersonRevenue>,
}

impl CategoryTotals {
	pub fn net_balance(&self) -> f64 {
		self.revenue + self.apartments - self.fixed_expenses - self.variable_expenses
	}
}

// Bilan output models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceKind {
	Person,
	Revenue,
	Apartments,
	FixedExpenses,
	VariableExpenses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
	Positive,
	Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
	pub label: String,
	pub kind: SliceKind,
	pub tone: Tone,
	pub value: f64,
	pub percent: u32,
	pub start_deg: f64,
	pub end_deg: f64,
	pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
	pub gradient: String,
	pub empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
	pub label: String,
	pub color: String,
	pub radius: f64,
	pub circumference: f64,
	pub dash: f64,
	pub gap: f64,
	pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donut {
	pub label: String,
	pub percent: u32,
	pub gradient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSegment {
	pub label: String,
	pub color: String,
	pub width_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedBars {
	pub positive: Vec<BarSegment>,
	pub negative: Vec<BarSegment>,
}

/// Colours handed to the chart projections. Values are opaque CSS colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPalette {
	pub series: Vec<String>,
	pub positive: String,
	pub negative: String,
	pub fixed: String,
	pub variable: String,
	pub neutral: String,
}

impl Default for ChartPalette {
	fn default() -> Self {
		Self {
			series: vec![
				"#4f8ef7".to_string(),
				"#9b6cf0".to_string(),
				"#2fb6a7".to_string(),
				"#f2a93b".to_string(),
			],
			positive: "#3fb950".to_string(),
			negative: "#f85149".to_string(),
			fixed: "#e3742f".to_string(),
			variable: "#d9a521".to_string(),
			neutral: "#d0d7de".to_string(),
		}
	}
}

impl ChartPalette {
	pub fn series_color(&self, index: usize) -> &str {
		if self.series.is_empty() {
			return &self.neutral;
		}
		&self.series[index % self.series.len()]
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilanReport {
	pub generated_at: String,
	pub totals: CategoryTotals,
	pub net_balance: f64,
	pub total: f64,
	pub slices: Vec<Slice>,
	pub pie: PieChart,
	pub rings: Vec<Ring>,
	pub donuts: Vec<Donut>,
	pub bars: StackedBars,
}
