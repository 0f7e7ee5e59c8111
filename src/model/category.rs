use serde::{Deserialize, Serialize};

/// The categories Sesterce uses for spending. A row whose category is one of these goes to the
/// Expenses tab and every other row goes to the Incomes tab. Matching is exact, including case and
/// accents.
pub(crate) const EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentación",
    "Vivienda",
    "Transporte",
    "Servicios",
    "Ocios / Salidas",
    "Compras personales",
    "Salud / Bienestar",
    "Viajes",
    "Otros",
];

/// One of the two collections that transformed rows are routed into.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(Bucket);
serde_plain::derive_fromstr_from_deserialize!(Bucket);

impl Bucket {
    /// Routes a row by its category label.
    pub fn for_category(category: &str) -> Self {
        if EXPENSE_CATEGORIES.contains(&category) {
            Bucket::Expense
        } else {
            Bucket::Income
        }
    }
}
