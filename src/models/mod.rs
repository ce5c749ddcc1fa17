mod budget;
mod category;
mod expense;
mod filter;
mod period;

pub use budget::Budget;
pub use category::{Category, DEFAULT_CATEGORIES};
pub use expense::{Expense, NewExpense};
pub use filter::ExpenseFilter;
pub use period::Period;

pub(crate) use expense::ValidExpense;

#[cfg(test)]
mod tests;
