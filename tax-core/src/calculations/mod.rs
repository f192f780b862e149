//! Tax computation for Thai personal income tax.
//!
//! Leaves first: [`TaxBracketEngine`] turns a taxable amount into tax,
//! [`DeductionPoolAllocator`] clamps a plan's deductions, [`ScenarioEngine`]
//! combines both for one scenario, and [`ComparisonCoordinator`] runs the
//! baseline and both plans side by side.

pub mod allocator;
pub mod bracket_engine;
mod capacity;
pub mod common;
pub mod comparison;
pub mod scenario;

pub use allocator::{Allocation, DeductionPoolAllocator};
pub use bracket_engine::TaxBracketEngine;
pub use comparison::{ComparisonCoordinator, recommend, roi};
pub use scenario::ScenarioEngine;
