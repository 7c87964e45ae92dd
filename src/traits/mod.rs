pub mod unit;

pub use unit::{ExecutionContext, Unit, UnitOutputs, Variables};
