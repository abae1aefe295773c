//! Command implementations.

mod log_run;
mod new_cycle;
mod validate;

pub use log_run::{LogRunCommand, LogRunOutput};
pub use new_cycle::{NewCycleCommand, NewCycleOutput};
pub use validate::{ValidateCommand, ValidationOutput};
