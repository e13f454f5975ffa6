pub mod automation_loop;
pub mod mass_fill;

pub use automation_loop::{AutomationControl, spawn_automation_task};
pub use mass_fill::{FillPacing, MassFillReport, run_mass_fill};
