pub mod aggregators;
pub mod correction;
pub mod drivers;
pub mod procedures;

pub use aggregators::*;
pub use correction::*;
pub use drivers::*;
pub use procedures::StatrsProcedures;
