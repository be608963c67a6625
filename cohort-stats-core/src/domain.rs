pub mod value;
pub mod table;
pub mod view;
pub mod config;
pub mod report;

pub use value::*;
pub use table::*;
pub use view::*;
pub use config::*;
pub use report::*;
