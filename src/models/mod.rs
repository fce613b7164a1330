pub mod bar;
pub mod series;

pub use self::bar::{Bar, RawBar};
pub use self::series::{DerivedColumn, Series};
