//! Domain layer: pure types and rules, no I/O.

pub mod currency;
pub mod entities;
pub mod facts;
pub mod limits;
pub mod operation;
pub mod state;
pub mod value_objects;

pub use currency::*;
pub use entities::*;
pub use facts::*;
pub use operation::*;
pub use state::*;
pub use value_objects::*;
