pub mod allergy;
pub mod drug;
pub mod enums;
pub mod interaction;
pub mod patient;
pub mod prescription;

pub use allergy::*;
pub use drug::*;
pub use interaction::*;
pub use patient::*;
pub use prescription::*;
