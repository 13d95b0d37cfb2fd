pub mod astrology;
pub mod cards;
pub mod persona;
pub mod prompt;
