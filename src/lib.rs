mod chord;
mod error;
mod notes;
mod parser;
mod pattern;
mod player;
mod progression;
mod voicing;

pub use chord::*;
pub use error::*;
pub use notes::*;
pub use parser::*;
pub use pattern::*;
pub use player::*;
pub use progression::*;
pub use voicing::*;
