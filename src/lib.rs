pub mod braille;
pub mod compositor;
pub mod config;
pub mod events;
pub mod grid;
pub mod interaction;
pub mod io;
pub mod pacing;
pub mod palette;
pub mod patterns;
pub mod rules;
pub mod simulation;
pub mod step;
pub mod term;
