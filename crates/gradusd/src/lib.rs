pub mod cli;
pub mod seed;
