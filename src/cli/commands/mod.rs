pub mod ape;
pub mod catalog;
pub mod chain;
pub mod compile;
pub mod config;
pub mod generate;
pub mod history;
pub mod run;
pub mod score;
pub mod usage;
