pub mod common;
pub mod defaults;
pub mod generate;
pub mod kind;
pub mod run;
pub mod synthetic;
