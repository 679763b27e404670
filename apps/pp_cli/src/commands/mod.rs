// apps/pp_cli/src/commands/mod.rs

pub mod adcirc2sel;
pub mod boundary;
pub mod extract;
pub mod info;
pub mod sel2adcirc;
