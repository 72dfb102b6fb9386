pub mod cli;
pub mod igc;
pub mod server;
pub mod track;
