pub mod csv_load;
pub mod file;
pub mod sample;
pub mod stdin;
