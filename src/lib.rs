pub mod constants;
pub mod datasets;
pub mod env_state;
pub mod files;
pub mod logs;
pub mod phab_errors;
pub mod simbad;
pub mod statistics;
pub mod strings;
pub mod tap;
pub mod tasks;
