// File I/O: register tables, storage listings and report files

pub mod csv;
pub mod json;
pub mod register;
pub mod report;
pub mod storage;
pub mod xlsx;

pub use register::{read_register, RegisterOptions};
pub use report::{ReconReport, ReportMeta};
pub use storage::{list_folder, read_manifest};
