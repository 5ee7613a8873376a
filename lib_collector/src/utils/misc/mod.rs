/// Identity of the running process and its host, used to stamp log records.
pub mod sys_info;
/// General helper functions for timestamps and duration formatting.
pub mod utils;
