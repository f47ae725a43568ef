pub mod file_times;

pub use filetime::FileTime;
