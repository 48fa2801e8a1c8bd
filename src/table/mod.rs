//! Swap table construction broken into focused submodules for easier testing.

mod building;
mod lookup;
mod scanning;

pub use building::{TableBuild, build_swap_table, generate_swap_table};
pub use lookup::SwapTable;
pub use scanning::{DirectoryScanner, scan, scan_root};
