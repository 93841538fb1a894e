// Scan, select and prune a backup directory
pub mod clear;
