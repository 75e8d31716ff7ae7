//! End-to-end migrations over in-memory and on-disk projects.

mod acme_core_17;
mod disk_project;
