//! Unit tests for the deadline subsystem.
//!
//! Worker behaviour is covered end-to-end in the `tests/` directory;
//! these exercise the registry ordering rules directly.
