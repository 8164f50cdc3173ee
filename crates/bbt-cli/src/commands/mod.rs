//! Command implementations

pub(crate) mod common;

pub(crate) mod compile;
pub(crate) mod init;
pub(crate) mod run;
