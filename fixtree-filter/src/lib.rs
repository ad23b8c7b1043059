/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixTree Filter
//!
//! Keep/drop decisions for decoded message trees, driven by `Filter` and
//! `SubFilter` schema attributes and by per-session admitted values.

pub mod filter;
pub mod index;
pub mod session;

pub use filter::{FilterConfig, SchemaFilter};
pub use index::{FilterIndex, SpecialAttribute};
pub use session::{SessionFilterStore, SessionId};
