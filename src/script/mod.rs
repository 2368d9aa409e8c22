//! Entity scripts: values, expressions, listen patterns and actions
//!
//! Scripts are plain data. A front end (text DSL, editor) builds them; the
//! simulation context executes them one action at a time.

pub mod action;
pub mod expr;
pub mod pattern;
pub mod pretty_print;
pub mod value;

pub use action::{Action, HaltScope, Method, Script};
pub use expr::{eval_all, Expr, Scope};
pub use pattern::{Pattern, Slot};
pub use value::Value;
