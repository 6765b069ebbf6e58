//! Group editing logic that does not depend on GTK.

pub mod controller;
pub mod markup;
pub mod targets;
pub mod template;
