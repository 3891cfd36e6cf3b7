mod common;
pub use common::*;

mod stack;
pub use stack::*;

mod machine;
pub use machine::*;

mod host;
pub use host::*;
