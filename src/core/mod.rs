pub mod block;
pub mod script;
pub mod spent_outputs;
pub mod transaction;
pub mod verify;
