//! Dated tasks: model, store service, interaction tokens, and rendering.

pub mod clock;
pub mod model;
pub mod render;
pub mod store;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use model::{NewTask, Task, TaskUpdate};
pub use store::TaskStore;
