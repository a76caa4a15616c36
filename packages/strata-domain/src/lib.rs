pub mod date_serde;
pub mod entity;
pub mod label;
pub mod loader;
pub mod text;

pub use entity::{ActionTask, Priority, StrategicObjective};
pub use label::AlignmentLabel;
pub use loader::{Error as LoaderError, load_actions, load_strategies};
