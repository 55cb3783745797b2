// Database rows, response shapes and request payloads

pub mod coaching;
pub mod community;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod formation;
pub mod message;
pub mod serde_ext;
pub mod user;
pub mod validation;

pub use coaching::*;
pub use community::*;
pub use course::*;
pub use dashboard::*;
pub use enrollment::*;
pub use formation::*;
pub use message::*;
pub use user::*;
pub use validation::*;
