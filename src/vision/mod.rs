pub mod remote;
pub mod r#trait;

pub use r#trait::{LabelProvider, NoopLabelProvider};
pub use remote::VisionService;
