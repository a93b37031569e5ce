pub mod codec;
pub mod etl;
pub mod pipeline;
pub mod summary;

pub use crate::domain::model::{RawReport, RejectedReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
