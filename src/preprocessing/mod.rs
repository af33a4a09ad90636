//! Feature preprocessing
//!
//! Mirrors the transformer fitted at training time so serving applies the
//! exact same category tables and scaling parameters:
//! - Ordinal encoding for categorical survey answers
//! - Standard scaling for numerical survey answers
//! - A pipeline combining both into one feature matrix

mod encoder;
mod pipeline;
mod scaler;

pub use encoder::{OrdinalEncoder, UNSEEN_CATEGORY};
pub use pipeline::Preprocessor;
pub use scaler::{ScalerParams, StandardScaler};
