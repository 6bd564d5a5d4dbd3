pub mod cat_features;
pub mod convert_scp;
pub mod report;
pub mod subset_scp;

mod lines;

pub use cat_features::{CatOptions, CatSummary, HeaderSummary};
pub use convert_scp::{ConvertOptions, ConvertSummary};
pub use subset_scp::{SubsetOptions, SubsetSummary};
