pub mod book;
pub mod error;
pub mod predictor;
pub mod types;

pub use book::AdpcmBook;
pub use error::{Error, VadpcmResult};
pub use predictor::{expand_table, inner_product, Codebook, Predictor, TABLE_WIDTH, UNITY};
pub use types::*;
