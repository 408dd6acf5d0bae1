//! SeaORM entity definitions.

pub mod analysis;
pub mod api_key;
pub mod generation_batch;
pub mod project;
pub mod test_case;
