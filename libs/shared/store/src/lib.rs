pub mod clinic;
pub mod state;

pub use clinic::{ClinicStore, ClinicTables, StoreError};
pub use state::AppState;
