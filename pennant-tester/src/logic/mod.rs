pub mod invariants;
pub mod league;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use league::TesterAssets;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
