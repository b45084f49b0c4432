pub mod odds_api;
pub mod supabase;

pub use odds_api::SharpOddsResolver;
pub use supabase::ReconciliationSink;
