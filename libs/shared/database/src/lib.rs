pub mod memory;
pub mod state;
pub mod store;
pub mod supabase;
pub mod test_support;

pub use memory::InMemoryStore;
pub use state::AppState;
pub use store::{ClinicStore, RuleInsert, SlotClaim};
pub use supabase::{SupabaseClient, SupabaseStore};
