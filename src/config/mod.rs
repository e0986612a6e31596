// Re-export all items from the submodules
mod env_vars;
mod source_spec;

// Re-export environment lookups
pub use env_vars::{
    EnvLookup,
    ProcessEnv,
    StaticEnv,
    process_env,
};

// Re-export hive source configuration
pub use source_spec::SourceSpec;
