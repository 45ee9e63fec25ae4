// Built-in ecosystem plugins
pub mod rubygem;

pub use rubygem::RubygemPlugin;
