//! Global output flags, shared across subcommands via environment
//! variables so every module can check them without threading state.

pub fn is_quiet() -> bool {
    std::env::var("ULASAN_QUIET").is_ok()
}

pub fn is_json() -> bool {
    std::env::var("ULASAN_JSON").is_ok()
}
