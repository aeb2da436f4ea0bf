//! Default configuration values

/// Width used when neither the config nor the terminal provides one
pub const DEFAULT_WIDTH: usize = 80;

/// Config file name looked up in the working directory and config dir
pub const CONFIG_FILE_NAME: &str = "termdown.toml";

/// Commented template printed by `--make-config`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# termdown configuration
#
# Looked up in ./termdown.toml, ./.termdown.toml and
# ~/.config/termdown/config.toml (first found wins per level, local overrides global).

[tokenizer]
# GitHub-style tables
table = true
# ~~strikethrough~~
strikethrough = true

[render]
# Fixed output width; defaults to the terminal width
# width = 100
color = true

[table]
# Cells beyond the header's columns: "clip" drops them, "widen" adds columns
overflow = "clip"
# "rounded", "sharp", "ascii" or "minimal"
border = "rounded"
bold_header = true
"#;
