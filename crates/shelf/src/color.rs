use crate::cli::ColorChoice;
use std::io::IsTerminal;

/// Decide whether output is colorized and apply it globally
pub fn init(choice: ColorChoice) {
    colored::control::set_override(should_color(choice));
}

fn should_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        // NO_COLOR wins over CLICOLOR_FORCE (https://no-color.org/)
        ColorChoice::Auto if std::env::var_os("NO_COLOR").is_some() => false,
        ColorChoice::Auto if std::env::var_os("CLICOLOR_FORCE").is_some() => true,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    }
}
