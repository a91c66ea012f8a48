mod cli_command_parse_tests;
mod config_tests;
mod render_tests;
mod session_tests;
