use clap::{command, Arg, Command, ValueHint};

pub fn build_command() -> Command {
    command!().args([
        Arg::new("group")
            .required(false)
            .value_name("GROUP")
            .help("Steam group ID or community URL."),
        Arg::new("api_key")
            .short('k')
            .long("api-key")
            .alias("key")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("Path to a file containing a Steam API key."),
        Arg::new("config")
            .short('c')
            .long("config-file")
            .alias("config")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("Path to the YAML config file."),
        Arg::new("proxy")
            .long("proxy")
            .required(false)
            .value_name("URL")
            .help("Request proxy prefix; the encoded target URL is appended to it."),
        Arg::new("sort")
            .short('s')
            .long("sort")
            .required(false)
            .value_parser(["total", "average", "players"])
            .value_name("FIELD")
            .help("Initial sort column for the results table."),
    ])
}
