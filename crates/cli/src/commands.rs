//! clap command tree.
//!
//! Every subcommand maps onto one invocation of the record engine. `call`
//! is the raw form: a function name, positional arguments and transient
//! payloads, exactly as a ledger client would submit them.

use clap::{Arg, ArgAction, Command};

/// Build the top-level command.
pub fn build_cli() -> Command {
    Command::new("entrylog")
        .about("Entry log store with public and private collections")
        .arg(
            Arg::new("data")
                .long("data")
                .value_name("FILE")
                .global(true)
                .help("Snapshot file loaded before and saved after each mutation"),
        )
        .arg(
            Arg::new("read-only")
                .long("read-only")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Reject mutating commands"),
        )
        .arg(
            Arg::new("public-collection")
                .long("public-collection")
                .value_name("NAME")
                .global(true)
                .help("Name of the public collection"),
        )
        .arg(
            Arg::new("sensitive-collection")
                .long("sensitive-collection")
                .value_name("NAME")
                .global(true)
                .help("Name of the private details collection"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .conflicts_with("raw")
                .help("Machine-readable JSON output, including errors"),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print response payloads unformatted"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Debug logging to stderr"),
        )
        .subcommand(create_cmd())
        .subcommand(id_cmd("read", "Public record of an entry"))
        .subcommand(id_cmd("read-sensitive", "Private details of an entry"))
        .subcommand(id_cmd("read-full", "Public record and private details merged"))
        .subcommand(
            Command::new("update-address")
                .about("Replace the address in an entry's private details")
                .arg(Arg::new("id").required(true).help("Entry id"))
                .arg(Arg::new("address").required(true).help("New address")),
        )
        .subcommand(id_cmd("delete", "Delete an entry from both collections"))
        .subcommand(attr_cmd(
            "query-facility",
            "facility",
            "Selector query for public records at a facility",
        ))
        .subcommand(attr_cmd(
            "query-personal",
            "personal",
            "Selector query for private details of a person",
        ))
        .subcommand(
            Command::new("query")
                .about("Run a selector document against the public collection")
                .arg(Arg::new("selector").required(true).help("Selector JSON")),
        )
        .subcommand(attr_cmd(
            "list-facility",
            "facility",
            "Public records at a facility, via the facility index",
        ))
        .subcommand(attr_cmd(
            "list-personal",
            "personal",
            "Private details of a person, via the personal index",
        ))
        .subcommand(call_cmd())
}

fn create_cmd() -> Command {
    let field = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name)
            .value_name("VALUE")
            .required(true)
            .help(help)
    };
    Command::new("create")
        .about("Create an entry log and its private details")
        .arg(field("id", "Entry id"))
        .arg(field("facility", "Facility id"))
        .arg(field("year", "Year"))
        .arg(field("sex", "Sex/gender"))
        .arg(
            Arg::new("entry-time")
                .long("entry-time")
                .value_name("TIME")
                .help("Entry time (defaults to now, RFC 3339)"),
        )
        .arg(field("personal", "Personal id"))
        .arg(field("name", "Name"))
        .arg(field("phone", "Phone"))
        .arg(field("address", "Address"))
}

fn id_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("id").required(true).help("Entry id"))
}

fn attr_cmd(name: &'static str, arg: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new(arg).required(true))
}

fn call_cmd() -> Command {
    Command::new("call")
        .about("Raw invocation: function name, arguments and transient payloads")
        .arg(Arg::new("function").required(true).help("Function name"))
        .arg(
            Arg::new("args")
                .num_args(0..)
                .help("Positional string arguments"),
        )
        .arg(
            Arg::new("transient")
                .long("transient")
                .short('t')
                .value_name("KEY=JSON")
                .action(ArgAction::Append)
                .help("Transient payload given as text"),
        )
        .arg(
            Arg::new("transient-base64")
                .long("transient-base64")
                .value_name("KEY=BASE64")
                .action(ArgAction::Append)
                .help("Transient payload given as base64"),
        )
}
