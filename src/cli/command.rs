#![forbid(unsafe_code)]
//! Line grammar of the interactive shell.

/// One parsed shell line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `use <path>`: open or create a database file.
    Use(String),
    /// `select`: list every record in phone order.
    Select,
    /// `insert <args>`: the raw arguments, tokenized later by the session.
    Insert(String),
    /// `find <phone>`: records with exactly this phone number.
    Find(String),
    /// `restore`: wipe and initialize the open database.
    Restore,
    /// `verify`: integrity report for the open database.
    Verify,
    /// `stats`: size report for the open database.
    Stats,
    /// `exit`: leave the shell.
    Exit,
    /// Blank line.
    Empty,
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl Command {
    /// Parses one input line. Trailing line terminators are ignored.
    ///
    /// `use` keeps the remainder of the line as the path, spaces included;
    /// `insert` keeps its remainder untouched so that argument errors are
    /// reported by the insert itself.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(path) = line.strip_prefix("use ") {
            return Command::Use(path.to_string());
        }
        if let Some(args) = line.strip_prefix("insert ") {
            return Command::Insert(args.to_string());
        }
        if let Some(phone) = line.strip_prefix("find ") {
            return Command::Find(phone.trim().to_string());
        }
        match line {
            "select" => Command::Select,
            "restore" => Command::Restore,
            "verify" => Command::Verify,
            "stats" => Command::Stats,
            "exit" => Command::Exit,
            "" => Command::Empty,
            other => Command::Unknown(other.to_string()),
        }
    }
}
