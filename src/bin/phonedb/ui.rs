use nu_ansi_term::{Color, Style};
use phonedb::ListedRecord;
use std::fmt::Display;
use std::io::IsTerminal;

const NUM_MIN: usize = 3;
const NAME_MIN: usize = 16;
const PHONE_MIN: usize = 20;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Theme {
    Auto,
    Plain,
}

pub struct Ui {
    palette: Palette,
    paint: bool,
}

impl Ui {
    pub fn new(theme: Theme) -> Self {
        let paint = match theme {
            Theme::Plain => false,
            Theme::Auto => std::io::stdout().is_terminal(),
        };

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        let palette = if paint {
            Palette::dark()
        } else {
            Palette::plain()
        };
        Self { palette, paint }
    }

    /// Prints a status line on stdout.
    pub fn info(&self, message: &str) {
        println!("{}", self.palette.info.paint(message));
    }

    /// Prints a warning on stderr.
    pub fn warn(&self, message: &str) {
        eprintln!("{}", self.palette.warn.paint(message));
    }

    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(String, String)> = rows
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        if rows.is_empty() {
            return;
        }
        println!("{}", self.palette.heading.paint(title));
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            if self.paint {
                println!(
                    "  {} {}",
                    self.palette.key.paint(format!("{key:>key_width$}:")),
                    value
                );
            } else {
                println!("  {key:>key_width$}: {value}");
            }
        }
    }

    /// Renders records as a boxed table, numbering rows from 1.
    pub fn records(&self, entries: &[ListedRecord]) {
        let name_w = entries
            .iter()
            .map(|e| e.record.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(NAME_MIN);
        let phone_w = entries
            .iter()
            .map(|e| e.record.phone.chars().count())
            .max()
            .unwrap_or(0)
            .max(PHONE_MIN);
        let num_w = (entries.len().max(1)).to_string().len().max(NUM_MIN);

        let rule = border('-', num_w, name_w, phone_w);
        println!("{rule}");
        println!(
            "| {:<num_w$} | {:<name_w$} | {:<phone_w$} |",
            "#", "Name", "Phone"
        );
        println!("{}", border('=', num_w, name_w, phone_w));
        for (row, entry) in entries.iter().enumerate() {
            println!(
                "| {:<num_w$} | {:<name_w$} | {:<phone_w$} |",
                row + 1,
                entry.record.name,
                entry.record.phone
            );
            println!("{rule}");
        }
    }
}

fn border(fill: char, num_w: usize, name_w: usize, phone_w: usize) -> String {
    let seg = |w: usize| fill.to_string().repeat(w + 2);
    format!("+{}+{}+{}+", seg(num_w), seg(name_w), seg(phone_w))
}

struct Palette {
    heading: Style,
    key: Style,
    info: Style,
    warn: Style,
}

impl Palette {
    fn dark() -> Self {
        Self {
            heading: Style::new().fg(Color::Purple).bold(),
            key: Style::new().fg(Color::LightBlue).bold(),
            info: Style::new().fg(Color::LightCyan),
            warn: Style::new().fg(Color::Yellow).bold(),
        }
    }

    fn plain() -> Self {
        Self {
            heading: Style::new(),
            key: Style::new(),
            info: Style::new(),
            warn: Style::new(),
        }
    }
}
