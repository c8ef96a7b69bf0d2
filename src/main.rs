mod tui;
use crate::tui::App;
use anyhow::Context;
use laydate::{Lang, LaydateConfig, Picker, PickerType, RangeMode, ShortcutValue};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    picker_type: PickerType,
    range: bool,
    separator: Option<String>,
    linked: bool,
    format: Option<String>,
    min: Option<String>,
    max: Option<String>,
    lang: Lang,
    week_start: u8,
    no_auto_confirm: bool,
    no_bottom: bool,
    theme: Vec<String>,
    shortcuts: Vec<String>,
    value: Option<String>,
}

impl Options {
    fn into_config(self) -> LaydateConfig {
        let range = match self.separator {
            Some(sep) => RangeMode::Separator(sep),
            None if self.range => RangeMode::On,
            None => RangeMode::Off,
        };
        let mut config = LaydateConfig::new(self.picker_type)
            .with_range(range)
            .with_linked(self.linked)
            .with_lang(self.lang)
            .with_week_start(self.week_start)
            .with_auto_confirm(!self.no_auto_confirm)
            .with_show_bottom(!self.no_bottom);
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        if let Some(min) = self.min {
            config = config.with_min(min);
        }
        if let Some(max) = self.max {
            config = config.with_max(max);
        }
        if let Some(value) = self.value {
            config = config.with_value(value);
        }
        for theme in self.theme {
            config = config.with_theme(theme);
        }
        for keyword in self.shortcuts {
            let value = ShortcutValue::text(keyword.as_str());
            config = config.with_shortcut(keyword, value);
        }
        config
    }
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('t') | Arg::Long("type") => opts.picker_type = parser.value()?.parse()?,
                Arg::Short('r') | Arg::Long("range") => opts.range = true,
                Arg::Long("separator") => opts.separator = Some(parser.value()?.string()?),
                Arg::Long("linked") => opts.linked = true,
                Arg::Short('f') | Arg::Long("format") => {
                    opts.format = Some(parser.value()?.string()?);
                }
                Arg::Long("min") => opts.min = Some(parser.value()?.string()?),
                Arg::Long("max") => opts.max = Some(parser.value()?.string()?),
                Arg::Long("lang") => opts.lang = parser.value()?.parse()?,
                Arg::Long("week-start") => opts.week_start = parser.value()?.parse()?,
                Arg::Long("no-auto-confirm") => opts.no_auto_confirm = true,
                Arg::Long("no-bottom") => opts.no_bottom = true,
                Arg::Long("theme") => opts.theme.push(parser.value()?.string()?),
                Arg::Short('s') | Arg::Long("shortcut") => {
                    opts.shortcuts.push(parser.value()?.string()?);
                }
                Arg::Value(value) if opts.value.is_none() => opts.value = Some(value.string()?),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                init_logging();
                let picker = Picker::new(opts.into_config());
                let committed = with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(picker)
                        .run(terminal)
                        .context("failed to run the picker")
                })?;
                if let Some(value) = committed {
                    println!("{value}");
                }
                Ok(())
            }
            Command::Help => {
                println!("Usage: laydate [OPTIONS] [VALUE]");
                println!();
                println!("Pick a date, time or range in the terminal and print it");
                println!();
                println!("Options:");
                println!("  -t, --type TYPE       year, month, date, time or datetime [default: date]");
                println!("  -r, --range           Pick a range");
                println!("      --separator SEP   Range separator [default: \" - \"]; implies --range");
                println!("      --linked          Keep the two range panels on consecutive months");
                println!("  -f, --format FORMAT   Value format, e.g. yyyy/MM/dd");
                println!("      --min VALUE       Earliest selectable value");
                println!("      --max VALUE       Latest selectable value");
                println!("      --lang LANG       cn or en [default: cn]");
                println!("      --week-start N    First day of the week, 0 = Sunday");
                println!("      --no-auto-confirm Require confirmation after picking a day");
                println!("      --no-bottom       Hide the preview and the buttons");
                println!("      --theme THEME     Theme name or accent colour (may be repeated)");
                println!("  -s, --shortcut NAME   Offer a shortcut such as yesterday or last_7_days");
                println!("  -h, --help            Display this help message and exit");
                println!("  -V, --version         Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_args(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), Command::Run(Options::default()));
    }

    #[test]
    fn test_range_options() {
        let Command::Run(opts) = parse(&[
            "-t",
            "datetime",
            "--separator",
            " ~ ",
            "--linked",
            "--lang",
            "en",
            "-s",
            "last_7_days",
            "--no-bottom",
            "2024-06-01 00:00:00 ~ 2024-06-07 00:00:00",
        ])
        .unwrap() else {
            panic!("expected a run command");
        };
        assert_eq!(opts.picker_type, PickerType::DateTime);
        assert_eq!(opts.lang, Lang::En);
        let config = opts.into_config();
        assert!(config.is_linked());
        assert!(!config.show_bottom);
        assert_eq!(config.separator(), " ~ ");
        assert_eq!(config.shortcuts[0].text, "last_7_days");
    }

    #[test]
    fn test_bad_type() {
        assert!(parse(&["--type", "week"]).is_err());
        assert!(parse(&["2024-01-01", "2024-01-02"]).is_err());
        assert_eq!(parse(&["-V"]).unwrap(), Command::Version);
    }
}
