use std::path::PathBuf;
use fern::colors::{Color, ColoredLevelConfig};

macro_rules! error_pre_log {
    ($lgr:expr,$($arg:tt)*) => (eprintln!("{}{}{}",
                                          $lgr.console_prefix(log::Level::Error),
                                          format_args!($($arg)*),
                                          $lgr.console_suffix()));
}

/// Console and file logging setup for applications embedding the
/// calculator.
#[derive(Default)]
pub struct Logger {
    app_name:   String,
    dispatcher: Option<fern::Dispatch>,
    colors:     ColoredLevelConfig,
}

impl Logger {
    pub fn new<S: AsRef<str>>(app_name: S) -> Self {
        let app_name = app_name.as_ref().to_owned();
        let dispatcher = Some(fern::Dispatch::new());

        let colors = ColoredLevelConfig::new()
            .trace(Color::Blue)
            .debug(Color::Yellow)
            .info(Color::Green)
            .warn(Color::Magenta)
            .error(Color::Red);

        Self { app_name, dispatcher, colors }
    }

    pub fn with_console(mut self, level: log::LevelFilter) -> Self {
        let colors = self.colors;

        let dispatcher = self.dispatcher.take().unwrap_or_else(fern::Dispatch::new).chain(
            fern::Dispatch::new()
                .format(move |out, message, record| match record.level() {
                    log::Level::Info => out.finish(format_args!("{}.", message)),
                    _ => out.finish(format_args!(
                        "[{}]\t{}.",
                        colors.color(record.level()),
                        message
                    )),
                })
                .level(level)
                .chain(std::io::stdout()),
        );

        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_file<S: AsRef<str>>(mut self, filename: S, level: log::LevelFilter) -> Self {
        let path = PathBuf::from(filename.as_ref());

        let log_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path);

        match log_file {
            Ok(log_file) => {
                let dispatcher = self.dispatcher.take().unwrap_or_else(fern::Dispatch::new).chain(
                    fern::Dispatch::new()
                        .format(move |out, message, record| {
                            out.finish(format_args!(
                                "[{}][{}] {}.",
                                record.target(),
                                record.level(),
                                message,
                            ))
                        })
                        .level(level)
                        .chain(log_file),
                );
                self.dispatcher = Some(dispatcher);
            }
            Err(err) => {
                error_pre_log!(
                    self,
                    "Can't log to \"{}\" for {}: {}.",
                    path.display(),
                    self.app_name,
                    err
                );
            }
        }

        self
    }

    pub fn apply(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.apply().unwrap_or_else(|err| error_pre_log!(self, "{}.", err));
        } else {
            error_pre_log!(self, "Logger can't be applied (probably it has already been applied).");
        }
    }

    fn console_prefix(&self, level: log::Level) -> String {
        format!(
            "[{}]\t\x1B[{}m",
            self.colors.color(level),
            self.colors.get_color(&level).to_fg_str()
        )
    }

    fn console_suffix(&self) -> &str {
        "\x1B[0m"
    }
}
