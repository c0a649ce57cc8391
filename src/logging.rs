use std::fs;
use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

/// Initializes log4rs from `path`. When the file does not exist a built-in
/// configuration writing to `logs/<log_file>` is used instead, optionally
/// echoed to stdout.
pub fn init_logging(path: &str, log_file: &str, echo_stdout: bool) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    if Path::new(path).exists() {
        return log4rs::init_file(path, Default::default())
            .map_err(|e| anyhow::anyhow!("Could not initialize logging: {}", e));
    }

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(Path::new("logs").join(log_file))?;

    let mut config = Config::builder().appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if echo_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build();
        config = config.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = config.build(root.build(LevelFilter::Info))?;
    log4rs::init_config(config)?;

    Ok(())
}
