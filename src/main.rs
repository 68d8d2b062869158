use std::env;
use std::io::Write;

use huffproc::run;
use huffproc::Config;

/// Writes log records to stderr.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr(), "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let config = Config::build(env::args_os())
        .unwrap_or_else(|err| err.exit());

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(config.debug.log_filter());
    }

    match run(config) {
        Ok(summary) => log::info!("{} bits read, {} bits written", summary.bits_read, summary.bits_written),
        Err(err) => {
            eprintln!("Application error: {}", err);
            std::process::exit(1);
        }
    }
}
