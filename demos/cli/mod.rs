use std::env;
use std::process;

use cloudtree::ClientConfig;

pub fn usage_and_exit(usage: &str) -> ! {
    eprintln!("{usage}");
    process::exit(1);
}

pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    /// Take `--flag VALUE` out of the argument list.
    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let i = self.args.iter().position(|a| names.contains(&a.as_str()))?;
        if i + 1 >= self.args.len() {
            usage_and_exit(self.usage);
        }
        let value = self.args.remove(i + 1);
        self.args.remove(i);
        Some(value)
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}

/// Config from `--config FILE`, falling back to the default endpoints.
pub fn load_config(parser: &mut ArgParser) -> ClientConfig {
    match parser.take_value(&["--config", "-c"]) {
        Some(path) => ClientConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("Failed to load {path}: {e}");
            process::exit(1);
        }),
        None => ClientConfig::default(),
    }
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cloudtree=debug"));
    fmt().with_env_filter(filter).with_target(false).init();
}
