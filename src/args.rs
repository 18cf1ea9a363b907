use auto_input_run::config::RunMode;
use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Args {
    pub mode: Option<RunMode>,
    pub config_dir: Option<PathBuf>,
    pub frames_dir: Option<PathBuf>,
    pub debug_mode: bool,
    pub timeout_secs: Option<u64>,
}

impl Args {
    /// Parses the process arguments. Returns `None` when the program should exit
    /// (help, version or a bad flag).
    pub fn parse() -> Option<Self> {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> Option<Self> {
        let mut mode: Option<RunMode> = None;
        let mut config_dir: Option<PathBuf> = None;
        let mut frames_dir: Option<PathBuf> = None;
        let mut debug_mode: bool = false;
        let mut timeout_secs: Option<u64> = None;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Auto Input Run v{} ({})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if let Some(val) = arg.strip_prefix("--mode=") {
                match val.parse::<RunMode>() {
                    Ok(m) => mode = Some(m),
                    Err(e) => {
                        eprintln!("❌ {}", e);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--frames=") {
                frames_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) => timeout_secs = Some(secs),
                    Err(_) => {
                        eprintln!("❌ Invalid timeout value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(Args {
            mode,
            config_dir,
            frames_dir,
            debug_mode,
            timeout_secs,
        })
    }
}

fn print_help() {
    println!("🤖 Auto Input Run - hotkey driven auto clicker and auto fisher");
    println!();
    println!("USAGE:");
    println!("    auto-input-run [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --mode=<clicker|fisher>  Override the mode stored in settings");
    println!("    --config=DIR             Settings and catalog folder (default: ~/.auto-input-run)");
    println!("    --frames=DIR             Replay PNG/JPEG frames from DIR for the fisher");
    println!("    --debug                  Enable debug output");
    println!("    --timeout=N              Auto-exit after N seconds (for testing)");
    println!("    --help, -h               Show this help message");
    println!("    --version, -v            Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    auto-input-run");
    println!("    auto-input-run --mode=fisher --frames=./captures");
    println!("    auto-input-run --debug --timeout=30");
}
