//! Scripted UCI engines written as shell scripts, for exercising the process driver

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::EngineConfig;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Answers `uci` and `isready`, instant reply to `go depth 1`, ignores deeper
/// searches until `stop` arrives.
pub const ANSWERS_ON_STOP: &str = r#"
    go)
        if [ "$rest" = "depth 1" ]; then
            echo "info depth 1 score cp 10 pv e2e4"
            echo "bestmove e2e4"
        fi ;;
    stop)
        echo "info depth 1 score cp 10 pv e2e4"
        echo "bestmove e2e4" ;;
"#;

/// Never replies to a search, not even after `stop`
pub const SILENT: &str = r#"
    go) ;;
    stop) ;;
"#;

/// Exits as soon as a search starts
pub const EXITS_ON_GO: &str = r#"
    go) exit 0 ;;
"#;

/// Write an executable engine script with the given extra `case` arms and
/// return a config pointing at it with a short search timeout.
pub fn engine_config(name: &str, arms: &str) -> EngineConfig {
    let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
    let path: PathBuf = std::env::temp_dir().join(format!("fake-uci-{}-{id}-{name}.sh", std::process::id()));
    let script = format!(
        "#!/bin/sh\nwhile read -r cmd rest; do\n  case \"$cmd\" in\n    uci) echo \"id name fake\"; echo \"uciok\" ;;\n    isready) echo \"readyok\" ;;\n    quit) exit 0 ;;\n{arms}\n  esac\ndone\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    EngineConfig {
        path: path.to_string_lossy().into_owned(),
        timeout_ms: 200,
        ..EngineConfig::default()
    }
}
