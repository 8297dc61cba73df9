/// Run options taken from the command line:
///
/// * `<frames>` limits an interactive run to that many frames;
/// * `--debug [width height [frames]]` runs headless with scripted input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub debug_mode: bool,
    pub debug_width: u16,
    pub debug_height: u16,
    pub max_frames: Option<u64>,
    pub log_file: String,
}

pub const DEFAULT_DEBUG_WIDTH: u16 = 80;
pub const DEFAULT_DEBUG_HEIGHT: u16 = 24;
pub const LOG_FILE: &str = "endless-space-shooter.log";

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            debug_mode: false,
            debug_width: DEFAULT_DEBUG_WIDTH,
            debug_height: DEFAULT_DEBUG_HEIGHT,
            max_frames: None,
            log_file: LOG_FILE.to_string(),
        }
    }
}

impl GameConfig {
    /// `args` includes the program name at index 0, as `env::args()` yields it.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = GameConfig::default();
        config.debug_mode = args.len() > 1 && args[1] == "--debug";

        if config.debug_mode {
            if args.len() >= 4 {
                config.debug_width = args[2].parse::<u16>().ok().filter(|&w| w > 0).unwrap_or(DEFAULT_DEBUG_WIDTH);
                config.debug_height = args[3].parse::<u16>().ok().filter(|&h| h > 0).unwrap_or(DEFAULT_DEBUG_HEIGHT);
            }
            if args.len() > 4 {
                config.max_frames = args[4].parse::<u64>().ok();
            }
        } else if args.len() > 1 {
            config.max_frames = args[1].parse::<u64>().ok();
        }
        config
    }
}
