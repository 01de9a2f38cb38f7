//! UI and window constants.

/// Default window width
pub const WINDOW_DEFAULT_WIDTH: u32 = 1280;
/// Default window height
pub const WINDOW_DEFAULT_HEIGHT: u32 = 720;
/// Window title
pub const WINDOW_TITLE: &str = "Mandelbrot";

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "mandelbrot.json";
