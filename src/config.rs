//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_COLUMNS, MAX_ROWS};
use crate::interface::DEFAULT_ADDRESS;

/// Device tree compatible strings matched by this driver
pub const COMPATIBLE: &[&str] = &["solomon,ssd1306"];

/// Driver name reported to the platform
pub const DRIVER_NAME: &str = "ssd1306";

/// Default name of the exposed byte-stream node
pub const DEVICE_NAME: &str = "ssd1306";

/// Default name of the device class the node is created under
pub const CLASS_NAME: &str = "ssd_class";

/// Rows covered by one GDDRAM page
pub const ROWS_PER_PAGE: u8 = 8;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of columns (width in pixels, corresponds to segment outputs)
    pub cols: u8,
    /// Number of rows (height in pixels, corresponds to COM outputs)
    pub rows: u8,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - cols == 0 or cols > MAX_COLUMNS
    /// - rows < 8 or rows > MAX_ROWS
    /// - rows % 8 != 0 (GDDRAM is organised in 8-row pages)
    pub fn new(cols: u8, rows: u8) -> Result<Self, BuilderError> {
        if cols == 0 || cols > MAX_COLUMNS {
            return Err(BuilderError::InvalidDimensions { cols, rows });
        }
        if rows < ROWS_PER_PAGE || rows > MAX_ROWS || rows % ROWS_PER_PAGE != 0 {
            return Err(BuilderError::InvalidDimensions { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    /// Number of GDDRAM pages
    pub fn pages(&self) -> u8 {
        self.rows / ROWS_PER_PAGE
    }

    /// Bytes in one full frame (one bit per pixel)
    pub fn buffer_size(&self) -> usize {
        (self.cols as usize * self.rows as usize) / 8
    }

    /// Bytes on the wire for one full frame, including the data control byte
    pub fn burst_size(&self) -> usize {
        self.buffer_size() + 1
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            cols: MAX_COLUMNS,
            rows: MAX_ROWS,
        }
    }
}

/// What the init program does when a bus write fails
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InitPolicy {
    /// Stop at the first failed write and fail the attach
    #[default]
    AbortOnError,
    /// Log the failed write, keep going, and report success
    BestEffort,
}

/// Display configuration
///
/// This struct holds all configurable parameters for the SSD1306 controller.
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// 7-bit bus address
    pub address: u8,
    /// Name of the exposed byte-stream node
    pub device_name: &'static str,
    /// Name of the device class
    pub class_name: &'static str,
    /// Clock divide ratio / oscillator frequency (0xD5 parameter)
    pub clock_divider: u8,
    /// Vertical display offset (0xD3 parameter)
    pub display_offset: u8,
    /// Display start line, 0..=63
    pub start_line: u8,
    /// Charge pump setting (0x8D parameter)
    pub charge_pump: u8,
    /// Map column 127 to SEG0
    pub segment_remap: bool,
    /// Scan from COM[N-1] to COM0
    pub com_scan_reversed: bool,
    /// COM pins hardware configuration (0xDA parameter)
    pub com_pins: u8,
    /// Contrast (0x81 parameter)
    pub contrast: u8,
    /// Failure handling for the init program
    pub init_policy: InitPolicy,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use ssd1306::{Builder, Dimensions, InitPolicy};
///
/// let dims = match Dimensions::new(128, 32) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .dimensions(dims)
///     .com_pins(0x02)
///     .init_policy(InitPolicy::BestEffort)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    /// 7-bit bus address
    address: u8,
    /// Name of the exposed byte-stream node
    device_name: &'static str,
    /// Name of the device class
    class_name: &'static str,
    /// Clock divide ratio / oscillator frequency
    clock_divider: u8,
    /// Vertical display offset
    display_offset: u8,
    /// Display start line
    start_line: u8,
    /// Charge pump setting
    charge_pump: u8,
    /// Segment remap
    segment_remap: bool,
    /// COM scan direction
    com_scan_reversed: bool,
    /// COM pins hardware configuration
    com_pins: u8,
    /// Contrast
    contrast: u8,
    /// Failure handling for the init program
    init_policy: InitPolicy,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            address: DEFAULT_ADDRESS,
            device_name: DEVICE_NAME,
            class_name: CLASS_NAME,
            // Reset default: divide ratio 1, mid oscillator frequency
            clock_divider: 0x80,
            display_offset: 0x00,
            start_line: 0,
            // Internal charge pump on (no external VCC)
            charge_pump: crate::command::CHARGE_PUMP_ENABLE,
            // Rotate 180 for modules mounted with the flex cable at the top
            segment_remap: true,
            com_scan_reversed: true,
            // Alternative COM pin layout, right for 128x64 modules
            com_pins: 0x12,
            contrast: 0xCF,
            init_policy: InitPolicy::AbortOnError,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the 7-bit bus address
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the name of the exposed byte-stream node
    pub fn device_name(mut self, name: &'static str) -> Self {
        self.device_name = name;
        self
    }

    /// Set the name of the device class
    pub fn class_name(mut self, name: &'static str) -> Self {
        self.class_name = name;
        self
    }

    /// Set clock divide ratio / oscillator frequency
    pub fn clock_divider(mut self, value: u8) -> Self {
        self.clock_divider = value;
        self
    }

    /// Set vertical display offset
    pub fn display_offset(mut self, value: u8) -> Self {
        self.display_offset = value;
        self
    }

    /// Set display start line (masked to 0..=63)
    pub fn start_line(mut self, line: u8) -> Self {
        self.start_line = line & 0x3F;
        self
    }

    /// Set charge pump parameter
    pub fn charge_pump(mut self, value: u8) -> Self {
        self.charge_pump = value;
        self
    }

    /// Set segment remap
    pub fn segment_remap(mut self, reversed: bool) -> Self {
        self.segment_remap = reversed;
        self
    }

    /// Set COM output scan direction
    pub fn com_scan_reversed(mut self, reversed: bool) -> Self {
        self.com_scan_reversed = reversed;
        self
    }

    /// Set COM pins hardware configuration
    ///
    /// Use 0x12 for 128x64 panels and 0x02 for 128x32 panels.
    pub fn com_pins(mut self, value: u8) -> Self {
        self.com_pins = value;
        self
    }

    /// Set contrast
    pub fn contrast(mut self, value: u8) -> Self {
        self.contrast = value;
        self
    }

    /// Set failure handling for the init program
    pub fn init_policy(mut self, policy: InitPolicy) -> Self {
        self.init_policy = policy;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            address: self.address,
            device_name: self.device_name,
            class_name: self.class_name,
            clock_divider: self.clock_divider,
            display_offset: self.display_offset,
            start_line: self.start_line,
            charge_pump: self.charge_pump,
            segment_remap: self.segment_remap,
            com_scan_reversed: self.com_scan_reversed,
            com_pins: self.com_pins,
            contrast: self.contrast,
            init_policy: self.init_policy,
        })
    }
}
