//! Linux sysfs GPIO backend.
//!
//! Lines are exported through `/sys/class/gpio/export` and configured as
//! outputs. Levels are written to the line's `value` attribute.

use embedded_hal::digital::{ErrorType, OutputPin};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use super::GpioError;

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// udev may need a moment to fix permissions on a freshly exported line.
const EXPORT_SETTLE: Duration = Duration::from_millis(100);

/// A GPIO line driven through sysfs.
#[derive(Debug)]
pub struct SysfsLine {
    number: u32,
    value: File,
}

impl SysfsLine {
    /// Export GPIO `number` under the default root and configure it as a low output.
    pub fn export(number: u32) -> Result<Self, GpioError> {
        Self::export_at(SYSFS_GPIO_ROOT, number)
    }

    /// Export GPIO `number` under an explicit sysfs root.
    pub fn export_at(root: impl AsRef<Path>, number: u32) -> Result<Self, GpioError> {
        let root = root.as_ref();
        let line_dir: PathBuf = root.join(format!("gpio{}", number));

        if !line_dir.exists() {
            info!("Exporting GPIO {}", number);
            std::fs::write(root.join("export"), number.to_string())?;
            thread::sleep(EXPORT_SETTLE);
        }

        // "low" sets the direction to output with an initial low level
        std::fs::write(line_dir.join("direction"), "low")?;

        let value = OpenOptions::new().write(true).open(line_dir.join("value"))?;
        debug!("GPIO {} ready as output", number);

        Ok(Self { number, value })
    }

    /// The sysfs GPIO number.
    pub fn number(&self) -> u32 {
        self.number
    }

    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        let level: &[u8] = if high { b"1" } else { b"0" };
        self.value.write_all_at(level, 0)?;
        Ok(())
    }
}

impl ErrorType for SysfsLine {
    type Error = GpioError;
}

impl OutputPin for SysfsLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_root(tag: &str, number: u32) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "microwave-control-sysfs-{}-{}",
            tag,
            std::process::id()
        ));
        let line_dir = root.join(format!("gpio{}", number));
        std::fs::create_dir_all(&line_dir).unwrap();
        std::fs::write(line_dir.join("direction"), "in").unwrap();
        std::fs::write(line_dir.join("value"), "0").unwrap();
        root
    }

    #[test]
    fn test_sysfs_line_writes_value() {
        let root = fake_root("writes", 245);
        let mut line = SysfsLine::export_at(&root, 245).unwrap();
        assert_eq!(line.number(), 245);

        let direction = std::fs::read_to_string(root.join("gpio245/direction")).unwrap();
        assert_eq!(direction, "low");

        line.set_high().unwrap();
        let value = std::fs::read_to_string(root.join("gpio245/value")).unwrap();
        assert_eq!(value, "1");

        line.set_low().unwrap();
        let value = std::fs::read_to_string(root.join("gpio245/value")).unwrap();
        assert_eq!(value, "0");

        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_sysfs_missing_root() {
        let root = std::env::temp_dir().join("microwave-control-sysfs-missing-root");
        assert!(matches!(
            SysfsLine::export_at(&root, 1),
            Err(GpioError::Io(_))
        ));
    }
}
