//! Motor driver stage configuration

/// Driver stage disabled
pub const DIS_DRV: u16 = 1 << 6;

/// Driver configuration register access
pub trait DriverStage {
    /// Read the configuration register
    fn config(&self) -> u16;

    /// Overwrite the configuration register
    fn write_config(&mut self, bits: u16);

    /// Check if the output stage is allowed to switch
    fn is_enabled(&self) -> bool {
        self.config() & DIS_DRV == 0
    }
}
