//! OS counter sensors.
//!
//! Point-in-time CPU, memory, disk and network records read from procfs.

pub mod data;

mod cpu;
mod disk;
mod memory;
mod network;

pub use cpu::CpuSensor;
pub use disk::DiskSensor;
pub use memory::MemorySensor;
pub use network::NetworkSensor;

/// Trait for all counter sensors.
pub trait Sensor: Send {
    /// Record produced by one sample.
    type Output;

    /// Returns the sensor name.
    fn name(&self) -> &str;

    /// Samples the current value.
    fn sample(&mut self) -> Self::Output;
}
