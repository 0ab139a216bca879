pub mod cpu;
pub mod disk;
pub mod network;
pub mod snapshot;
pub mod system_info;
