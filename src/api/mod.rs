pub mod cluster;

pub use cluster::{Architecture, Cluster, Cpu, EntityRef, SwitchType, Version};
